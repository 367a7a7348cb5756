//! Feed and posts handlers.
//!
//! ```text
//! GET /api/v1/feed
//! GET /api/v1/posts
//! ```

use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, FeedEntrySchema};
use crate::inbound::http::session::Viewer;
use crate::inbound::http::state::HttpState;

const PRIVATE_NO_CACHE: (&str, &str) = ("Cache-Control", "private, no-cache, must-revalidate");

/// The viewer's feed: tickets and reviews from visible authors plus reviews
/// answering the viewer's own tickets, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    responses(
        (status = 200, description = "Feed entries, newest first", body = [FeedEntrySchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["feed"],
    operation_id = "getFeed"
)]
#[get("/feed")]
pub async fn feed(state: web::Data<HttpState>, viewer: Viewer) -> ApiResult<HttpResponse> {
    let viewer = viewer.into_user_id();
    let entries = state.content_query.feed(&viewer).await?;
    Ok(HttpResponse::Ok()
        .insert_header(PRIVATE_NO_CACHE)
        .json(entries))
}

/// The viewer's own tickets and reviews, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    responses(
        (status = 200, description = "Own posts, newest first", body = [FeedEntrySchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["feed"],
    operation_id = "getPosts"
)]
#[get("/posts")]
pub async fn posts(state: web::Data<HttpState>, viewer: Viewer) -> ApiResult<HttpResponse> {
    let viewer = viewer.into_user_id();
    let entries = state.content_query.posts(&viewer).await?;
    Ok(HttpResponse::Ok()
        .insert_header(PRIVATE_NO_CACHE)
        .json(entries))
}
