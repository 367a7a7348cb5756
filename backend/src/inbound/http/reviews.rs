//! Review handlers.
//!
//! ```text
//! POST /api/v1/review {"ticket":{"title":"Dune"},"review":{"rating":4,"headline":"Great"}}
//! POST /api/v1/review/create/{ticketId} {"rating":4,"headline":"Great","body":""}
//! POST /api/v1/review/{id}/edit {"rating":3,"headline":"Fine"}
//! POST /api/v1/review/{id}/delete
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateReviewRequest, CreateTicketWithReviewRequest, EditReviewRequest};
use crate::domain::{Error, ReviewDraft, ReviewId, TicketId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ReviewSchema, ReviewWithTicketSchema};
use crate::inbound::http::session::Viewer;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tickets::TicketPayload;

/// Review fields.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    /// Rating between 0 and 5.
    #[schema(minimum = 0, maximum = 5, example = 4)]
    pub rating: i64,
    /// Required headline, at most 128 characters.
    pub headline: String,
    /// Optional body, at most 8192 characters.
    #[serde(default)]
    pub body: String,
}

impl TryFrom<ReviewPayload> for ReviewDraft {
    type Error = Error;

    fn try_from(value: ReviewPayload) -> Result<Self, Self::Error> {
        Ok(ReviewDraft::new(value.rating, &value.headline, &value.body)?)
    }
}

/// A new ticket and the review answering it.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TicketWithReviewPayload {
    /// Ticket fields.
    pub ticket: TicketPayload,
    /// Review fields.
    pub review: ReviewPayload,
}

/// Create a ticket and a review of it in one step.
///
/// Either both are stored or neither is.
#[utoipa::path(
    post,
    path = "/api/v1/review",
    request_body = TicketWithReviewPayload,
    responses(
        (status = 201, description = "Ticket and review created", body = ReviewWithTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createTicketWithReview"
)]
#[post("/review")]
pub async fn create_ticket_with_review(
    state: web::Data<HttpState>,
    viewer: Viewer,
    payload: web::Json<TicketWithReviewPayload>,
) -> ApiResult<HttpResponse> {
    let owner = viewer.into_user_id();
    let TicketWithReviewPayload { ticket, review } = payload.into_inner();
    let (ticket, image) = ticket.into_parts()?;
    let review = ReviewDraft::try_from(review)?;
    let created = state
        .content
        .create_review_with_ticket(CreateTicketWithReviewRequest {
            owner,
            ticket,
            image,
            review,
        })
        .await?;
    Ok(HttpResponse::Created().json(created))
}

/// Review an existing ticket.
#[utoipa::path(
    post,
    path = "/api/v1/review/create/{ticketId}",
    params(("ticketId" = i64, Path, description = "Ticket being reviewed")),
    request_body = ReviewPayload,
    responses(
        (status = 201, description = "Review created", body = ReviewSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/review/create/{ticket_id}")]
pub async fn create_review(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<i64>,
    payload: web::Json<ReviewPayload>,
) -> ApiResult<HttpResponse> {
    let owner = viewer.into_user_id();
    let draft = ReviewDraft::try_from(payload.into_inner())?;
    let review = state
        .content
        .create_review(CreateReviewRequest {
            owner,
            ticket_id: TicketId::new(path.into_inner()),
            draft,
        })
        .await?;
    Ok(HttpResponse::Created().json(review))
}

/// Edit a review owned by the viewer.
#[utoipa::path(
    post,
    path = "/api/v1/review/{id}/edit",
    params(("id" = i64, Path, description = "Review identifier")),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Review updated", body = ReviewSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Review not found", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "editReview"
)]
#[post("/review/{id}/edit")]
pub async fn edit_review(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<i64>,
    payload: web::Json<ReviewPayload>,
) -> ApiResult<HttpResponse> {
    let owner = viewer.into_user_id();
    let draft = ReviewDraft::try_from(payload.into_inner())?;
    let review = state
        .content
        .edit_review(EditReviewRequest {
            owner,
            review_id: ReviewId::new(path.into_inner()),
            draft,
        })
        .await?;
    Ok(HttpResponse::Ok().json(review))
}

/// Delete a review owned by the viewer.
#[utoipa::path(
    post,
    path = "/api/v1/review/{id}/delete",
    params(("id" = i64, Path, description = "Review identifier")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Review not found", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[post("/review/{id}/delete")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let owner = viewer.into_user_id();
    state
        .content
        .delete_review(&owner, ReviewId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
