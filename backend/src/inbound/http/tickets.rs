//! Ticket handlers.
//!
//! ```text
//! POST /api/v1/ticket {"title":"Dune","description":"","image":null}
//! GET /api/v1/ticket/{id}
//! POST /api/v1/ticket/{id}/edit {"title":"Dune","removeImage":true}
//! POST /api/v1/ticket/{id}/delete
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateTicketRequest, EditTicketRequest};
use crate::domain::{Error, ImageEdit, ImageUpload, TicketDraft, TicketId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TicketSchema};
use crate::inbound::http::session::Viewer;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ImagePayload, conflicting_image_edit_error, parse_image};

/// Ticket fields for `POST /api/v1/ticket`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    /// Required title, at most 128 characters.
    pub title: String,
    /// Optional description, at most 2048 characters.
    #[serde(default)]
    pub description: String,
    /// Optional cover image.
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

impl TicketPayload {
    pub(crate) fn into_parts(self) -> Result<(TicketDraft, Option<ImageUpload>), Error> {
        let draft = TicketDraft::new(&self.title, &self.description)?;
        let image = parse_image(self.image)?;
        Ok((draft, image))
    }
}

/// Ticket fields for `POST /api/v1/ticket/{id}/edit`.
///
/// Omitting `image` keeps the current cover; `removeImage` clears it.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditTicketPayload {
    /// Required title, at most 128 characters.
    pub title: String,
    /// Optional description, at most 2048 characters.
    #[serde(default)]
    pub description: String,
    /// Replacement cover image.
    #[serde(default)]
    pub image: Option<ImagePayload>,
    /// Drop the current cover image.
    #[serde(default)]
    pub remove_image: bool,
}

impl EditTicketPayload {
    fn into_parts(self) -> Result<(TicketDraft, ImageEdit), Error> {
        let draft = TicketDraft::new(&self.title, &self.description)?;
        let image = match (parse_image(self.image)?, self.remove_image) {
            (Some(_), true) => return Err(conflicting_image_edit_error()),
            (Some(upload), false) => ImageEdit::Replace(upload),
            (None, true) => ImageEdit::Remove,
            (None, false) => ImageEdit::Keep,
        };
        Ok((draft, image))
    }
}

/// Create a ticket owned by the viewer.
#[utoipa::path(
    post,
    path = "/api/v1/ticket",
    request_body = TicketPayload,
    responses(
        (status = 201, description = "Ticket created", body = TicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/ticket")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    viewer: Viewer,
    payload: web::Json<TicketPayload>,
) -> ApiResult<HttpResponse> {
    let owner = viewer.into_user_id();
    let (draft, image) = payload.into_inner().into_parts()?;
    let ticket = state
        .content
        .create_ticket(CreateTicketRequest {
            owner,
            draft,
            image,
        })
        .await?;
    Ok(HttpResponse::Created().json(ticket))
}

/// Fetch a ticket, e.g. before answering it with a review.
#[utoipa::path(
    get,
    path = "/api/v1/ticket/{id}",
    params(("id" = i64, Path, description = "Ticket identifier")),
    responses(
        (status = 200, description = "Ticket", body = TicketSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/ticket/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    _viewer: Viewer,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let ticket = state
        .content_query
        .ticket(TicketId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(ticket))
}

/// Edit a ticket owned by the viewer.
#[utoipa::path(
    post,
    path = "/api/v1/ticket/{id}/edit",
    params(("id" = i64, Path, description = "Ticket identifier")),
    request_body = EditTicketPayload,
    responses(
        (status = 200, description = "Ticket updated", body = TicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "editTicket"
)]
#[post("/ticket/{id}/edit")]
pub async fn edit_ticket(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<i64>,
    payload: web::Json<EditTicketPayload>,
) -> ApiResult<HttpResponse> {
    let owner = viewer.into_user_id();
    let (draft, image) = payload.into_inner().into_parts()?;
    let ticket = state
        .content
        .edit_ticket(EditTicketRequest {
            owner,
            ticket_id: TicketId::new(path.into_inner()),
            draft,
            image,
        })
        .await?;
    Ok(HttpResponse::Ok().json(ticket))
}

/// Delete a ticket owned by the viewer, together with its reviews.
#[utoipa::path(
    post,
    path = "/api/v1/ticket/{id}/delete",
    params(("id" = i64, Path, description = "Ticket identifier")),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "deleteTicket"
)]
#[post("/ticket/{id}/delete")]
pub async fn delete_ticket(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let owner = viewer.into_user_id();
    state
        .content
        .delete_ticket(&owner, TicketId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
