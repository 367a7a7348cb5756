//! Driving port for ticket and review mutations.

use async_trait::async_trait;

use crate::domain::{
    Error, ImageEdit, ImageUpload, Review, ReviewDraft, ReviewId, ReviewWithTicket, Ticket,
    TicketDraft, TicketId, UserId,
};

/// Create a ticket, optionally with a cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketRequest {
    /// Author.
    pub owner: UserId,
    /// Validated text fields.
    pub draft: TicketDraft,
    /// Optional cover image.
    pub image: Option<ImageUpload>,
}

/// Edit a ticket owned by `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTicketRequest {
    /// Caller; must own the ticket.
    pub owner: UserId,
    /// Target ticket.
    pub ticket_id: TicketId,
    /// New text fields.
    pub draft: TicketDraft,
    /// Image change.
    pub image: ImageEdit,
}

/// Review an existing ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReviewRequest {
    /// Author.
    pub owner: UserId,
    /// Ticket being answered.
    pub ticket_id: TicketId,
    /// Validated review fields.
    pub draft: ReviewDraft,
}

/// Create a ticket and a review of it in one atomic step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketWithReviewRequest {
    /// Author of both.
    pub owner: UserId,
    /// Ticket fields.
    pub ticket: TicketDraft,
    /// Optional ticket cover image.
    pub image: Option<ImageUpload>,
    /// Review fields.
    pub review: ReviewDraft,
}

/// Edit a review owned by `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReviewRequest {
    /// Caller; must own the review.
    pub owner: UserId,
    /// Target review.
    pub review_id: ReviewId,
    /// New fields.
    pub draft: ReviewDraft,
}

/// Ticket and review mutations.
///
/// Missing targets fail with `not_found`; targets owned by someone else fail
/// with `forbidden`. Deleting a ticket removes its reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCommand: Send + Sync {
    /// Create a ticket.
    async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, Error>;

    /// Edit a ticket.
    async fn edit_ticket(&self, request: EditTicketRequest) -> Result<Ticket, Error>;

    /// Delete a ticket.
    async fn delete_ticket(&self, owner: &UserId, ticket_id: TicketId) -> Result<(), Error>;

    /// Review an existing ticket.
    async fn create_review(&self, request: CreateReviewRequest) -> Result<Review, Error>;

    /// Create a ticket and its review atomically.
    async fn create_review_with_ticket(
        &self,
        request: CreateTicketWithReviewRequest,
    ) -> Result<ReviewWithTicket, Error>;

    /// Edit a review.
    async fn edit_review(&self, request: EditReviewRequest) -> Result<Review, Error>;

    /// Delete a review.
    async fn delete_review(&self, owner: &UserId, review_id: ReviewId) -> Result<(), Error>;
}
