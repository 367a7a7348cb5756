//! Driven port for ticket and review persistence.
//!
//! Adapters only translate between storage rows and domain values; ownership
//! and validation are checked by the content service before any call here.

use async_trait::async_trait;

use crate::domain::{
    NewReview, NewTicket, Review, ReviewDraft, ReviewFilter, ReviewId, ReviewWithTicket,
    StoredImageChange, Ticket, TicketDraft, TicketId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by content repository adapters.
    pub enum ContentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "content repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "content repository query failed: {message}",
        /// A review referenced a ticket that does not exist.
        MissingTicket { ticket_id: i64 } => "ticket {ticket_id} does not exist",
    }
}

/// Ticket and review storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert a ticket and return it with its assigned id.
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, ContentRepositoryError>;

    /// Insert a ticket and a review answering it in one transaction.
    async fn insert_ticket_with_review(
        &self,
        ticket: &NewTicket,
        review: &NewReview,
    ) -> Result<ReviewWithTicket, ContentRepositoryError>;

    /// Fetch a ticket.
    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>, ContentRepositoryError>;

    /// Overwrite a ticket's text and image; `None` when it no longer exists.
    async fn update_ticket(
        &self,
        id: TicketId,
        draft: &TicketDraft,
        image: &StoredImageChange,
    ) -> Result<Option<Ticket>, ContentRepositoryError>;

    /// Delete a ticket and, by cascade, its reviews.
    async fn delete_ticket(&self, id: TicketId) -> Result<bool, ContentRepositoryError>;

    /// Insert a review of an existing ticket.
    async fn insert_review(
        &self,
        ticket_id: TicketId,
        review: &NewReview,
    ) -> Result<Review, ContentRepositoryError>;

    /// Fetch a review.
    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>, ContentRepositoryError>;

    /// Overwrite a review's fields; `None` when it no longer exists.
    async fn update_review(
        &self,
        id: ReviewId,
        draft: &ReviewDraft,
    ) -> Result<Option<Review>, ContentRepositoryError>;

    /// Delete a review; its ticket is untouched.
    async fn delete_review(&self, id: ReviewId) -> Result<bool, ContentRepositoryError>;

    /// Tickets written by any of `authors`.
    async fn tickets_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<Vec<Ticket>, ContentRepositoryError>;

    /// Reviews passing `filter`, each with its parent ticket.
    async fn reviews_matching(
        &self,
        filter: &ReviewFilter,
    ) -> Result<Vec<ReviewWithTicket>, ContentRepositoryError>;
}
