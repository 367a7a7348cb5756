//! Driving port for reading tickets, reviews and feeds.

use async_trait::async_trait;

use crate::domain::{Error, FeedEntry, Ticket, TicketId, UserId};

/// Read-side content use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentQuery: Send + Sync {
    /// The viewer's feed: visible tickets and reviews, newest first.
    async fn feed(&self, viewer: &UserId) -> Result<Vec<FeedEntry>, Error>;

    /// The viewer's own tickets and reviews, newest first.
    async fn posts(&self, viewer: &UserId) -> Result<Vec<FeedEntry>, Error>;

    /// A single ticket, e.g. before answering it.
    async fn ticket(&self, ticket_id: TicketId) -> Result<Ticket, Error>;
}
