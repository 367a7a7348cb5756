//! Driving port for follow and block commands.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId, Username};

/// Relationship mutations.
///
/// Self-targeted follows and blocks fail with `self_reference`; following
/// across a block fails with `blocked_relationship`. Repeating a command, or
/// undoing an edge that does not exist, succeeds without changing anything.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipsCommand: Send + Sync {
    /// Follow `target`.
    async fn follow(&self, requester: &UserId, target: &UserId) -> Result<(), Error>;

    /// Follow the user called `username`, returning them.
    async fn follow_username(
        &self,
        requester: &UserId,
        username: &Username,
    ) -> Result<User, Error>;

    /// Stop following `target`.
    async fn unfollow(&self, requester: &UserId, target: &UserId) -> Result<(), Error>;

    /// Block `target`, dropping follows in both directions.
    async fn block(&self, requester: &UserId, target: &UserId) -> Result<(), Error>;

    /// Lift a block on `target`. Removed follows are not restored.
    async fn unblock(&self, requester: &UserId, target: &UserId) -> Result<(), Error>;
}
