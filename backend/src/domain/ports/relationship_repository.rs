//! Driven port for follow and block edges.
//!
//! Implementations must apply `follow` and `block` atomically with respect to
//! each other for the same pair of users, and rely on uniqueness constraints
//! rather than read-then-insert checks to stay idempotent.

use async_trait::async_trait;

use crate::domain::{
    BlockOutcome, FollowOutcome, RelationshipOverview, RelationshipSnapshot, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by relationship repository adapters.
    pub enum RelationshipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "relationship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "relationship repository query failed: {message}",
    }
}

/// Follow/block edge storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Write `follower -> followed` unless a block exists either way.
    async fn follow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<FollowOutcome, RelationshipRepositoryError>;

    /// Remove `follower -> followed`; returns whether an edge existed.
    async fn unfollow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipRepositoryError>;

    /// Remove follows between the pair in both directions and write the block.
    async fn block(
        &self,
        blocker: &UserId,
        blocked: &UserId,
    ) -> Result<BlockOutcome, RelationshipRepositoryError>;

    /// Remove `blocker -> blocked`; returns whether an edge existed.
    async fn unblock(
        &self,
        blocker: &UserId,
        blocked: &UserId,
    ) -> Result<bool, RelationshipRepositoryError>;

    /// Identifiers of every edge touching `viewer`.
    async fn snapshot(
        &self,
        viewer: &UserId,
    ) -> Result<RelationshipSnapshot, RelationshipRepositoryError>;

    /// Users on each side of `viewer`'s edges, ordered by username.
    async fn overview(
        &self,
        viewer: &UserId,
    ) -> Result<RelationshipOverview, RelationshipRepositoryError>;
}
