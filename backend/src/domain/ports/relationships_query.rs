//! Driving port for reading relationship state.

use async_trait::async_trait;

use crate::domain::{Error, RelationshipOverview, UserId};

/// Relationship reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipsQuery: Send + Sync {
    /// Following, followers and blocked users of `viewer`.
    async fn overview(&self, viewer: &UserId) -> Result<RelationshipOverview, Error>;
}
