//! Driving port for user listings.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// User listing use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Users `viewer` could start following: everyone except themselves and
    /// the users they already follow.
    async fn follow_candidates(&self, viewer: &UserId) -> Result<Vec<User>, Error>;
}
