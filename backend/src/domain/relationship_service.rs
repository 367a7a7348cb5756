//! Relationship services: follow, block and the user lists built on them.
//!
//! Self-targeting and unknown targets are rejected here; the repository owns
//! the transactional block check so a follow can never slip past a
//! concurrent block.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::account_service::map_user_error;
use crate::domain::content_service::map_relationship_error;
use crate::domain::ports::{
    RelationshipRepository, RelationshipsCommand, RelationshipsQuery, UserRepository, UsersQuery,
};
use crate::domain::{Error, FollowOutcome, RelationshipOverview, User, UserId, Username};

/// Relationship service implementing the follow/block driving ports.
#[derive(Clone)]
pub struct RelationshipService<U, R> {
    users: Arc<U>,
    relationships: Arc<R>,
}

impl<U, R> RelationshipService<U, R> {
    /// Create a new service with the given repositories.
    pub fn new(users: Arc<U>, relationships: Arc<R>) -> Self {
        Self {
            users,
            relationships,
        }
    }
}

fn reject_self(requester: &UserId, target: &UserId, action: &str) -> Result<(), Error> {
    if requester == target {
        return Err(Error::self_reference(format!("cannot {action} yourself")));
    }
    Ok(())
}

impl<U, R> RelationshipService<U, R>
where
    U: UserRepository,
    R: RelationshipRepository,
{
    async fn ensure_exists(&self, target: &UserId) -> Result<(), Error> {
        self.users
            .find_by_id(target)
            .await
            .map_err(map_user_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("user {target} not found")))
    }

    async fn apply_follow(&self, requester: &UserId, target: &UserId) -> Result<(), Error> {
        let outcome = self
            .relationships
            .follow(requester, target)
            .await
            .map_err(map_relationship_error)?;
        match outcome {
            FollowOutcome::Created => {
                info!(follower = %requester, followed = %target, "follow created");
                Ok(())
            }
            FollowOutcome::AlreadyFollowing => Ok(()),
            FollowOutcome::Blocked => Err(Error::blocked_relationship(
                "a block exists between these users",
            )),
        }
    }
}

#[async_trait]
impl<U, R> RelationshipsCommand for RelationshipService<U, R>
where
    U: UserRepository,
    R: RelationshipRepository,
{
    async fn follow(&self, requester: &UserId, target: &UserId) -> Result<(), Error> {
        reject_self(requester, target, "follow")?;
        self.ensure_exists(target).await?;
        self.apply_follow(requester, target).await
    }

    async fn follow_username(
        &self,
        requester: &UserId,
        username: &Username,
    ) -> Result<User, Error> {
        let target = self
            .users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {username} not found")))?;
        reject_self(requester, target.id(), "follow")?;
        self.apply_follow(requester, target.id()).await?;
        Ok(target)
    }

    async fn unfollow(&self, requester: &UserId, target: &UserId) -> Result<(), Error> {
        self.ensure_exists(target).await?;
        let removed = self
            .relationships
            .unfollow(requester, target)
            .await
            .map_err(map_relationship_error)?;
        if removed {
            info!(follower = %requester, followed = %target, "follow removed");
        }
        Ok(())
    }

    async fn block(&self, requester: &UserId, target: &UserId) -> Result<(), Error> {
        reject_self(requester, target, "block")?;
        self.ensure_exists(target).await?;
        let outcome = self
            .relationships
            .block(requester, target)
            .await
            .map_err(map_relationship_error)?;
        if outcome.created {
            info!(
                blocker = %requester,
                blocked = %target,
                removed_follows = outcome.removed_follows,
                "block created"
            );
        }
        Ok(())
    }

    async fn unblock(&self, requester: &UserId, target: &UserId) -> Result<(), Error> {
        self.ensure_exists(target).await?;
        let removed = self
            .relationships
            .unblock(requester, target)
            .await
            .map_err(map_relationship_error)?;
        if removed {
            info!(blocker = %requester, blocked = %target, "block removed");
        }
        Ok(())
    }
}

#[async_trait]
impl<U, R> RelationshipsQuery for RelationshipService<U, R>
where
    U: UserRepository,
    R: RelationshipRepository,
{
    async fn overview(&self, viewer: &UserId) -> Result<RelationshipOverview, Error> {
        self.relationships
            .overview(viewer)
            .await
            .map_err(map_relationship_error)
    }
}

#[async_trait]
impl<U, R> UsersQuery for RelationshipService<U, R>
where
    U: UserRepository,
    R: RelationshipRepository,
{
    async fn follow_candidates(&self, viewer: &UserId) -> Result<Vec<User>, Error> {
        let snapshot = self
            .relationships
            .snapshot(viewer)
            .await
            .map_err(map_relationship_error)?;
        let users = self.users.list().await.map_err(map_user_error)?;
        Ok(users
            .into_iter()
            .filter(|user| user.id() != viewer && !snapshot.following.contains(user.id()))
            .collect())
    }
}
