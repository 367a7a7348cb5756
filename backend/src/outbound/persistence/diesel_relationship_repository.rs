//! PostgreSQL-backed `RelationshipRepository` implementation using Diesel ORM.
//!
//! `follow` and `block` lock both user rows in id order before touching
//! edges. Two concurrent changes to the same pair therefore serialise, and a
//! follow can never commit after a block that was checked as absent.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RelationshipRepository, RelationshipRepositoryError};
use crate::domain::{
    BlockOutcome, BlockedUser, FollowOutcome, RelationshipOverview, RelationshipSnapshot, User,
    UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewBlockRow, NewFollowRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{user_blocks, user_follows, users};

/// Diesel-backed implementation of the `RelationshipRepository` port.
#[derive(Clone)]
pub struct DieselRelationshipRepository {
    pool: DbPool,
}

impl DieselRelationshipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RelationshipRepositoryError {
    map_basic_pool_error(error, RelationshipRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RelationshipRepositoryError {
    map_basic_diesel_error(
        error,
        RelationshipRepositoryError::query,
        RelationshipRepositoryError::connection,
    )
}

fn to_user(row: UserRow) -> Result<User, RelationshipRepositoryError> {
    row.into_user()
        .map_err(|err| RelationshipRepositoryError::query(format!("invalid stored user: {err}")))
}

/// Lock both users' rows, lowest id first, for the rest of the transaction.
async fn lock_pair(
    conn: &mut AsyncPgConnection,
    a: Uuid,
    b: Uuid,
) -> Result<(), diesel::result::Error> {
    users::table
        .filter(users::id.eq_any(vec![a, b]))
        .order_by(users::id.asc())
        .select(users::id)
        .for_update()
        .load::<Uuid>(conn)
        .await
        .map(|_| ())
}

async fn block_exists(
    conn: &mut AsyncPgConnection,
    a: Uuid,
    b: Uuid,
) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(
        user_blocks::table.filter(
            (user_blocks::user_id.eq(a).and(user_blocks::blocked_user_id.eq(b)))
                .or(user_blocks::user_id.eq(b).and(user_blocks::blocked_user_id.eq(a))),
        ),
    ))
    .get_result(conn)
    .await
}

#[async_trait]
impl RelationshipRepository for DieselRelationshipRepository {
    async fn follow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<FollowOutcome, RelationshipRepositoryError> {
        let (a, b) = (*follower.as_uuid(), *followed.as_uuid());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                lock_pair(conn, a, b).await?;
                if block_exists(conn, a, b).await? {
                    return Ok(FollowOutcome::Blocked);
                }
                let inserted = diesel::insert_into(user_follows::table)
                    .values(&NewFollowRow {
                        user_id: a,
                        followed_user_id: b,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                Ok(if inserted == 0 {
                    FollowOutcome::AlreadyFollowing
                } else {
                    FollowOutcome::Created
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            user_follows::table
                .filter(user_follows::user_id.eq(follower.as_uuid()))
                .filter(user_follows::followed_user_id.eq(followed.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn block(
        &self,
        blocker: &UserId,
        blocked: &UserId,
    ) -> Result<BlockOutcome, RelationshipRepositoryError> {
        let (a, b) = (*blocker.as_uuid(), *blocked.as_uuid());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                lock_pair(conn, a, b).await?;
                let removed_follows = diesel::delete(
                    user_follows::table.filter(
                        (user_follows::user_id
                            .eq(a)
                            .and(user_follows::followed_user_id.eq(b)))
                        .or(user_follows::user_id
                            .eq(b)
                            .and(user_follows::followed_user_id.eq(a))),
                    ),
                )
                .execute(conn)
                .await?;
                let inserted = diesel::insert_into(user_blocks::table)
                    .values(&NewBlockRow {
                        user_id: a,
                        blocked_user_id: b,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                Ok(BlockOutcome {
                    created: inserted > 0,
                    removed_follows,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn unblock(
        &self,
        blocker: &UserId,
        blocked: &UserId,
    ) -> Result<bool, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            user_blocks::table
                .filter(user_blocks::user_id.eq(blocker.as_uuid()))
                .filter(user_blocks::blocked_user_id.eq(blocked.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn snapshot(
        &self,
        viewer: &UserId,
    ) -> Result<RelationshipSnapshot, RelationshipRepositoryError> {
        let me = *viewer.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // One transaction so the three reads see the same MVCC snapshot.
        let (following, blocking, blocked_by) = conn
            .transaction(|conn| {
                async move {
                    let following: Vec<Uuid> = user_follows::table
                        .filter(user_follows::user_id.eq(me))
                        .select(user_follows::followed_user_id)
                        .load(conn)
                        .await?;
                    let blocking: Vec<Uuid> = user_blocks::table
                        .filter(user_blocks::user_id.eq(me))
                        .select(user_blocks::blocked_user_id)
                        .load(conn)
                        .await?;
                    let blocked_by: Vec<Uuid> = user_blocks::table
                        .filter(user_blocks::blocked_user_id.eq(me))
                        .select(user_blocks::user_id)
                        .load(conn)
                        .await?;
                    Ok((following, blocking, blocked_by))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let ids = |values: Vec<Uuid>| values.into_iter().map(UserId::from_uuid).collect();
        Ok(RelationshipSnapshot {
            following: ids(following),
            blocking: ids(blocking),
            blocked_by: ids(blocked_by),
        })
    }

    async fn overview(
        &self,
        viewer: &UserId,
    ) -> Result<RelationshipOverview, RelationshipRepositoryError> {
        let me = *viewer.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (following, followers, blocked) = conn
            .transaction(|conn| {
                async move {
                    let following: Vec<UserRow> = users::table
                        .filter(
                            users::id.eq_any(
                                user_follows::table
                                    .filter(user_follows::user_id.eq(me))
                                    .select(user_follows::followed_user_id),
                            ),
                        )
                        .select(UserRow::as_select())
                        .order_by(users::username.asc())
                        .load(conn)
                        .await?;
                    let followers: Vec<UserRow> = users::table
                        .filter(
                            users::id.eq_any(
                                user_follows::table
                                    .filter(user_follows::followed_user_id.eq(me))
                                    .select(user_follows::user_id),
                            ),
                        )
                        .select(UserRow::as_select())
                        .order_by(users::username.asc())
                        .load(conn)
                        .await?;
                    let blocked: Vec<(Uuid, DateTime<Utc>)> = user_blocks::table
                        .filter(user_blocks::user_id.eq(me))
                        .select((user_blocks::blocked_user_id, user_blocks::created_at))
                        .load(conn)
                        .await?;
                    let blocked_ids: Vec<Uuid> = blocked.iter().map(|(id, _)| *id).collect();
                    let blocked_users: Vec<UserRow> = users::table
                        .filter(users::id.eq_any(blocked_ids))
                        .select(UserRow::as_select())
                        .order_by(users::username.asc())
                        .load(conn)
                        .await?;
                    Ok((following, followers, (blocked, blocked_users)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let (edges, blocked_rows) = blocked;
        let blocked_at: HashMap<Uuid, DateTime<Utc>> = edges.into_iter().collect();
        let blocked = blocked_rows
            .into_iter()
            .filter_map(|row| blocked_at.get(&row.id).copied().map(|at| (row, at)))
            .map(|(row, at)| {
                Ok(BlockedUser {
                    user: to_user(row)?,
                    blocked_at: at,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RelationshipOverview {
            following: following
                .into_iter()
                .map(to_user)
                .collect::<Result<_, _>>()?,
            followers: followers
                .into_iter()
                .map(to_user)
                .collect::<Result<_, _>>()?,
            blocked,
        })
    }
}
