//! PostgreSQL-backed `ContentRepository` implementation using Diesel ORM.
//!
//! Authors are loaded in one batch per query and attached to the rows, so a
//! feed costs a fixed number of round trips regardless of its length.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ContentRepository, ContentRepositoryError};
use crate::domain::{
    NewReview, NewTicket, Review, ReviewDraft, ReviewFilter, ReviewId, ReviewWithTicket,
    StoredImageChange, Ticket, TicketDraft, TicketId, User, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    NewReviewRow, NewTicketRow, ReviewRow, ReviewUpdate, TicketRow, TicketUpdate, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{reviews, tickets, users};

/// Diesel-backed implementation of the `ContentRepository` port.
#[derive(Clone)]
pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ContentRepositoryError {
    map_basic_pool_error(error, ContentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ContentRepositoryError {
    map_basic_diesel_error(
        error,
        ContentRepositoryError::query,
        ContentRepositoryError::connection,
    )
}

fn rating_for_db(draft: &ReviewDraft) -> i16 {
    i16::from(draft.rating().get())
}

fn new_ticket_row(ticket: &NewTicket) -> NewTicketRow<'_> {
    NewTicketRow {
        title: ticket.draft.title(),
        description: ticket.draft.description(),
        image: ticket.image.as_deref(),
        user_id: *ticket.owner.as_uuid(),
        created_at: ticket.created_at,
    }
}

fn new_review_row(ticket_id: i64, review: &NewReview) -> NewReviewRow<'_> {
    NewReviewRow {
        ticket_id,
        rating: rating_for_db(&review.draft),
        headline: review.draft.headline(),
        body: review.draft.body(),
        user_id: *review.owner.as_uuid(),
        created_at: review.created_at,
    }
}

/// Users referenced by a batch of rows, keyed by id.
struct Authors(HashMap<Uuid, User>);

impl Authors {
    async fn load(
        conn: &mut AsyncPgConnection,
        ids: HashSet<Uuid>,
    ) -> Result<Self, ContentRepositoryError> {
        if ids.is_empty() {
            return Ok(Self(HashMap::new()));
        }
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(ids.into_iter().collect::<Vec<_>>()))
            .select(UserRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| {
                let id = row.id;
                to_user(row).map(|user| (id, user))
            })
            .collect::<Result<HashMap<_, _>, _>>()
            .map(Self)
    }

    fn get(&self, id: &Uuid) -> Result<User, ContentRepositoryError> {
        self.0
            .get(id)
            .cloned()
            .ok_or_else(|| ContentRepositoryError::query(format!("author {id} missing")))
    }
}

fn to_user(row: UserRow) -> Result<User, ContentRepositoryError> {
    row.into_user()
        .map_err(|err| ContentRepositoryError::query(format!("invalid stored user: {err}")))
}

fn to_review(row: ReviewRow, author: User) -> Result<Review, ContentRepositoryError> {
    row.into_review(author)
        .map_err(|message| ContentRepositoryError::query(format!("invalid stored review: {message}")))
}

async fn author_of(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<User, ContentRepositoryError> {
    Authors::load(conn, HashSet::from([id])).await?.get(&id)
}

fn image_column(change: &StoredImageChange) -> Option<Option<&str>> {
    match change {
        StoredImageChange::Keep => None,
        StoredImageChange::Set(path) => Some(Some(path.as_str())),
        StoredImageChange::Clear => Some(None),
    }
}

#[async_trait]
impl ContentRepository for DieselContentRepository {
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: TicketRow = diesel::insert_into(tickets::table)
            .values(&new_ticket_row(ticket))
            .returning(TicketRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let author = author_of(&mut conn, row.user_id).await?;
        Ok(row.into_ticket(author))
    }

    async fn insert_ticket_with_review(
        &self,
        ticket: &NewTicket,
        review: &NewReview,
    ) -> Result<ReviewWithTicket, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ticket_row = new_ticket_row(ticket);

        let (ticket_row, review_row) = conn
            .transaction(|conn| {
                async move {
                    let inserted: TicketRow = diesel::insert_into(tickets::table)
                        .values(&ticket_row)
                        .returning(TicketRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let review: ReviewRow = diesel::insert_into(reviews::table)
                        .values(&new_review_row(inserted.id, review))
                        .returning(ReviewRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok((inserted, review))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let authors = Authors::load(
            &mut conn,
            HashSet::from([ticket_row.user_id, review_row.user_id]),
        )
        .await?;
        let review_author = authors.get(&review_row.user_id)?;
        let ticket_author = authors.get(&ticket_row.user_id)?;
        Ok(ReviewWithTicket {
            review: to_review(review_row, review_author)?,
            ticket: ticket_row.into_ticket(ticket_author),
        })
    }

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(TicketRow, UserRow)> = tickets::table
            .inner_join(users::table)
            .filter(tickets::id.eq(id.get()))
            .select((TicketRow::as_select(), UserRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(ticket, author)| Ok(ticket.into_ticket(to_user(author)?)))
            .transpose()
    }

    async fn update_ticket(
        &self,
        id: TicketId,
        draft: &TicketDraft,
        image: &StoredImageChange,
    ) -> Result<Option<Ticket>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = TicketUpdate {
            title: draft.title(),
            description: draft.description(),
            image: image_column(image),
        };
        let row: Option<TicketRow> = diesel::update(tickets::table.find(id.get()))
            .set(&update)
            .returning(TicketRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let author = author_of(&mut conn, row.user_id).await?;
        Ok(Some(row.into_ticket(author)))
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(tickets::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn insert_review(
        &self,
        ticket_id: TicketId,
        review: &NewReview,
    ) -> Result<Review, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = new_review_row(ticket_id.get(), review);

        // Hold a key-share lock so the ticket cannot vanish between the
        // existence check and the insert.
        let inserted: Option<ReviewRow> = conn
            .transaction(|conn| {
                async move {
                    let parent: Option<i64> = tickets::table
                        .find(row.ticket_id)
                        .select(tickets::id)
                        .for_key_share()
                        .first(conn)
                        .await
                        .optional()?;
                    if parent.is_none() {
                        return Ok(None);
                    }
                    diesel::insert_into(reviews::table)
                        .values(&row)
                        .returning(ReviewRow::as_returning())
                        .get_result(conn)
                        .await
                        .map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let row = inserted.ok_or_else(|| ContentRepositoryError::missing_ticket(ticket_id.get()))?;
        let author = author_of(&mut conn, row.user_id).await?;
        to_review(row, author)
    }

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(ReviewRow, UserRow)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::id.eq(id.get()))
            .select((ReviewRow::as_select(), UserRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(review, author)| to_review(review, to_user(author)?))
            .transpose()
    }

    async fn update_review(
        &self,
        id: ReviewId,
        draft: &ReviewDraft,
    ) -> Result<Option<Review>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = ReviewUpdate {
            rating: rating_for_db(draft),
            headline: draft.headline(),
            body: draft.body(),
        };
        let row: Option<ReviewRow> = diesel::update(reviews::table.find(id.get()))
            .set(&update)
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let author = author_of(&mut conn, row.user_id).await?;
        to_review(row, author).map(Some)
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(reviews::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn tickets_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<Vec<Ticket>, ContentRepositoryError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = authors.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(TicketRow, UserRow)> = tickets::table
            .inner_join(users::table)
            .filter(tickets::user_id.eq_any(ids))
            .select((TicketRow::as_select(), UserRow::as_select()))
            .order_by((tickets::created_at.desc(), tickets::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(ticket, author)| Ok(ticket.into_ticket(to_user(author)?)))
            .collect()
    }

    async fn reviews_matching(
        &self,
        filter: &ReviewFilter,
    ) -> Result<Vec<ReviewWithTicket>, ContentRepositoryError> {
        let to_uuids = |ids: &[UserId]| ids.iter().map(|id| *id.as_uuid()).collect::<Vec<_>>();
        let authors = to_uuids(&filter.authors);
        let owners = to_uuids(filter.ticket_owner.as_slice());
        let excluded = to_uuids(&filter.excluded_authors);
        if authors.is_empty() && owners.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ReviewRow, TicketRow)> = reviews::table
            .inner_join(tickets::table)
            .filter(
                reviews::user_id
                    .eq_any(authors)
                    .or(tickets::user_id.eq_any(owners)),
            )
            .filter(diesel::dsl::not(reviews::user_id.eq_any(excluded)))
            .select((ReviewRow::as_select(), TicketRow::as_select()))
            .order_by((reviews::created_at.desc(), reviews::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids: HashSet<Uuid> = rows
            .iter()
            .flat_map(|(review, ticket)| [review.user_id, ticket.user_id])
            .collect();
        let people = Authors::load(&mut conn, ids).await?;

        rows.into_iter()
            .map(|(review, ticket)| {
                let review_author = people.get(&review.user_id)?;
                let ticket_author = people.get(&ticket.user_id)?;
                Ok(ReviewWithTicket {
                    review: to_review(review, review_author)?,
                    ticket: ticket.into_ticket(ticket_author),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, ContentRepositoryError::Connection { .. }));
    }

    #[rstest]
    #[case(StoredImageChange::Keep, None)]
    #[case(StoredImageChange::Set("tickets/a.png".to_owned()), Some(Some("tickets/a.png")))]
    #[case(StoredImageChange::Clear, Some(None))]
    fn image_change_maps_to_changeset_column(
        #[case] change: StoredImageChange,
        #[case] expected: Option<Option<&str>>,
    ) {
        assert_eq!(image_column(&change), expected);
    }

    #[rstest]
    fn missing_author_is_a_query_error() {
        let authors = Authors(HashMap::new());
        let err = authors.get(&Uuid::new_v4()).expect_err("missing author");
        assert!(matches!(err, ContentRepositoryError::Query { .. }));
    }
}
