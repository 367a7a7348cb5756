//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain values live here
//! so every repository validates stored data the same way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Rating, Review, ReviewId, Ticket, TicketId, User, UserId, UserValidationError, Username,
};

use super::schema::{reviews, tickets, user_blocks, user_follows, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, UserValidationError> {
        Ok(User::new(
            UserId::from_uuid(self.id),
            Username::new(self.username)?,
        ))
    }
}

/// Row struct for login lookups.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// Insertable struct for registering an account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Content models
// ---------------------------------------------------------------------------

/// Row struct for reading from the tickets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TicketRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TicketRow {
    pub(crate) fn into_ticket(self, author: User) -> Ticket {
        Ticket {
            id: TicketId::new(self.id),
            title: self.title,
            description: self.description,
            image: self.image,
            author,
            created_at: self.created_at,
        }
    }
}

/// Insertable struct for creating tickets.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub(crate) struct NewTicketRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image: Option<&'a str>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Changeset for editing a ticket; `image: None` leaves the column alone.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tickets)]
pub(crate) struct TicketUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image: Option<Option<&'a str>>,
}

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: i64,
    pub ticket_id: i64,
    pub rating: i16,
    pub headline: String,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    pub(crate) fn into_review(self, author: User) -> Result<Review, String> {
        let rating = Rating::new(i64::from(self.rating)).map_err(|err| err.to_string())?;
        Ok(Review {
            id: ReviewId::new(self.id),
            ticket_id: TicketId::new(self.ticket_id),
            rating,
            headline: self.headline,
            body: self.body,
            author,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for creating reviews.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub ticket_id: i64,
    pub rating: i16,
    pub headline: &'a str,
    pub body: &'a str,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Changeset for editing a review.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reviews)]
pub(crate) struct ReviewUpdate<'a> {
    pub rating: i16,
    pub headline: &'a str,
    pub body: &'a str,
}

// ---------------------------------------------------------------------------
// Relationship models
// ---------------------------------------------------------------------------

/// Insertable follow edge; `created_at` takes the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_follows)]
pub(crate) struct NewFollowRow {
    pub user_id: Uuid,
    pub followed_user_id: Uuid,
}

/// Insertable block edge; `created_at` takes the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_blocks)]
pub(crate) struct NewBlockRow {
    pub user_id: Uuid,
    pub blocked_user_id: Uuid,
}
