//! Reviews: rated responses to a ticket.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ticket::{Ticket, TicketId};
use super::validation::{
    BODY_MAX, ContentValidationError, HEADLINE_MAX, optional_text, rating, required_text,
};
use crate::domain::{User, UserId};

/// Store-assigned review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(i64);

impl ReviewId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rating between 0 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a raw rating.
    ///
    /// # Examples
    /// ```
    /// use litrevu::domain::Rating;
    ///
    /// assert!(Rating::new(0).is_ok());
    /// assert!(Rating::new(5).is_ok());
    /// assert!(Rating::new(6).is_err());
    /// assert!(Rating::new(-1).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, ContentValidationError> {
        rating(value).map(Self)
    }

    /// Numeric value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ContentValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Validated review fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    rating: Rating,
    headline: String,
    body: String,
}

impl ReviewDraft {
    /// Validate a rating, headline (required) and body (optional).
    pub fn new(rating: i64, headline: &str, body: &str) -> Result<Self, ContentValidationError> {
        Ok(Self {
            rating: Rating::new(rating)?,
            headline: required_text("headline", headline, HEADLINE_MAX)?,
            body: optional_text("body", body, BODY_MAX)?,
        })
    }

    /// Rating.
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Headline.
    pub fn headline(&self) -> &str {
        &self.headline
    }

    /// Body, possibly empty.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A persisted review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Identifier.
    pub id: ReviewId,
    /// Parent ticket.
    pub ticket_id: TicketId,
    /// Rating between 0 and 5.
    pub rating: Rating,
    /// Headline, at most 128 characters.
    pub headline: String,
    /// Body, at most 8192 characters.
    pub body: String,
    /// Owning user.
    pub author: User,
    /// Creation time; never changes after insert.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Whether `user_id` owns this review.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.author.id() == user_id
    }
}

/// A review together with the ticket it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithTicket {
    /// The review.
    pub review: Review,
    /// Its parent ticket.
    pub ticket: Ticket,
}

/// Values for inserting a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Owning user.
    pub owner: UserId,
    /// Validated fields.
    pub draft: ReviewDraft,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
