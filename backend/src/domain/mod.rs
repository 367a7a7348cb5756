//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services implementing the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable identifier.
//! - User / UserId / Username: account identity.
//! - Ticket / Review and their drafts: content and its validation.
//! - RelationshipSnapshot and `visible_authors`: follow/block visibility.
//! - FeedEntry and `assemble_feed`: reverse-chronological timelines.
//! - AccountService, ContentService, RelationshipService: use-cases.

pub mod account_service;
pub mod auth;
pub mod content;
pub mod content_service;
pub mod error;
pub mod feed;
pub mod ports;
pub mod relationship_service;
pub mod relationships;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, SignupDetails, SignupValidationError,
};
pub use self::content::{
    ContentValidationError, ImageEdit, ImageFormat, ImageUpload, NewReview, NewTicket, Rating,
    Review, ReviewDraft, ReviewId, ReviewWithTicket, StoredImageChange, Ticket,
    TicketDraft, TicketId,
};
pub use self::content_service::ContentService;
pub use self::error::{Error, ErrorCode};
pub use self::feed::{ContentKind, FeedEntry, ReviewFilter, assemble_feed};
pub use self::relationship_service::RelationshipService;
pub use self::relationships::{
    BlockOutcome, BlockedUser, FollowOutcome, RelationshipOverview, RelationshipSnapshot,
    visible_authors,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{USERNAME_MAX, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use litrevu::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
