//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework concerns
//! belong.
#![expect(
    dead_code,
    reason = "Schema wrappers are only read by utoipa during OpenAPI generation"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// A user tried to follow or block themselves.
    #[schema(rename = "self_reference")]
    SelfReference,
    /// A block exists between the two users.
    #[schema(rename = "blocked_relationship")]
    BlockedRelationship,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "title is required")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Unique login name.
    #[schema(example = "ada.l")]
    username: String,
}

/// OpenAPI schema for [`crate::domain::Ticket`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Ticket, rename_all = "camelCase")]
pub struct TicketSchema {
    /// Store-assigned identifier.
    #[schema(example = 42)]
    id: i64,
    /// Title, at most 128 characters.
    #[schema(example = "Dune")]
    title: String,
    /// Description, at most 2048 characters.
    description: String,
    /// Relative media path of the cover image.
    #[schema(example = "tickets/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    image: Option<String>,
    /// Owning user.
    author: UserSchema,
    /// Creation time.
    created_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::Review`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Review, rename_all = "camelCase")]
pub struct ReviewSchema {
    /// Store-assigned identifier.
    #[schema(example = 7)]
    id: i64,
    /// Parent ticket identifier.
    #[schema(example = 42)]
    ticket_id: i64,
    /// Rating between 0 and 5.
    #[schema(minimum = 0, maximum = 5, example = 4)]
    rating: u8,
    /// Headline, at most 128 characters.
    headline: String,
    /// Body, at most 8192 characters.
    body: String,
    /// Owning user.
    author: UserSchema,
    /// Creation time.
    created_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::ReviewWithTicket`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ReviewWithTicket)]
pub struct ReviewWithTicketSchema {
    /// The review.
    review: ReviewSchema,
    /// The ticket created alongside it.
    ticket: TicketSchema,
}

/// OpenAPI schema for [`crate::domain::ContentKind`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ContentKind)]
pub enum ContentKindSchema {
    /// A ticket.
    #[schema(rename = "TICKET")]
    Ticket,
    /// A review with its parent ticket.
    #[schema(rename = "REVIEW")]
    Review,
}

/// OpenAPI schema for [`crate::domain::FeedEntry`].
///
/// `review` is present only when `contentType` is `REVIEW`; `ticket` is the
/// ticket itself or the review's parent.
#[derive(ToSchema)]
#[schema(as = crate::domain::FeedEntry, rename_all = "camelCase")]
pub struct FeedEntrySchema {
    /// Kind tag.
    content_type: ContentKindSchema,
    /// The ticket, or the parent of the review.
    ticket: TicketSchema,
    /// The review, for `REVIEW` entries.
    review: Option<ReviewSchema>,
}

/// OpenAPI schema for [`crate::domain::BlockedUser`].
#[derive(ToSchema)]
#[schema(as = crate::domain::BlockedUser, rename_all = "camelCase")]
pub struct BlockedUserSchema {
    /// The blocked user.
    user: UserSchema,
    /// When the block was created.
    blocked_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::RelationshipOverview`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RelationshipOverview)]
pub struct RelationshipOverviewSchema {
    /// Users the viewer follows.
    following: Vec<UserSchema>,
    /// Users following the viewer.
    followers: Vec<UserSchema>,
    /// Users the viewer blocks.
    blocked: Vec<BlockedUserSchema>,
}
