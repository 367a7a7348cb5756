//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, and the
//! schema wrappers from [`crate::inbound::http::schemas`] so domain types stay
//! free of utoipa derives. The session cookie is declared as the default
//! security scheme; signup and login opt out per operation.
//!
//! The document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::relationships::FollowRequest;
use crate::inbound::http::reviews::{ReviewPayload, TicketWithReviewPayload};
use crate::inbound::http::schemas::{
    BlockedUserSchema, ContentKindSchema, ErrorCodeSchema, ErrorSchema, FeedEntrySchema,
    RelationshipOverviewSchema, ReviewSchema, ReviewWithTicketSchema, TicketSchema, UserSchema,
};
use crate::inbound::http::tickets::{EditTicketPayload, TicketPayload};
use crate::inbound::http::users::{LoginRequest, SignupRequest};
use crate::inbound::http::validation::ImagePayload;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login or /api/v1/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "LITRevu API",
        description = "Tickets, reviews, follows and blocks behind a session-authenticated feed."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::feed::feed,
        crate::inbound::http::feed::posts,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::edit_ticket,
        crate::inbound::http::tickets::delete_ticket,
        crate::inbound::http::reviews::create_ticket_with_review,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::edit_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::relationships::overview,
        crate::inbound::http::relationships::follow,
        crate::inbound::http::relationships::unfollow,
        crate::inbound::http::relationships::block,
        crate::inbound::http::relationships::unblock,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        ErrorSchema,
        ErrorCodeSchema,
        TicketSchema,
        ReviewSchema,
        ReviewWithTicketSchema,
        ContentKindSchema,
        FeedEntrySchema,
        BlockedUserSchema,
        RelationshipOverviewSchema,
        LoginRequest,
        SignupRequest,
        ImagePayload,
        TicketPayload,
        EditTicketPayload,
        ReviewPayload,
        TicketWithReviewPayload,
        FollowRequest,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and follow candidates"),
        (name = "feed", description = "Assembled feed and own posts"),
        (name = "tickets", description = "Review requests"),
        (name = "reviews", description = "Rated responses to tickets"),
        (name = "relationships", description = "Follows and blocks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
