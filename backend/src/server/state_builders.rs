//! Builders wiring Diesel, media and security adapters into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use litrevu::domain::{AccountService, ContentService, RelationshipService};
use litrevu::inbound::http::state::HttpState;
use litrevu::outbound::media::CapStdMediaStore;
use litrevu::outbound::persistence::{
    DieselContentRepository, DieselRelationshipRepository, DieselUserRepository,
};
use litrevu::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Build the HTTP state from the configured pool and media root.
///
/// # Errors
/// Returns [`std::io::Error`] when the media root cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(DieselUserRepository::new(config.db_pool.clone()));
    let relationships = Arc::new(DieselRelationshipRepository::new(config.db_pool.clone()));
    let content = Arc::new(DieselContentRepository::new(config.db_pool.clone()));
    let media = Arc::new(
        CapStdMediaStore::open(&config.media_root)
            .map_err(|err| std::io::Error::other(format!("media store unavailable: {err}")))?,
    );

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        clock.clone(),
    ));
    let relationship_service = Arc::new(RelationshipService::new(users, relationships.clone()));
    let content_service = Arc::new(
        ContentService::new(content, relationships, media, clock)
            .with_max_image_bytes(config.max_image_bytes),
    );

    Ok(web::Data::new(HttpState::from_services(
        accounts,
        relationship_service,
        content_service,
    )))
}
