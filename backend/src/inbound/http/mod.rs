//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod feed;
pub mod health;
pub mod relationships;
pub mod reviews;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::content_service::DEFAULT_MAX_IMAGE_BYTES;

/// Headroom for the non-image fields of a JSON body.
const JSON_TEXT_ALLOWANCE: usize = 64 * 1024;

/// Largest JSON body that can carry a base64 image of `max_image_bytes`.
pub fn json_body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(JSON_TEXT_ALLOWANCE)
}

/// Register every `/api/v1` handler on `cfg` with the default image limit.
///
/// The caller owns the scope and the session middleware wrapping it.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use litrevu::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    configure_api_with_image_limit(cfg, DEFAULT_MAX_IMAGE_BYTES);
}

/// Register every `/api/v1` handler, sizing JSON bodies for images of up to
/// `max_image_bytes`.
///
/// Malformed bodies and path parameters are answered with the shared error
/// schema instead of Actix's plain-text defaults.
pub fn configure_api_with_image_limit(cfg: &mut web::ServiceConfig, max_image_bytes: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(json_body_limit(max_image_bytes))
            .error_handler(error::json_error_handler),
    )
    .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
    .service(users::signup)
    .service(users::login)
    .service(users::logout)
    .service(users::list_users)
    .service(feed::feed)
    .service(feed::posts)
    .service(tickets::create_ticket)
    .service(tickets::get_ticket)
    .service(tickets::edit_ticket)
    .service(tickets::delete_ticket)
    .service(reviews::create_ticket_with_review)
    .service(reviews::create_review)
    .service(reviews::edit_review)
    .service(reviews::delete_review)
    .service(relationships::overview)
    .service(relationships::follow)
    .service(relationships::unfollow)
    .service(relationships::block)
    .service(relationships::unblock);
}
