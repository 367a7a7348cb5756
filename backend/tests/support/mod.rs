//! Shared harness for HTTP integration tests.
//!
//! Wires the real domain services onto the in-memory adapters from
//! `litrevu::test_support` and exposes the API behind the same session and
//! trace middleware the server uses.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use litrevu::Trace;
use litrevu::domain::{AccountService, ContentService, RelationshipService};
use litrevu::inbound::http::configure_api;
use litrevu::inbound::http::state::HttpState;
use litrevu::test_support::{
    InMemoryContentRepository, InMemoryMediaStore, InMemoryRelationshipRepository,
    InMemoryUserRepository, MutableClock, PlainTextHasher,
};
use serde_json::{Value, json};

/// In-memory stores plus the HTTP state built over them.
pub struct World {
    pub relationships: Arc<InMemoryRelationshipRepository>,
    pub content: Arc<InMemoryContentRepository>,
    pub media: Arc<InMemoryMediaStore>,
    pub clock: Arc<MutableClock>,
    state: web::Data<HttpState>,
    key: Key,
}

impl World {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let relationships = Arc::new(InMemoryRelationshipRepository::new(users.clone()));
        let content = Arc::new(InMemoryContentRepository::new(users.clone()));
        let media = Arc::new(InMemoryMediaStore::new());
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .single()
            .expect("valid start time");
        let clock = Arc::new(MutableClock::new(start));

        let accounts = Arc::new(AccountService::new(
            users.clone(),
            Arc::new(PlainTextHasher),
            clock.clone(),
        ));
        let relationship_service =
            Arc::new(RelationshipService::new(users.clone(), relationships.clone()));
        let content_service = Arc::new(ContentService::new(
            content.clone(),
            relationships.clone(),
            media.clone(),
            clock.clone(),
        ));
        let state = web::Data::new(HttpState::from_services(
            accounts,
            relationship_service,
            content_service,
        ));

        Self {
            relationships,
            content,
            media,
            clock,
            state,
            key: Key::generate(),
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .cookie_content_security(CookieContentSecurity::Private)
            .build();
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(configure_api))
    }
}

/// A signed-up user and their session cookie.
pub struct Member {
    pub id: String,
    pub cookie: Cookie<'static>,
}

/// Sign up `username` and keep the issued session cookie.
pub async fn sign_up<S>(app: &S, username: &str) -> Member
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({
                "username": username,
                "password": "correct horse",
                "passwordConfirmation": "correct horse",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "signup {username}");
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie issued");
    let body: Value = actix_test::read_body_json(response).await;
    let id = body
        .get("id")
        .and_then(Value::as_str)
        .expect("user id")
        .to_owned();
    Member { id, cookie }
}

/// POST `body` as `member`, returning status and JSON body (or `Null`).
pub async fn post<S>(app: &S, member: &Member, uri: &str, body: Value) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(uri)
            .cookie(member.cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    read(response).await
}

/// GET `uri` as `member`.
pub async fn get<S>(app: &S, member: &Member, uri: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri(uri)
            .cookie(member.cookie.clone())
            .to_request(),
    )
    .await;
    read(response).await
}

async fn read(response: ServiceResponse) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

/// Titles and kinds of a feed response, in order.
pub fn feed_summary(feed: &Value) -> Vec<(String, String)> {
    feed.as_array()
        .expect("feed array")
        .iter()
        .map(|entry| {
            let kind = entry
                .get("contentType")
                .and_then(Value::as_str)
                .expect("contentType")
                .to_owned();
            let label = match kind.as_str() {
                "REVIEW" => entry.pointer("/review/headline"),
                _ => entry.pointer("/ticket/title"),
            }
            .and_then(Value::as_str)
            .expect("label")
            .to_owned();
            (kind, label)
        })
        .collect()
}

/// Create a ticket as `member`, returning its id.
pub async fn create_ticket<S>(app: &S, member: &Member, title: &str) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = post(app, member, "/api/v1/ticket", json!({ "title": title })).await;
    assert_eq!(status, StatusCode::CREATED, "create ticket {title}");
    body.get("id").and_then(Value::as_i64).expect("ticket id")
}

/// Review `ticket_id` as `member`, returning the review id.
pub async fn create_review<S>(app: &S, member: &Member, ticket_id: i64, headline: &str) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = post(
        app,
        member,
        &format!("/api/v1/review/create/{ticket_id}"),
        json!({ "rating": 4, "headline": headline }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create review {headline}");
    body.get("id").and_then(Value::as_i64).expect("review id")
}
