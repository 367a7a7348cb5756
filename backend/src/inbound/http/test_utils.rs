//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test as actix_test, web};

use crate::domain::{Error, UserId};
use crate::domain::ports::{
    MockContentCommand, MockContentQuery, MockLoginService, MockRelationshipsCommand,
    MockRelationshipsQuery, MockSignupService, MockUsersQuery,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocked driving ports, configured per test and frozen into [`HttpState`].
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub signup: MockSignupService,
    pub users: MockUsersQuery,
    pub content: MockContentCommand,
    pub content_query: MockContentQuery,
    pub relationships: MockRelationshipsCommand,
    pub relationships_query: MockRelationshipsQuery,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            login: Arc::new(self.login),
            signup: Arc::new(self.signup),
            users: Arc::new(self.users),
            content: Arc::new(self.content),
            content_query: Arc::new(self.content_query),
            relationships: Arc::new(self.relationships),
            relationships_query: Arc::new(self.relationships_query),
        })
    }
}

/// Route used by handler tests to mint a session cookie for `user_id`.
pub const TEST_LOGIN_PATH: &str = "/test-login/{id}";

async fn test_login(session: SessionContext, id: web::Path<String>) -> Result<HttpResponse, Error> {
    let user_id =
        UserId::new(id.into_inner()).map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the test login route on `cfg`.
pub fn configure_test_login(cfg: &mut web::ServiceConfig) {
    cfg.route(TEST_LOGIN_PATH, web::get().to(test_login));
}

/// Application exposing every API handler over `state`, plus the test login
/// route.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(test_session_middleware())
        .configure(configure_test_login)
        .service(web::scope("/api/v1").configure(super::configure_api))
}

/// Call the test login route and return the issued session cookie.
pub async fn session_cookie<S>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::get()
        .uri(&format!("/test-login/{user_id}"))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "test login succeeds");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie issued")
}
