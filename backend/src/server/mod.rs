//! HTTP server assembly: session cookie policy, API scope and probes.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use tracing::info;

use litrevu::Trace;
#[cfg(debug_assertions)]
use litrevu::doc::ApiDoc;
use litrevu::inbound::http::configure_api_with_image_limit;
use litrevu::inbound::http::health::{HealthState, live, ready};
use litrevu::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_COOKIE: &str = "session";
const SESSION_TTL_HOURS: i64 = 2;

/// Cookie policy shared by every worker.
#[derive(Clone)]
struct CookiePolicy {
    key: Key,
    secure: bool,
    same_site: SameSite,
}

impl CookiePolicy {
    fn into_middleware(self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key)
            .cookie_name(SESSION_COOKIE.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
            )
            .build()
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cookies: CookiePolicy,
    max_image_bytes: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .wrap(cookies.into_middleware())
        .configure(|cfg| configure_api_with_image_limit(cfg, max_image_bytes));

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

#[cfg(feature = "metrics")]
fn prometheus() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("litrevu")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))
}

/// Bind the HTTP server described by `config`.
///
/// The health state is marked ready once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the media root cannot be opened, the
/// metrics registry cannot be built, or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let max_image_bytes = config.max_image_bytes;
    let cookies = CookiePolicy {
        key: config.key,
        secure: config.cookie_secure,
        same_site: config.same_site,
    };
    #[cfg(feature = "metrics")]
    let metrics = prometheus()?;

    let workers_health = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(
            workers_health.clone(),
            http_state.clone(),
            cookies.clone(),
            max_image_bytes,
        );
        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());
        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    info!(bind_addr = %config.bind_addr, "litrevu listening");
    Ok(server)
}
