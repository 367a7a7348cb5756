//! Backend entry-point: loads settings, prepares the database and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use litrevu::inbound::http::health::HealthState;
use litrevu::inbound::http::session_config::{BuildMode, session_settings};
use litrevu::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use litrevu::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = session_settings(
        &settings.session_toggles(),
        BuildMode::from_debug_assertions(),
    )
    .map_err(std::io::Error::other)?;

    if settings.run_migrations {
        run_pending_migrations(settings.database_url())
            .await
            .map_err(std::io::Error::other)?;
    }

    let pool = DbPool::new(
        PoolConfig::new(settings.database_url()).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(std::io::Error::other)?;

    let config = ServerConfig::new(session, settings.bind_addr(), pool, settings.media_root())
        .with_max_image_bytes(settings.max_image_bytes());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
