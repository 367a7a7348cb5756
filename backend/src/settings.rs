//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `LITREVU_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::content_service::DEFAULT_MAX_IMAGE_BYTES;
use crate::inbound::http::session_config::SessionToggles;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/litrevu";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LITREVU")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Directory holding uploaded ticket images.
    pub media_root: Option<PathBuf>,
    /// Largest accepted image upload in bytes.
    pub max_image_bytes: Option<usize>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for session cookies.
    pub same_site: Option<String>,
    /// Allow a generated session key when the key file is missing.
    pub allow_ephemeral_session_key: Option<bool>,
    /// Apply pending migrations on startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    /// Database URL, defaulting to a local `litrevu` database.
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Media root directory.
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Image size limit in bytes.
    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES)
    }

    /// Session toggles for [`crate::inbound::http::session_config::session_settings`].
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self
                .session_key_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE)),
            cookie_secure: self.cookie_secure,
            same_site: self.same_site.clone(),
            allow_ephemeral: self.allow_ephemeral_session_key,
        }
    }
}
