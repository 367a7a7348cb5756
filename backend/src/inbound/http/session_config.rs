//! Cookie session settings.
//!
//! [`session_settings`] resolves the raw [`SessionToggles`] read from
//! [`crate::settings::AppSettings`] into a signing key plus the cookie flags
//! used by the session middleware. A debug build fills gaps with development
//! defaults and logs each substitution; a release build refuses to start on
//! any missing or unsafe value.

use std::io;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroizing;

/// Shortest key file accepted by release builds.
const SESSION_KEY_MIN_LEN: usize = 64;
/// Shortest master key `Key::derive_from` accepts.
const DERIVE_MIN_LEN: usize = 32;

const COOKIE_SECURE_SETTING: &str = "cookie_secure";
const SAME_SITE_SETTING: &str = "same_site";
const ALLOW_EPHEMERAL_SETTING: &str = "allow_ephemeral_session_key";

/// Whether defaults may stand in for missing toggles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing toggles fall back to development defaults.
    Debug,
    /// Every toggle must be set explicitly.
    Release,
}

impl BuildMode {
    /// The mode matching how this binary was compiled.
    ///
    /// ```rust
    /// use litrevu::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) {
    ///     BuildMode::Debug
    /// } else {
    ///     BuildMode::Release
    /// };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    /// Resolve an optional toggle, substituting `fallback` in debug builds.
    fn require<T>(
        self,
        value: Option<T>,
        name: &'static str,
        fallback: T,
    ) -> Result<T, SessionConfigError> {
        match (value, self) {
            (Some(value), _) => Ok(value),
            (None, Self::Debug) => {
                warn!(setting = name, "setting missing; using development default");
                Ok(fallback)
            }
            (None, Self::Release) => Err(SessionConfigError::Missing { name }),
        }
    }
}

/// Session toggles as they arrive from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToggles {
    /// File holding the signing key material.
    pub key_file: PathBuf,
    /// Mark cookies `Secure`.
    pub cookie_secure: Option<bool>,
    /// One of `Strict`, `Lax` or `None`, case-insensitive.
    pub same_site: Option<String>,
    /// Permit a generated key when `key_file` cannot be read.
    pub allow_ephemeral: Option<bool>,
}

/// Resolved cookie session settings.
pub struct SessionSettings {
    /// Signing and encryption key for the session cookie.
    pub key: Key,
    /// Whether the cookie carries the `Secure` flag.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
}

/// Reasons the session toggles were rejected.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A release build left a toggle unset.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A toggle holds an unrecognised value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The key file is shorter than release builds accept.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` paired with insecure cookies.
    #[error("same_site=None requires cookie_secure=true")]
    InsecureSameSiteNone,
    /// Release builds never run on a generated key.
    #[error("allow_ephemeral_session_key must be false in release builds")]
    EphemeralNotAllowed,
}

/// Resolve `toggles` for `mode`.
///
/// # Errors
/// Returns [`SessionConfigError`] when a release build is missing a toggle,
/// names an unknown `SameSite` policy, pairs `SameSite=None` with insecure
/// cookies, or cannot read a long enough key.
///
/// ```rust
/// use litrevu::inbound::http::session_config::{BuildMode, SessionToggles, session_settings};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("litrevu_session_key_example");
/// std::fs::write(&key_path, vec![b'k'; 64])?;
///
/// let settings = session_settings(
///     &SessionToggles {
///         key_file: key_path.clone(),
///         cookie_secure: Some(true),
///         same_site: Some("lax".into()),
///         allow_ephemeral: Some(false),
///     },
///     BuildMode::Release,
/// )?;
/// assert!(settings.cookie_secure);
///
/// std::fs::remove_file(&key_path)?;
/// # Ok(())
/// # }
/// ```
pub fn session_settings(
    toggles: &SessionToggles,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = mode.require(toggles.cookie_secure, COOKIE_SECURE_SETTING, true)?;

    let default_policy = match mode {
        BuildMode::Debug => SameSite::Lax,
        BuildMode::Release => SameSite::Strict,
    };
    let policy = match toggles.same_site.as_deref() {
        Some(raw) => parse_same_site(raw, mode, default_policy)?,
        None => mode.require(None, SAME_SITE_SETTING, default_policy)?,
    };
    if policy == SameSite::None && !cookie_secure {
        match mode {
            BuildMode::Debug => {
                warn!("same_site=None without cookie_secure; browsers may drop the cookie");
            }
            BuildMode::Release => return Err(SessionConfigError::InsecureSameSiteNone),
        }
    }

    let allow_ephemeral = mode.require(toggles.allow_ephemeral, ALLOW_EPHEMERAL_SETTING, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }

    let key = signing_key(&toggles.key_file, mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site: policy,
    })
}

fn parse_same_site(
    raw: &str,
    mode: BuildMode,
    fallback: SameSite,
) -> Result<SameSite, SessionConfigError> {
    if raw.eq_ignore_ascii_case("strict") {
        Ok(SameSite::Strict)
    } else if raw.eq_ignore_ascii_case("lax") {
        Ok(SameSite::Lax)
    } else if raw.eq_ignore_ascii_case("none") {
        Ok(SameSite::None)
    } else if mode == BuildMode::Debug {
        warn!(value = raw, "unknown same_site policy; using development default");
        Ok(fallback)
    } else {
        Err(SessionConfigError::Invalid {
            name: SAME_SITE_SETTING,
            value: raw.to_owned(),
            expected: "Strict|Lax|None",
        })
    }
}

fn signing_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => Zeroizing::new(bytes),
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "session key unreadable; sessions will not survive a restart"
            );
            return Ok(Key::generate());
        }
        Err(source) => {
            return Err(SessionConfigError::KeyRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if mode == BuildMode::Release && bytes.len() < SESSION_KEY_MIN_LEN {
        return Err(SessionConfigError::KeyTooShort {
            path: path.to_path_buf(),
            length: bytes.len(),
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    if bytes.len() < DERIVE_MIN_LEN {
        warn!(
            path = %path.display(),
            length = bytes.len(),
            "session key too short to derive from; using a temporary key"
        );
        return Ok(Key::generate());
    }
    Ok(Key::derive_from(&bytes))
}
