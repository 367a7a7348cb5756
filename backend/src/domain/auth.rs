//! Authentication primitives: login credentials and signup details.
//!
//! Handlers convert raw payloads through these constructors before talking to
//! the account ports, so the services only ever see validated input.

use zeroize::Zeroizing;

use super::{UserValidationError, Username};

/// Why a login payload was rejected before reaching the account port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty; whitespace is preserved.
///
/// # Examples
/// ```
/// use litrevu::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "secret").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Trim the username and reject blank inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password exactly as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Why a signup payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignupValidationError {
    /// The requested username is not acceptable.
    #[error(transparent)]
    Username(#[from] UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Validated account creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    username: Username,
    password: Zeroizing<String>,
}

impl SignupDetails {
    /// Validate a username, password and its confirmation.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, SignupValidationError> {
        let username = Username::new(username)?;
        if password.is_empty() {
            return Err(SignupValidationError::EmptyPassword);
        }
        if password != confirmation {
            return Err(SignupValidationError::PasswordMismatch);
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plain-text password, zeroised on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
