//! Driving ports for account use-cases: login and signup.
//!
//! Inbound adapters authenticate through these traits without knowing how
//! credentials are stored or hashed, so handler tests can swap in mocks.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SignupDetails, User, UserId};

/// Authentication use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Account creation use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupService: Send + Sync {
    /// Register a new account; a taken username yields `conflict`.
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error>;
}
