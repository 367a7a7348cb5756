//! Driven port for account persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } => "username already taken: {username}",
    }
}

/// A new account ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Identity of the new user.
    pub user: User,
    /// Encoded credential hash.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A user together with their stored credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// The account owner.
    pub user: User,
    /// Encoded credential hash.
    pub password_hash: String,
}

/// Account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; fails with `DuplicateUsername` when taken.
    async fn create(&self, account: &NewAccount) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the credential hash for a login attempt.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// All users ordered by username.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;
}
