//! Account services: signup and login.
//!
//! Passwords are hashed on the blocking pool so argon2 never stalls the
//! async executor. Unknown usernames and wrong passwords produce the same
//! `unauthorized` error.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginService, NewAccount, PasswordHashError, PasswordHasher, SignupService,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Error, LoginCredentials, SignupDetails, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the login and signup driving ports.
#[derive(Clone)]
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> AccountService<U, H> {
    /// Create a new service with the given repository, hasher and clock.
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username already taken: {username}"))
                .with_field("username", "duplicate")
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

impl<U, H> AccountService<U, H>
where
    H: PasswordHasher + 'static,
{
    async fn hash_password(&self, password: String) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify_password(&self, password: String, encoded: String) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
    }
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(stored) = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?
        else {
            debug!(username = credentials.username(), "login for unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .verify_password(credentials.password().to_owned(), stored.password_hash)
            .await?;
        if !matches {
            debug!(user_id = %stored.user.id(), "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user.id().clone())
    }
}

#[async_trait]
impl<U, H> SignupService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error> {
        let password_hash = self.hash_password(details.password().to_owned()).await?;
        let user = User::new(UserId::random(), details.username().clone());
        let account = NewAccount {
            user: user.clone(),
            password_hash,
            created_at: self.clock.utc(),
        };
        self.users.create(&account).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), username = %user.username(), "account created");
        Ok(user)
    }
}
