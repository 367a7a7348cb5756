//! Driven port for credential hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing a password.
    pub enum PasswordHashError {
        /// The hasher rejected the input or failed internally.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// One-way credential hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce an encoded hash embedding its own salt and parameters.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against an encoded hash. Malformed hashes never match.
    fn verify(&self, password: &str, encoded: &str) -> bool;
}
