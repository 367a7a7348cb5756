//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **media**: ticket cover images on the local filesystem via `cap-std`
//! - **security**: argon2id credential hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod media;
pub mod persistence;
pub mod security;
