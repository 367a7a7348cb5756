//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are backed by `diesel-async` connections from a `bb8` pool.
//!
//! - **Thin adapters**: implementations only translate between Diesel rows
//!   and domain types. Ownership and validation live in the services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: every Diesel or pool failure is mapped to the
//!   port's own error enum.
//!
//! # Example
//!
//! ```no_run
//! use litrevu::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/litrevu")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_content_repository;
mod diesel_relationship_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_content_repository::DieselContentRepository;
pub use diesel_relationship_repository::DieselRelationshipRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
