//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`).
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature.

mod clock;
mod memory;

pub use clock::MutableClock;
pub use memory::{
    InMemoryContentRepository, InMemoryMediaStore, InMemoryRelationshipRepository,
    InMemoryUserRepository, PlainTextHasher,
};
