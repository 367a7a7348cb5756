//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, `MediaStore`, `PasswordHasher`) are
//! implemented by outbound adapters. Driving ports (`*Service`, `*Command`,
//! `*Query`) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod content_command;
mod content_query;
mod content_repository;
mod login_service;
mod media_store;
mod password_hasher;
mod relationship_repository;
mod relationships_command;
mod relationships_query;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use content_command::MockContentCommand;
pub use content_command::{
    ContentCommand, CreateReviewRequest, CreateTicketRequest, CreateTicketWithReviewRequest,
    EditReviewRequest, EditTicketRequest,
};
#[cfg(test)]
pub use content_query::MockContentQuery;
pub use content_query::ContentQuery;
#[cfg(test)]
pub use content_repository::MockContentRepository;
pub use content_repository::{ContentRepository, ContentRepositoryError};
#[cfg(test)]
pub use login_service::{MockLoginService, MockSignupService};
pub use login_service::{LoginService, SignupService};
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use relationship_repository::MockRelationshipRepository;
pub use relationship_repository::{RelationshipRepository, RelationshipRepositoryError};
#[cfg(test)]
pub use relationships_command::MockRelationshipsCommand;
pub use relationships_command::RelationshipsCommand;
#[cfg(test)]
pub use relationships_query::MockRelationshipsQuery;
pub use relationships_query::RelationshipsQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewAccount, StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
