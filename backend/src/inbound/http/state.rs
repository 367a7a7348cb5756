//! Port handles shared by every HTTP handler.
//!
//! Handlers receive [`HttpState`] through `web::Data` and only ever see the
//! driving ports, so handler tests can swap in mocks without touching I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ContentCommand, ContentQuery, LoginService, RelationshipsCommand, RelationshipsQuery,
    SignupService, UsersQuery,
};

/// Driving ports used by the `/api/v1` handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential checks for `/login`.
    pub login: Arc<dyn LoginService>,
    /// Account creation for `/signup`.
    pub signup: Arc<dyn SignupService>,
    /// Follow candidates for `/follow-users`.
    pub users: Arc<dyn UsersQuery>,
    /// Ticket and review mutations.
    pub content: Arc<dyn ContentCommand>,
    /// Feed, posts and single-ticket reads.
    pub content_query: Arc<dyn ContentQuery>,
    /// Follow and block edges.
    pub relationships: Arc<dyn RelationshipsCommand>,
    /// The subscriptions overview.
    pub relationships_query: Arc<dyn RelationshipsQuery>,
}

impl HttpState {
    /// Wire the three domain services, each covering several ports.
    ///
    /// `accounts` answers login and signup, `relationships` owns follow,
    /// block and candidate queries, and `content` owns tickets, reviews and
    /// feed assembly.
    pub fn from_services<A, R, C>(accounts: Arc<A>, relationships: Arc<R>, content: Arc<C>) -> Self
    where
        A: LoginService + SignupService + 'static,
        R: UsersQuery + RelationshipsCommand + RelationshipsQuery + 'static,
        C: ContentCommand + ContentQuery + 'static,
    {
        Self {
            login: accounts.clone(),
            signup: accounts,
            users: relationships.clone(),
            content: content.clone(),
            content_query: content,
            relationships: relationships.clone(),
            relationships_query: relationships,
        }
    }
}
