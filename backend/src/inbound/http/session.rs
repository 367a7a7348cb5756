//! Session access for handlers.
//!
//! [`SessionContext`] is used by the account handlers that start or end a
//! session. Every other handler takes a [`Viewer`], which resolves the
//! signed-in user from the cookie or rejects the request with
//! `401 Unauthorized` before the handler body runs.

use std::fmt;

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

fn read_user_id(session: &Session) -> Result<Option<UserId>, Error> {
    let Some(raw) = session
        .get::<String>(USER_ID_KEY)
        .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
    else {
        return Ok(None);
    };
    match UserId::new(raw) {
        Ok(id) => Ok(Some(id)),
        Err(error) => {
            warn!(%error, "discarding session with malformed user id");
            Ok(None)
        }
    }
}

/// Writes and clears the session cookie on behalf of the account handlers.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Remember `user_id` as the signed-in user.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Forget the signed-in user and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// The signed-in user a request acts for.
///
/// Extraction fails with [`Error::unauthorized`] when the session carries no
/// valid user id.
#[derive(Clone, PartialEq, Eq)]
pub struct Viewer(UserId);

impl Viewer {
    /// Borrow the user id.
    pub fn id(&self) -> &UserId {
        &self.0
    }

    /// Take the user id.
    pub fn into_user_id(self) -> UserId {
        self.0
    }
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Viewer").field(&self.0.as_ref()).finish()
    }
}

impl FromRequest for Viewer {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let resolved = read_user_id(&req.get_session())
            .and_then(|id| id.ok_or_else(|| Error::unauthorized("login required")))
            .map(Viewer)
            .map_err(actix_web::Error::from);
        ready(resolved)
    }
}
