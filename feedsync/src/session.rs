//! Session-state plumbing.
//!
//! The hosted auth backend is an external collaborator; the core only
//! consumes the identity it supplies. `SessionProvider` exposes the
//! current identity plus a watch subscription the presentation layer uses
//! to gate protected views and drive redirects.

use tokio::sync::watch;

use crate::errors::FeedError;
use crate::model::SessionUser;

pub trait SessionProvider {
    fn current_user(&self) -> Option<SessionUser>;

    /// Single callback-style registration: the receiver yields the current
    /// identity (or absence) on every auth-state change.
    fn watch(&self) -> watch::Receiver<Option<SessionUser>>;
}

/// Returns the signed-in identity or `PermissionDenied` for protected
/// operations.
pub fn require_user<P: SessionProvider>(provider: &P) -> Result<SessionUser, FeedError> {
    provider
        .current_user()
        .ok_or_else(|| FeedError::permission_denied("not signed in"))
}

/// Default `SessionProvider` backed by a watch channel. The embedding
/// shell forwards auth-state changes from the hosted backend into
/// `sign_in` / `sign_out`.
#[derive(Debug)]
pub struct SessionState {
    tx: watch::Sender<Option<SessionUser>>,
}

impl SessionState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn signed_in(user: SessionUser) -> Self {
        let (tx, _rx) = watch::channel(Some(user));
        Self { tx }
    }

    pub fn sign_in(&self, user: SessionUser) {
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for SessionState {
    fn current_user(&self) -> Option<SessionUser> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<SessionUser>> {
        self.tx.subscribe()
    }
}
