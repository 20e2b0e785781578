//! The configurable feed client.
//!
//! One client replaces the source project's duplicated "simple" and
//! "full" managers: validation strictness and enabled sign-in providers
//! live in [`FeedConfig`], not in a second code path. The client owns no
//! global state; it is constructed over an injected [`Store`].
//!
//! Operation groups:
//! - `feed` - paginated reads with author/shared-post resolution
//! - `posting` - create, share, delete
//! - `engagement` - likes, comments, notifications
//! - `search` - prefix search over users and posts
//! - `registration` - profile lifecycle and presence

mod engagement;
mod feed;
mod posting;
mod registration;
mod search;

pub use feed::FeedPage;
pub use registration::RegistrationInput;

use std::future::Future;

use crate::config::FeedConfig;
use crate::errors::FeedError;
use crate::model::{NotificationData, NotificationKind, Post, UserProfile, collections};
use crate::store::Store;

pub struct FeedClient<S: Store> {
    store: S,
    config: FeedConfig,
}

impl<S: Store> FeedClient<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, FeedConfig::default())
    }

    pub fn with_config(store: S, config: FeedConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bound a remote call by the configured deadline. Expiry surfaces as
    /// a retryable `StoreUnavailable`; the client never retries on its own.
    pub(crate) async fn call<T>(&self, fut: impl Future<Output = Result<T, FeedError>>) -> Result<T, FeedError> {
        match tokio::time::timeout(self.config.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::unavailable("remote call timed out")),
        }
    }

    pub(crate) async fn get_post(&self, post_id: &str) -> Result<Post, FeedError> {
        let doc = self
            .call(self.store.get(collections::POSTS, post_id))
            .await?
            .ok_or_else(|| FeedError::not_found(post_id))?;
        doc.deserialize()
    }

    pub(crate) async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, FeedError> {
        match self.call(self.store.get(collections::USERS, uid)).await? {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Best-effort notification write. Self-notifications are skipped, and
    /// a failed write never fails the mutation that triggered it: the
    /// triggering call already persisted, so the failure is logged and
    /// swallowed.
    pub(crate) async fn notify(
        &self,
        recipient: &str,
        actor: &str,
        kind: NotificationKind,
        message: &str,
        data: NotificationData,
    ) {
        if recipient == actor {
            return;
        }
        let payload = serde_json::json!({
            "user_id": recipient,
            "kind": kind,
            "message": message,
            "data": data,
            "read": false,
        });
        if let Err(err) = self.call(self.store.insert(collections::NOTIFICATIONS, payload)).await {
            log::warn!("dropping {kind:?} notification for {recipient}: {err}");
        }
    }
}

/// Truncates to at most `max` code points, for notification previews.
pub(crate) fn truncate_preview(content: &str, max: usize) -> String {
    content.chars().take(max).collect()
}
