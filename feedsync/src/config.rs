//! Client configuration.
//!
//! The source project shipped two near-identical managers that differed
//! only in validation strictness and which sign-in providers were wired
//! up. Both collapse into one client parameterized by this config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default feed page size.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Per-list cap on search results.
pub const DEFAULT_SEARCH_LIMIT: u64 = 10;
/// Comment preview length carried in notifications, in code points.
pub const DEFAULT_COMMENT_PREVIEW_LEN: usize = 50;
/// Upper bound on comment content, in code points.
pub const DEFAULT_MAX_COMMENT_LEN: usize = 1000;
/// Upper bound on post content, in code points (strict mode only).
pub const DEFAULT_MAX_POST_LEN: usize = 5000;
/// Deadline applied to every remote call.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

/// Sign-in providers that can be enabled for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Password,
    Google,
    Facebook,
}

/// How much input validation the client performs before touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Required-field and length checks only.
    Relaxed,
    /// Additionally enforces email format, username charset, post length,
    /// and image-URL parsing.
    #[default]
    Strict,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub strictness: Strictness,
    pub providers: Vec<AuthProvider>,
    pub page_size: u64,
    pub search_limit: u64,
    pub comment_preview_len: usize,
    pub max_comment_len: usize,
    pub max_post_len: usize,
    pub op_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::Strict,
            providers: vec![AuthProvider::Password, AuthProvider::Google, AuthProvider::Facebook],
            page_size: DEFAULT_PAGE_SIZE,
            search_limit: DEFAULT_SEARCH_LIMIT,
            comment_preview_len: DEFAULT_COMMENT_PREVIEW_LEN,
            max_comment_len: DEFAULT_MAX_COMMENT_LEN,
            max_post_len: DEFAULT_MAX_POST_LEN,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }
}

impl FeedConfig {
    /// Profile matching the source's "simple" manager: relaxed validation,
    /// password sign-in only.
    pub fn relaxed() -> Self {
        Self {
            strictness: Strictness::Relaxed,
            providers: vec![AuthProvider::Password],
            ..Self::default()
        }
    }

    pub fn provider_enabled(&self, provider: AuthProvider) -> bool {
        self.providers.contains(&provider)
    }
}
