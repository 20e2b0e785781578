//! Feed synchronization core.
//!
//! Translates user intents (create post, toggle like, comment, share,
//! delete, search, profile edits) into remote-store mutations, keeps the
//! returned view state consistent with the store, and derives notification
//! side effects. The store and session backends are injected; the crate
//! holds no process-wide state.
//!
//! ```ignore
//! let store = MemoryStore::new();
//! let client = FeedClient::new(store);
//! let post = client.create_post("u1", "Hello world", Vec::new()).await?;
//! let outcome = client.toggle_like(&post.id, "u2").await?;
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod id;
pub mod keys;
pub mod model;
pub mod session;
pub mod store;
pub mod timefmt;
pub mod validators;

pub use client::{FeedClient, FeedPage, RegistrationInput};
pub use config::{AuthProvider, FeedConfig, Strictness};
pub use errors::{FeedError, ValidationError, ValidationIssue, ValidationResult};
pub use model::{
    AuthorCard, Comment, LikeOutcome, Notification, NotificationData, NotificationKind, Post, PostView, SearchHits,
    SessionUser, SharedPostView, UserProfile, UserSettings,
};
pub use session::{SessionProvider, SessionState, require_user};
pub use store::{Cursor, Document, FieldOp, FieldOpKind, MemoryStore, Query, RedisStore, SortOrder, Store};

// Re-export redis so embedders don't need to depend on a specific version
// to hand a connection to `RedisStore`.
pub use redis;
pub use redis::aio::ConnectionManager;
