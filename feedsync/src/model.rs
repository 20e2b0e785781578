//! Entity models for the feed synchronization core.
//!
//! All entities are plain serde documents; the store assigns ids and
//! creation timestamps unless noted otherwise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection names used across the store.
pub mod collections {
    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
    pub const NOTIFICATIONS: &str = "notifications";
}

/// Display name used when an author lookup fails or the author was deleted.
pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown user";

/// A feed post.
///
/// `likes` has set semantics (no duplicate uid); `comments` is append-only
/// from the client's perspective; `shares` only increases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub likes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub shares: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Back-reference to an original post when this post is a share.
    /// A reference, not ownership: the original is never copied, and the
    /// reference may dangle after the original is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_post_id: Option<String>,
}

impl Post {
    pub fn has_liked(&self, user_id: &str) -> bool {
        self.likes.iter().any(|uid| uid == user_id)
    }

    pub fn like_count(&self) -> i64 {
        self.likes.len() as i64
    }
}

/// A comment embedded in its parent post.
///
/// The id is client-generated; comments have no identity outside the post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub likes: Vec<String>,
}

/// Per-user preference block stored inside the profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub notifications: bool,
    pub email_notifications: bool,
    pub privacy: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            email_notifications: true,
            privacy: "public".to_string(),
        }
    }
}

/// A user profile document.
///
/// Created once at registration; mutated by profile edits, online-status
/// heartbeats, and save/unsave actions. `username` is unique
/// case-insensitively and stored lowercased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub background_image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub followers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub following: Vec<String>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saved_posts: Vec<String>,
    #[serde(default)]
    pub settings: UserSettings,
}

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Share,
    Mention,
}

/// Free-form payload attached to a notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Truncated comment preview, when the notification is about a comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A notification delivered to `user_id`.
///
/// Never created when the actor is the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub data: NotificationData,
    #[serde(default)]
    pub read: bool,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

/// The identity projection supplied by the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub uid: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Resolved author projection rendered next to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorCard {
    pub uid: String,
    pub display_name: String,
    pub profile_image: Option<String>,
}

impl AuthorCard {
    /// Placeholder card used when the author document is missing or its
    /// lookup failed; sibling posts still resolve.
    pub fn unknown(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: UNKNOWN_AUTHOR_NAME.to_string(),
            profile_image: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.display_name == UNKNOWN_AUTHOR_NAME
    }
}

impl From<&UserProfile> for AuthorCard {
    fn from(profile: &UserProfile) -> Self {
        Self {
            uid: profile.uid.clone(),
            display_name: profile.display_name.clone(),
            profile_image: if profile.profile_image.is_empty() {
                None
            } else {
                Some(profile.profile_image.clone())
            },
        }
    }
}

/// Resolved state of a share back-reference.
#[derive(Debug, Clone)]
pub enum SharedPostView {
    Available { post: Post, author: AuthorCard },
    /// The original was deleted; the reference dangles and renders as
    /// "original post unavailable".
    Unavailable { post_id: String },
}

/// A post joined with its resolved author and shared-post state.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub author: AuthorCard,
    pub shared: Option<SharedPostView>,
}

/// Result of a like toggle. `like_count` is a best-effort local estimate;
/// the store converges to the true count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: i64,
}

/// Independent, unranked result lists returned by `search`.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub users: Vec<UserProfile>,
    pub posts: Vec<Post>,
}

impl SearchHits {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.posts.is_empty()
    }
}
