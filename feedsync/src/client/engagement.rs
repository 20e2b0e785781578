//! Likes, comments, and notification consumption.

use chrono::Utc;
use serde_json::json;

use crate::errors::{FeedError, ValidationError, ValidationIssue, ValidationResult};
use crate::id::generate_comment_id;
use crate::model::{Comment, LikeOutcome, Notification, NotificationData, NotificationKind, collections};
use crate::store::{FieldOp, Query, Store};

use super::truncate_preview;

impl<S: Store> super::FeedClient<S> {
    /// Toggle `user_id`'s like on a post.
    ///
    /// Membership changes go through the store's atomic set primitives, so
    /// two clients toggling concurrently cannot lose each other's update:
    /// a duplicate add and a remove of an absent member are both no-ops.
    /// The returned count is a local estimate; the store converges to the
    /// true value.
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<LikeOutcome, FeedError> {
        let post = self.get_post(post_id).await?;
        let had_liked = post.has_liked(user_id);
        let op = if had_liked {
            FieldOp::array_remove("likes", vec![json!(user_id)])
        } else {
            FieldOp::array_union("likes", vec![json!(user_id)])
        };
        self.call(self.store.update(collections::POSTS, post_id, vec![op])).await?;

        if !had_liked {
            self.notify(
                &post.author_id,
                user_id,
                NotificationKind::Like,
                "liked your post",
                NotificationData {
                    post_id: Some(post_id.to_string()),
                    actor_id: Some(user_id.to_string()),
                    comment: None,
                },
            )
            .await;
        }

        let like_count = if had_liked {
            (post.like_count() - 1).max(0)
        } else {
            post.like_count() + 1
        };
        Ok(LikeOutcome {
            liked: !had_liked,
            like_count,
        })
    }

    /// Append a comment to a post and return it immediately for optimistic
    /// rendering; no re-read of the post happens. The comment id is
    /// client-generated and the append itself is an atomic array union.
    pub async fn add_comment(&self, post_id: &str, author_id: &str, content: &str) -> Result<Comment, FeedError> {
        let content = self.validate_comment_content(content)?;
        let post = self.get_post(post_id).await?;

        let now = Utc::now();
        let comment = Comment {
            id: generate_comment_id(now.timestamp_millis()),
            author_id: author_id.to_string(),
            content,
            created_at: now,
            likes: Vec::new(),
        };
        let value = serde_json::to_value(&comment).map_err(|err| FeedError::StoreUnavailable {
            message: format!("failed to serialize comment: {err}"),
        })?;
        self.call(
            self.store
                .update(collections::POSTS, post_id, vec![FieldOp::array_union("comments", vec![value])]),
        )
        .await?;

        let preview = truncate_preview(&comment.content, self.config.comment_preview_len);
        self.notify(
            &post.author_id,
            author_id,
            NotificationKind::Comment,
            "commented on your post",
            NotificationData {
                post_id: Some(post_id.to_string()),
                actor_id: Some(author_id.to_string()),
                comment: Some(preview),
            },
        )
        .await;

        Ok(comment)
    }

    /// Most recent unread notifications for a user, newest first. Reads a
    /// window of `limit` recent entries and drops the read ones.
    pub async fn unread_notifications(&self, user_id: &str, limit: u64) -> Result<Vec<Notification>, FeedError> {
        let query = Query::recent(collections::NOTIFICATIONS, limit).filtered("user_id", user_id);
        let docs = self.call(self.store.query(query)).await?;
        let mut notifications = Vec::with_capacity(docs.len());
        for doc in docs {
            let notification: Notification = doc.deserialize()?;
            if !notification.read {
                notifications.push(notification);
            }
        }
        Ok(notifications)
    }

    /// Mark notifications as read, returning how many were updated.
    /// Already-deleted ids are skipped, not errors.
    pub async fn mark_notifications_read(&self, ids: &[String]) -> Result<u64, FeedError> {
        let mut updated = 0;
        for id in ids {
            let result = self
                .call(
                    self.store
                        .update(collections::NOTIFICATIONS, id, vec![FieldOp::set("read", json!(true))]),
                )
                .await;
            match result {
                Ok(()) => updated += 1,
                Err(FeedError::NotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(updated)
    }

    fn validate_comment_content(&self, content: &str) -> ValidationResult<String> {
        let trimmed = content.trim();
        let mut issues = Vec::new();
        if trimmed.is_empty() {
            issues.push(ValidationIssue::new(
                "content",
                "validation.required",
                "comment must not be empty",
            ));
        }
        if trimmed.chars().count() > self.config.max_comment_len {
            issues.push(ValidationIssue::new(
                "content",
                "validation.length",
                format!("comment must be at most {} characters", self.config.max_comment_len),
            ));
        }
        if issues.is_empty() {
            Ok(trimmed.to_string())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}
