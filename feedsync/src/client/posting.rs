//! Post creation, sharing, and deletion.

use serde_json::json;

use crate::config::Strictness;
use crate::errors::{FeedError, ValidationError, ValidationIssue, ValidationResult};
use crate::model::{Post, UNKNOWN_AUTHOR_NAME, collections};
use crate::store::{FieldOp, Store};
use crate::validators::is_valid_url;

impl<S: Store> super::FeedClient<S> {
    /// Publish a new post. Empty or whitespace-only content is rejected
    /// before any store call; the returned post carries the store-assigned
    /// id and timestamp, so no follow-up read is needed.
    pub async fn create_post(&self, author_id: &str, content: &str, images: Vec<String>) -> Result<Post, FeedError> {
        let content = self.validate_post_content(content, &images)?;
        let mut payload = json!({
            "author_id": author_id,
            "content": content,
            "shares": 0,
        });
        if !images.is_empty() {
            payload["images"] = json!(images);
        }
        let doc = self.call(self.store.insert(collections::POSTS, payload)).await?;
        doc.deserialize()
    }

    /// Re-publish `original` under `actor_id`. The new post is independent
    /// of the original: deleting either side never touches the other, and
    /// the original's share counter is bumped with the store's atomic
    /// increment so concurrent shares all count.
    pub async fn share_post(&self, actor_id: &str, original: &Post) -> Result<Post, FeedError> {
        let author_name = match self.get_profile(&original.author_id).await {
            Ok(Some(profile)) => profile.display_name,
            Ok(None) => UNKNOWN_AUTHOR_NAME.to_string(),
            Err(err) => {
                log::warn!("author lookup failed while sharing {}: {err}", original.id);
                UNKNOWN_AUTHOR_NAME.to_string()
            }
        };
        let payload = json!({
            "author_id": actor_id,
            "content": format!("Shared a post from {author_name}"),
            "shares": 0,
            "shared_post_id": original.id,
        });
        let doc = self.call(self.store.insert(collections::POSTS, payload)).await?;
        let share: Post = doc.deserialize()?;

        // The share already persisted, so a failed counter bump is logged
        // rather than surfaced: surfacing it would invite a retry and a
        // duplicate share. The counter stays eventually consistent.
        if let Err(err) = self
            .call(
                self.store
                    .update(collections::POSTS, &original.id, vec![FieldOp::increment("shares", 1)]),
            )
            .await
        {
            log::warn!("share counter bump failed for {}: {err}", original.id);
        }
        Ok(share)
    }

    /// Hard-delete a post. Only the author may delete; notifications and
    /// share posts that reference it are left dangling on purpose.
    pub async fn delete_post(&self, requester_id: &str, post_id: &str) -> Result<(), FeedError> {
        let post = self.get_post(post_id).await?;
        if post.author_id != requester_id {
            return Err(FeedError::permission_denied("only the author can delete a post"));
        }
        self.call(self.store.delete(collections::POSTS, post_id)).await
    }

    fn validate_post_content(&self, content: &str, images: &[String]) -> ValidationResult<String> {
        let trimmed = content.trim();
        let mut issues = Vec::new();
        if trimmed.is_empty() {
            issues.push(ValidationIssue::new(
                "content",
                "validation.required",
                "post content must not be empty",
            ));
        }
        if self.config.strictness == Strictness::Strict {
            if trimmed.chars().count() > self.config.max_post_len {
                issues.push(ValidationIssue::new(
                    "content",
                    "validation.length",
                    format!("post content must be at most {} characters", self.config.max_post_len),
                ));
            }
            for image in images {
                if !is_valid_url(image) {
                    issues.push(ValidationIssue::new(
                        "images",
                        "validation.url",
                        format!("`{image}` is not a valid media URL"),
                    ));
                }
            }
        }
        if issues.is_empty() {
            Ok(trimmed.to_string())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}
