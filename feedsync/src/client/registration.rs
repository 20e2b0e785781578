//! Profile lifecycle: registration, login bootstrap, presence, saved posts.
//!
//! Credential handling stays with the hosted auth backend; this module
//! only validates registration input and maintains the profile document
//! keyed by the session uid.

use serde_json::json;

use crate::config::{AuthProvider, Strictness};
use crate::errors::{FeedError, ValidationError, ValidationIssue, ValidationResult};
use crate::model::{SessionUser, UserProfile, UserSettings, collections};
use crate::store::{FieldOp, Query, Store, server_timestamp};
use crate::validators::{is_valid_email, is_valid_username};

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 30;
const PASSWORD_MIN_LEN: usize = 6;
/// Window scanned when checking username availability.
const USERNAME_LOOKUP_LIMIT: u64 = 100;

/// Registration form input. The password fields are validated here but
/// never stored; the hosted auth backend owns credentials.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
    pub provider: AuthProvider,
}

impl<S: Store> super::FeedClient<S> {
    /// Validate registration input, check username availability, and
    /// create the profile document for `user`.
    pub async fn register_profile(&self, user: &SessionUser, input: &RegistrationInput) -> Result<UserProfile, FeedError> {
        if !self.config.provider_enabled(input.provider) {
            return Err(FeedError::permission_denied(format!(
                "sign-in provider {:?} is not enabled",
                input.provider
            )));
        }
        self.validate_registration(input)?;

        let username = input.username.to_lowercase();
        self.ensure_username_available(&username).await?;

        let payload = json!({
            "email": input.email,
            "display_name": input.full_name,
            "username": username,
            "full_name": input.full_name,
            "bio": "",
            "profile_image": user.photo_url.clone().unwrap_or_default(),
            "background_image": "",
            "created_at": server_timestamp(),
            "last_seen": server_timestamp(),
            "is_online": true,
            "is_private": false,
            "settings": UserSettings::default(),
        });
        let doc = self.call(self.store.set(collections::USERS, &user.uid, payload)).await?;
        doc.deserialize()
    }

    /// Get-or-create bootstrap used on login and OAuth sign-in: an
    /// existing profile is returned untouched, a missing one is derived
    /// from the session identity.
    pub async fn ensure_profile(&self, user: &SessionUser) -> Result<UserProfile, FeedError> {
        if let Some(profile) = self.get_profile(&user.uid).await? {
            return Ok(profile);
        }

        let display_name = user
            .display_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "User".to_string());
        let username = derive_username(&display_name, &user.uid);
        let payload = json!({
            "email": "",
            "display_name": display_name,
            "username": username,
            "full_name": display_name,
            "bio": "",
            "profile_image": user.photo_url.clone().unwrap_or_default(),
            "background_image": "",
            "created_at": server_timestamp(),
            "last_seen": server_timestamp(),
            "is_online": true,
            "is_private": false,
            "settings": UserSettings::default(),
        });
        let doc = self.call(self.store.set(collections::USERS, &user.uid, payload)).await?;
        doc.deserialize()
    }

    /// Presence heartbeat: flips `is_online` and server-stamps `last_seen`.
    pub async fn set_online(&self, uid: &str, is_online: bool) -> Result<(), FeedError> {
        self.call(self.store.update(
            collections::USERS,
            uid,
            vec![
                FieldOp::set("is_online", json!(is_online)),
                FieldOp::server_timestamp("last_seen"),
            ],
        ))
        .await
    }

    pub async fn save_post(&self, uid: &str, post_id: &str) -> Result<(), FeedError> {
        self.call(self.store.update(
            collections::USERS,
            uid,
            vec![FieldOp::array_union("saved_posts", vec![json!(post_id)])],
        ))
        .await
    }

    pub async fn unsave_post(&self, uid: &str, post_id: &str) -> Result<(), FeedError> {
        self.call(self.store.update(
            collections::USERS,
            uid,
            vec![FieldOp::array_remove("saved_posts", vec![json!(post_id)])],
        ))
        .await
    }

    async fn ensure_username_available(&self, username: &str) -> Result<(), FeedError> {
        let query = Query::prefix(collections::USERS, "username", username, USERNAME_LOOKUP_LIMIT);
        let candidates = self.call(self.store.query(query)).await?;
        let taken = candidates.iter().any(|doc| {
            doc.data.get("username").and_then(serde_json::Value::as_str) == Some(username)
        });
        if taken {
            return Err(ValidationError::single("username", "validation.unique", "username is already taken").into());
        }
        Ok(())
    }

    /// Collects every failing field at once, matching how the source form
    /// surfaced per-field messages.
    fn validate_registration(&self, input: &RegistrationInput) -> ValidationResult<()> {
        let mut issues = Vec::new();
        let username_len = input.username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
            issues.push(ValidationIssue::new(
                "username",
                "validation.length",
                format!("username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"),
            ));
        }
        if input.full_name.trim().is_empty() {
            issues.push(ValidationIssue::new(
                "full_name",
                "validation.required",
                "full name is required",
            ));
        }
        if input.email.trim().is_empty() {
            issues.push(ValidationIssue::new("email", "validation.required", "email is required"));
        }
        if input.password.chars().count() < PASSWORD_MIN_LEN {
            issues.push(ValidationIssue::new(
                "password",
                "validation.length",
                format!("password must contain at least {PASSWORD_MIN_LEN} characters"),
            ));
        }
        if input.password != input.confirm_password {
            issues.push(ValidationIssue::new(
                "confirm_password",
                "validation.mismatch",
                "passwords do not match",
            ));
        }
        if !input.accepted_terms {
            issues.push(ValidationIssue::new(
                "terms",
                "validation.required",
                "the terms must be accepted",
            ));
        }

        if self.config.strictness == Strictness::Strict {
            if !input.email.trim().is_empty() && !is_valid_email(&input.email) {
                issues.push(ValidationIssue::new(
                    "email",
                    "validation.email",
                    "email address is not valid",
                ));
            }
            let lowered = input.username.to_lowercase();
            if username_len >= USERNAME_MIN_LEN && !is_valid_username(&lowered) {
                issues.push(ValidationIssue::new(
                    "username",
                    "validation.charset",
                    "username may only contain letters, digits, `_` and `.`",
                ));
            }
        }

        if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
    }
}

/// Derive a username from the display name, falling back to the uid when
/// too little survives the charset filter.
fn derive_username(display_name: &str, uid: &str) -> String {
    let derived: String = display_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if derived.chars().count() >= USERNAME_MIN_LEN {
        derived
    } else {
        format!("user{}", uid.to_lowercase())
    }
}
