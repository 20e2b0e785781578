use thiserror::Error;

/// Top-level error type returned by every public `FeedClient` operation.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Validation failed for one or more fields.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// The requester is not allowed to perform this mutation.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Target entity no longer exists.
    #[error("entity not found")]
    NotFound { entity_id: Option<String> },

    /// The backing store could not be reached or the call timed out.
    /// Retryable by the caller; the core never retries on its own.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },
}

impl FeedError {
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn not_found(entity_id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_id: Some(entity_id.into()),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// True when retrying the whole user action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

// Remote-transport failures never escape the taxonomy (they all surface as
// `StoreUnavailable`), so the conversion lives here rather than in the
// redis adapter.
impl From<redis::RedisError> for FeedError {
    fn from(err: redis::RedisError) -> Self {
        Self::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

/// Collection of validation issues encountered while preparing a mutation.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used by the validation helpers.
pub type ValidationResult<T> = Result<T, ValidationError>;
