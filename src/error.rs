//! Error types for the counter queue service
//!
//! Engine operations return the typed [`QueueError`] so callers can tell a
//! rejected input apart from a missing reference. Startup and runtime
//! plumbing uses anyhow.

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors reported by the counter queue engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Malformed or disallowed input. No state was changed.
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    /// Well-formed reference to something that does not exist. No state was changed.
    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

impl QueueError {
    pub fn validation(reason: impl Into<String>) -> Self {
        QueueError::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        QueueError::NotFound {
            resource: resource.into(),
        }
    }

    /// Stable machine-readable code for API clients and metric labels
    pub fn code(&self) -> &'static str {
        match self {
            QueueError::Validation { .. } => "VALIDATION_ERROR",
            QueueError::NotFound { .. } => "NOT_FOUND",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueueError::Validation { .. } => "validation",
            QueueError::NotFound { .. } => "not_found",
        }
    }
}
