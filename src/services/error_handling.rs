use thiserror::Error;
use uuid::Uuid;

/// Service-level failures surfaced to callers. Mutations are never retried
/// here; the caller decides whether to re-prompt the user.
#[derive(Error, Debug)]
pub enum TwodooError {
    #[error("Task not found: {id}")]
    TaskNotFound { id: Uuid },

    #[error("Validation failed for {field}: {reason}")]
    ValidationError { field: String, reason: String },
}

impl TwodooError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
