//! Domain errors for the issue-shepherd bot.

use thiserror::Error;

/// Domain-level errors that can occur while evaluating instructions or syncing.
///
/// Gate rejections are not errors; they are reported through
/// [`crate::domain::models::Verdict`].
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Issue not found: #{0}")]
    IssueNotFound(u64),

    #[error("GitHub {operation} returned {status}: {body}")]
    RemoteStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("GitHub {operation} request failed: {reason}")]
    Transport { operation: String, reason: String },

    #[error("Failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    #[error("Busy: {0} is already running")]
    Busy(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    /// HTTP status of a failed remote call, if the error carries one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_message_carries_status_and_body() {
        let err = DomainError::RemoteStatus {
            operation: "edit issue #7".to_string(),
            status: 422,
            body: "Validation Failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GitHub edit issue #7 returned 422: Validation Failed"
        );
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_non_remote_errors_have_no_status() {
        assert_eq!(DomainError::Busy("sync".into()).status(), None);
    }
}
