//! Error types for the lessons service.

use thiserror::Error;
use uuid::Uuid;

/// Failures reported by the course-membership collaborator.
///
/// Callers need to tell an unauthorized caller apart from a missing
/// course, so both get their own variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MembershipError {
    #[error("caller is not authorized to read the course roster")]
    Unauthorized,

    #[error("course {0} not found")]
    CourseNotFound(Uuid),

    #[error("course service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum LessonsError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("{reason}")]
    Forbidden {
        reason: String,
        cause: Option<String>,
    },

    #[error("{message}: {cause}")]
    BadRequest { message: String, cause: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Course membership error: {0}")]
    Membership(#[from] MembershipError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LessonsError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: &str) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            cause: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Re-wrap an error with a stable operation message.
    ///
    /// NotFound, Forbidden and Validation already carry caller-facing
    /// meaning and pass through unchanged; everything else becomes a
    /// BadRequest that keeps the underlying cause for diagnostics.
    pub fn into_bad_request(self, message: &str) -> Self {
        match self {
            err @ (Self::NotFound { .. }
            | Self::Forbidden { .. }
            | Self::Validation { .. }
            | Self::BadRequest { .. }) => err,
            other => Self::BadRequest {
                message: message.into(),
                cause: other.to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

pub type LessonsResult<T> = Result<T, LessonsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_rewrapped() {
        let err = LessonsError::Database("connection reset".into())
            .into_bad_request("Failed to patch the lesson.");
        match err {
            LessonsError::BadRequest { message, cause } => {
                assert_eq!(message, "Failed to patch the lesson.");
                assert!(cause.contains("connection reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn access_errors_pass_through() {
        let err = LessonsError::forbidden("You have no access.").into_bad_request("x");
        assert!(err.is_forbidden());

        let err = LessonsError::not_found("lesson", Uuid::nil()).into_bad_request("x");
        assert!(err.is_not_found());
    }
}
