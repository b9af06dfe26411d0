//! Authentication error types.

use lessons_core::error::LessonsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingBearer,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for LessonsError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingBearer | AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                LessonsError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => LessonsError::Internal(msg),
        }
    }
}
