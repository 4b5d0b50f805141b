//! Auth error types.

use thiserror::Error;

use versa_core::error::CoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user is inactive")]
    UserInactive,

    #[error("context not found or access denied")]
    ContextDenied,

    #[error("invalid token")]
    TokenInvalid,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserInactive | AuthError::ContextDenied => CoreError::AccessDenied {
                reason: err.to_string(),
            },
            AuthError::TokenInvalid => CoreError::InvalidToken,
            AuthError::Crypto(msg) => CoreError::Internal(msg),
        }
    }
}
