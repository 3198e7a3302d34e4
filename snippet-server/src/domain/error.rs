use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("forbidden")]
    Forbidden,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("token expired")]
    TokenExpired,

    #[error("token invalid")]
    TokenInvalid,

    #[error("token revoked")]
    TokenRevoked,

    #[error("cannot create a private post without an account")]
    AccountRequired,

    #[error("delete_after_view and expiration_at cannot be set together")]
    DeleteAfterViewConflict,

    #[error("post password must have at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("reset code is invalid or expired")]
    ResetCodeInvalid,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
