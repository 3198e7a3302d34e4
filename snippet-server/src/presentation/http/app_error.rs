use crate::domain::error::DomainError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) error: &'static str,
    pub(crate) message: String,
}

const INTERNAL_MESSAGE: &str = "internal error";

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Domain(err) => domain_parts(err),
            AppError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "validation_error", err.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "unauthorized".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }
}

fn domain_parts(err: &DomainError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, "already_exists"),
        DomainError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
        DomainError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        DomainError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired"),
        DomainError::TokenInvalid => (StatusCode::UNAUTHORIZED, "token_invalid"),
        DomainError::TokenRevoked => (StatusCode::UNAUTHORIZED, "token_revoked"),
        DomainError::AccountRequired => (StatusCode::UNAUTHORIZED, "account_required"),
        DomainError::DeleteAfterViewConflict => {
            (StatusCode::BAD_REQUEST, "delete_after_view_conflict")
        }
        DomainError::PasswordTooShort { .. } => (StatusCode::BAD_REQUEST, "password_too_short"),
        DomainError::ResetCodeInvalid => (StatusCode::UNAUTHORIZED, "reset_code_invalid"),
        DomainError::Unexpected(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                INTERNAL_MESSAGE.to_string(),
            );
        }
    };
    (status, code, err.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            error!(error = %self, source = ?self, "request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: code,
                message,
            }),
        )
            .into_response()
    }
}
