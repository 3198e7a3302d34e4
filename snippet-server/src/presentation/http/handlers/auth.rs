use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::auth::TokenPair;
use crate::domain::user::{LoginRequest, RegisterRequest, ResetPasswordRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::client::RequestClient;
use crate::presentation::http::response::{ApiResponse, Empty};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SignupDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) name: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SigninDto {
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RefreshTokenDto {
    #[validate(length(min = 1))]
    pub(crate) refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ForgotPasswordDto {
    #[validate(email)]
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ResetPasswordDto {
    pub(crate) password: String,
    pub(crate) password_confirmation: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TokenPairDto {
    pub(crate) access_token: String,
    pub(crate) access_token_expires_at: DateTime<Utc>,
    pub(crate) refresh_token: String,
    pub(crate) refresh_token_expires_at: DateTime<Utc>,
}

impl From<TokenPair> for TokenPairDto {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            access_token_expires_at: tokens.access_token_expires_at,
            refresh_token: tokens.refresh_token,
            refresh_token_expires_at: tokens.refresh_token_expires_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SigninResponseDto {
    pub(crate) user: UserDto,
    #[serde(flatten)]
    pub(crate) tokens: TokenPairDto,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "auth",
    request_body = SignupDto,
    responses(
        (status = 201, description = "Account created; the user is returned in `data`", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    Json(dto): Json<SignupDto>,
) -> AppResult<ApiResponse<UserDto>> {
    dto.validate()?;

    let req = RegisterRequest {
        name: dto.name,
        email: dto.email,
        password: dto.password,
    };

    let user = state.auth_service.register(req).await?;
    Ok(ApiResponse::new(StatusCode::CREATED, "User created successfully").with_data(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    tag = "auth",
    request_body = SigninDto,
    responses(
        (status = 200, description = "Signed in; user and tokens in `data`", body = SigninResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn signin(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    Json(dto): Json<SigninDto>,
) -> AppResult<ApiResponse<SigninResponseDto>> {
    dto.validate()?;

    let req = LoginRequest {
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.login(req, client).await?;
    Ok(
        ApiResponse::new(StatusCode::OK, "Signed in successfully").with_data(SigninResponseDto {
            user: result.user.into(),
            tokens: result.tokens.into(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh-token",
    tag = "auth",
    request_body = RefreshTokenDto,
    responses(
        (status = 200, description = "Tokens rotated; the new pair is in `data`", body = TokenPairDto),
        (status = 401, description = "Refresh token invalid, expired, revoked or blocked"),
        (status = 404, description = "No session for this token"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn refresh_token(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    Json(dto): Json<RefreshTokenDto>,
) -> AppResult<ApiResponse<TokenPairDto>> {
    dto.validate()?;

    let tokens = state
        .auth_service
        .refresh_token(dto.refresh_token.trim(), client)
        .await?;
    Ok(ApiResponse::new(StatusCode::OK, "Token refreshed successfully").with_data(tokens.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordDto,
    responses(
        (status = 200, description = "Reset code sent if the account exists"),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn forgot_password(
    State(state): State<AppState>,
    Json(dto): Json<ForgotPasswordDto>,
) -> AppResult<ApiResponse<Empty>> {
    dto.validate()?;

    state.auth_service.forgot_password(&dto.email).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        "If the account exists, a reset code has been sent",
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/reset-password/{code}",
    tag = "auth",
    params(
        ("code" = String, Path, description = "Reset code received by email")
    ),
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Passwords do not match or are too short"),
        (status = 401, description = "Reset code invalid or expired"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn reset_password(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(dto): Json<ResetPasswordDto>,
) -> AppResult<ApiResponse<Empty>> {
    let req = ResetPasswordRequest {
        code,
        password: dto.password,
        password_confirmation: dto.password_confirmation,
    };

    state.auth_service.reset_password(req).await?;
    Ok(ApiResponse::new(StatusCode::OK, "Password reset successfully"))
}
