use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::auth::TokenKind;
use crate::domain::error::DomainError;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

/// Set from the verified bearer token; never trusted when sent by a client.
pub(crate) const USER_ID_HEADER: &str = "x-user-id";
pub(crate) const POST_PASSWORD_HEADER: &str = "x-post-password";

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller identity on routes where signing in is optional.
#[derive(Debug, Clone)]
pub(crate) struct MaybeUser(pub(crate) Option<AuthenticatedUser>);

impl MaybeUser {
    pub(crate) fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

pub(crate) async fn require_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    request.headers_mut().remove(USER_ID_HEADER);

    let token = bearer_token(request.headers())?
        .map(str::to_owned)
        .ok_or(AppError::Unauthorized)?;
    let user = authenticate(&state, &token)?;
    attach_user(&mut request, user)?;

    Ok(next.run(request).await)
}

/// Like [`require_auth_middleware`], but a request without `Authorization`
/// continues anonymously. A header that is present must still be valid.
pub(crate) async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    request.headers_mut().remove(USER_ID_HEADER);

    let token = bearer_token(request.headers())?.map(str::to_owned);
    if let Some(token) = token {
        let user = authenticate(&state, &token)?;
        attach_user(&mut request, user)?;
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_header = value.to_str().map_err(|_| AppError::Unauthorized)?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthorized)?;
    let token = parts.next().ok_or(AppError::Unauthorized)?;
    if parts.next().is_some() {
        return Err(AppError::Unauthorized);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }

    Ok(Some(token))
}

fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedUser, AppError> {
    let payload = state
        .token_maker
        .verify_token(token)
        .map_err(DomainError::from)?;
    if payload.kind != TokenKind::Access {
        return Err(DomainError::TokenInvalid.into());
    }

    Ok(AuthenticatedUser {
        user_id: payload.user_id,
        username: payload.username,
    })
}

fn attach_user(request: &mut Request, user: AuthenticatedUser) -> Result<(), AppError> {
    let value = HeaderValue::from_str(&user.user_id.to_string())
        .map_err(|err| AppError::Internal(err.into()))?;
    request.headers_mut().insert(USER_ID_HEADER, value);
    request.extensions_mut().insert(user);
    Ok(())
}
