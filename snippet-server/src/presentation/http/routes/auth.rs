use axum::{
    Router,
    routing::{post, put},
};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{
    forgot_password, refresh_token, reset_password, signin, signup,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/refresh-token", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{code}", put(reset_password))
}
