use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::healthz;

pub(crate) mod auth;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/v1/auth", auth::router())
        .nest("/api/v1/post", posts::router(state))
}
