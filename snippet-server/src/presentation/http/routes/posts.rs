use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_public_posts, list_user_posts, search_posts,
    update_post,
};
use crate::presentation::http::middleware::auth::{
    optional_auth_middleware, require_auth_middleware,
};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/all", get(list_public_posts))
        .route("/search", get(search_posts));

    let optional = Router::new()
        .route("/create", post(create_post))
        .route("/{id}", get(get_post))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/user/all", get(list_user_posts))
        .route("/{id}", patch(update_post).delete(delete_post))
        .layer(middleware::from_fn_with_state(
            state,
            require_auth_middleware,
        ));

    public.merge(optional).merge(protected)
}
