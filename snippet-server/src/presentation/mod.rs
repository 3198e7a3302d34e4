use sqlx::PgPool;
use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::post_service::PostService;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::session_repository::PostgresSessionRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::token::TokenMaker;

pub(crate) mod http;

pub(crate) type AppAuthService = AuthService<PostgresUserRepository, PostgresSessionRepository>;
pub(crate) type AppPostService = PostService<PostgresPostRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) auth_service: Arc<AppAuthService>,
    pub(crate) post_service: Arc<AppPostService>,
    pub(crate) token_maker: Arc<dyn TokenMaker>,
}

impl AppState {
    pub(crate) fn new(
        pool: PgPool,
        auth_service: Arc<AppAuthService>,
        post_service: Arc<AppPostService>,
        token_maker: Arc<dyn TokenMaker>,
    ) -> Self {
        Self {
            pool,
            auth_service,
            post_service,
            token_maker,
        }
    }
}
