use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::{AuthService, AuthTtls};
use application::post_service::PostService;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::session_repository::PostgresSessionRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::mail::LogEmailSender;
use infrastructure::password::{Argon2PasswordHasher, PasswordHasher};
use infrastructure::settings::Settings;
use infrastructure::token::{SealedTokenMaker, TokenMaker};
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let token_maker: Arc<dyn TokenMaker> = Arc::new(
        SealedTokenMaker::new(&settings.token_symmetric_key)
            .context("TOKEN_SYMMETRIC_KEY is not usable")?,
    );
    let hasher: Arc<dyn PasswordHasher> = Arc::new(
        Argon2PasswordHasher::new().context("failed to configure password hasher")?,
    );

    let auth_service = Arc::new(AuthService::new(
        PostgresUserRepository::new(pool.clone()),
        PostgresSessionRepository::new(pool.clone()),
        hasher.clone(),
        token_maker.clone(),
        Arc::new(LogEmailSender::new(settings.mail_from.clone())),
        AuthTtls {
            access_token: Duration::seconds(settings.access_token_ttl_seconds),
            refresh_token: Duration::seconds(settings.refresh_token_ttl_seconds),
            reset_code: Duration::seconds(settings.reset_code_ttl_seconds),
        },
    ));
    let post_service = Arc::new(PostService::new(
        PostgresPostRepository::new(pool.clone()),
        hasher,
    ));

    let state = AppState::new(pool, auth_service, post_service, token_maker);
    server::run_http(&settings, state).await
}
