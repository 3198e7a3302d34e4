use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::session_repository::SessionRepository;
use crate::domain::auth::Session;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    username: String,
    refresh_token: String,
    user_agent: String,
    client_ip: String,
    is_blocked: bool,
    is_revoked: bool,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            refresh_token: row.refresh_token,
            user_agent: row.user_agent,
            client_ip: row.client_ip,
            is_blocked: row.is_blocked,
            is_revoked: row.is_revoked,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create_session(&self, session: Session) -> Result<Session, DomainError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions
                (id, user_id, username, refresh_token, user_agent, client_ip,
                 is_blocked, is_revoked, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, username, refresh_token, user_agent, client_ip,
                      is_blocked, is_revoked, expires_at
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.username)
        .bind(session.refresh_token)
        .bind(session.user_agent)
        .bind(session.client_ip)
        .bind(session.is_blocked)
        .bind(session.is_revoked)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_session_db_error)?;

        Ok(row.into())
    }

    async fn find_session_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, username, refresh_token, user_agent, client_ip,
                   is_blocked, is_revoked, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_session_db_error)?;

        Ok(row.map(Session::from))
    }

    async fn revoke_session_by_token(&self, refresh_token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET is_revoked = TRUE
            WHERE refresh_token = $1 AND is_revoked = FALSE
            "#,
        )
        .bind(refresh_token)
        .execute(&self.pool)
        .await
        .map_err(map_session_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_session_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("user".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
