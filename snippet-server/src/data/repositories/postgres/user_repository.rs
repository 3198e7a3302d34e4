use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::user_repository::{
    NewUser, NewVerificationCode, UserCredentials, UserRepository,
};
use crate::domain::auth::VerificationData;
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct VerificationRow {
    id: Uuid,
    user_id: Uuid,
    email: String,
    code: String,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(input.name)
        .bind(input.email)
        .bind(input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        map_row_to_user(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
            id,
            name,
            email,
            password_hash,
            created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        if let Some(r) = row {
            let user = User::new(r.id, r.name, r.email, r.created_at)
                .map_err(|err| DomainError::Unexpected(err.to_string()))?;

            Ok(Some(UserCredentials {
                user,
                password_hash: r.password_hash,
            }))
        } else {
            Ok(None)
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(map_user_db_error)?;

        Ok(exists)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn store_verification_code(
        &self,
        input: NewVerificationCode,
    ) -> Result<VerificationData, DomainError> {
        let row = sqlx::query_as::<_, VerificationRow>(
            r#"
            INSERT INTO password_resets (user_id, email, code, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, email, code, expires_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.email)
        .bind(input.code)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(map_row_to_verification(row))
    }

    // Expiry is left to the caller; this only answers whether the code exists.
    async fn find_verification_by_code(
        &self,
        code: &str,
    ) -> Result<Option<VerificationData>, DomainError> {
        let row = sqlx::query_as::<_, VerificationRow>(
            r#"
            SELECT id, user_id, email, code, expires_at
            FROM password_resets
            WHERE code = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(map_row_to_verification))
    }

    async fn delete_verification_code(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM password_resets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(())
    }

    async fn delete_verification_codes(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let result =
            sqlx::query("DELETE FROM password_resets WHERE user_id = $1 OR expires_at < NOW()")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(map_user_db_error)?;

        Ok(result.rows_affected())
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    User::new(row.id, row.name, row.email, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_row_to_verification(row: VerificationRow) -> VerificationData {
    VerificationData {
        id: row.id,
        user_id: row.user_id,
        email: row.email,
        code: row.code,
        expires_at: row.expires_at,
    }
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
