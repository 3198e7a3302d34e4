use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::post_repository::{NewPost, PageRequest, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, Visibility};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    owner_id: Option<Uuid>,
    title: String,
    content: String,
    password_hash: Option<String>,
    has_password: bool,
    visibility: String,
    created_at: DateTime<Utc>,
    expiration_at: Option<DateTime<Utc>>,
    delete_after_view: bool,
}

#[derive(sqlx::FromRow)]
struct CountRow {
    count: i64,
}

const POST_COLUMNS: &str = "id, owner_id, title, content, password_hash, has_password, \
     visibility, created_at, expiration_at, delete_after_view";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO posts
                (owner_id, title, content, password_hash, has_password,
                 visibility, expiration_at, delete_after_view)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(input.owner_id)
            .bind(input.title)
            .bind(input.content)
            .bind(input.password_hash)
            .bind(input.has_password)
            .bind(input.visibility.as_str())
            .bind(input.expiration_at)
            .bind(input.delete_after_view)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn find_all_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn find_all_public(&self, page: PageRequest) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE visibility = 'public'
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            OFFSET $2
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, DomainError> {
        let row = sqlx::query_as::<_, CountRow>(
            "SELECT COUNT(*) AS count FROM posts WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.count)
    }

    async fn count_public(&self) -> Result<i64, DomainError> {
        let row = sqlx::query_as::<_, CountRow>(
            "SELECT COUNT(*) AS count FROM posts WHERE visibility = 'public'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.count)
    }

    async fn search_public(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE visibility = 'public'
              AND (title ILIKE $1 ESCAPE '\' OR content ILIKE $1 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(like_pattern(query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_search(&self, query: &str) -> Result<i64, DomainError> {
        let row = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS count
            FROM posts
            WHERE visibility = 'public'
              AND (title ILIKE $1 ESCAPE '\' OR content ILIKE $1 ESCAPE '\')
            "#,
        )
        .bind(like_pattern(query))
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.count)
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.content)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let visibility = row
        .visibility
        .parse::<Visibility>()
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;

    Post {
        id: row.id,
        owner_id: row.owner_id,
        title: row.title,
        content: row.content,
        password_hash: row.password_hash,
        has_password: row.has_password,
        visibility,
        created_at: row.created_at,
        expiration_at: row.expiration_at,
        delete_after_view: row.delete_after_view,
    }
    .ensure_consistent()
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => return DomainError::NotFound("owner".to_string()),
            Some("23514") if db_err.constraint() == Some("posts_delete_after_view_check") => {
                return DomainError::DeleteAfterViewConflict;
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
