use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, Visibility};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) owner_id: Option<Uuid>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) password_hash: Option<String>,
    pub(crate) has_password: bool,
    pub(crate) visibility: Visibility,
    pub(crate) expiration_at: Option<DateTime<Utc>>,
    pub(crate) delete_after_view: bool,
}

/// `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PageRequest {
    pub(crate) limit: i64,
    pub(crate) offset: i64,
}

/// Listing and search queries return posts newest first, ties broken by id descending.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn insert_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn find_all_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError>;
    async fn find_all_public(&self, page: PageRequest) -> Result<Vec<Post>, DomainError>;
    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, DomainError>;
    async fn count_public(&self) -> Result<i64, DomainError>;
    async fn search_public(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_search(&self, query: &str) -> Result<i64, DomainError>;
    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError>;
}
