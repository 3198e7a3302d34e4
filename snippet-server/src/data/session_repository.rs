use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::auth::Session;
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: Session) -> Result<Session, DomainError>;
    async fn find_session_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError>;
    /// Marks the session holding `refresh_token` as revoked.
    /// Returns `false` when no live (unrevoked) session matched.
    async fn revoke_session_by_token(&self, refresh_token: &str) -> Result<bool, DomainError>;
}
