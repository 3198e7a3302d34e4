use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::auth::VerificationData;
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewVerificationCode {
    pub(crate) user_id: Uuid,
    pub(crate) email: String,
    pub(crate) code: String,
    pub(crate) expires_at: DateTime<Utc>,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, DomainError>;
    async fn store_verification_code(
        &self,
        input: NewVerificationCode,
    ) -> Result<VerificationData, DomainError>;
    async fn find_verification_by_code(
        &self,
        code: &str,
    ) -> Result<Option<VerificationData>, DomainError>;
    async fn delete_verification_code(&self, id: Uuid) -> Result<(), DomainError>;
    /// Drops every code issued to `user_id` along with expired codes of any user.
    async fn delete_verification_codes(&self, user_id: Uuid) -> Result<u64, DomainError>;
}
