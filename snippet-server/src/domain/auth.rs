use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access tokens authenticate API calls; refresh tokens are only good for rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenKind {
    Access,
    Refresh,
}

/// Claims sealed inside access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TokenPayload {
    pub(crate) id: Uuid,
    pub(crate) kind: TokenKind,
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
    pub(crate) issued_at: DateTime<Utc>,
    pub(crate) expired_at: DateTime<Utc>,
}

impl TokenPayload {
    pub(crate) fn new(
        kind: TokenKind,
        user_id: Uuid,
        username: &str,
        duration: chrono::Duration,
    ) -> Self {
        let issued_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            user_id,
            username: username.to_string(),
            issued_at,
            expired_at: issued_at + duration,
        }
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expired_at
    }
}

/// Where a login or refresh came from, kept on the session for auditing.
#[derive(Debug, Clone, Default)]
pub(crate) struct ClientInfo {
    pub(crate) user_agent: String,
    pub(crate) client_ip: String,
}

/// Server-side record of one issued refresh token.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
    pub(crate) refresh_token: String,
    pub(crate) user_agent: String,
    pub(crate) client_ip: String,
    pub(crate) is_blocked: bool,
    pub(crate) is_revoked: bool,
    pub(crate) expires_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn issue(payload: &TokenPayload, refresh_token: &str, client: &ClientInfo) -> Self {
        Self {
            id: payload.id,
            user_id: payload.user_id,
            username: payload.username.clone(),
            refresh_token: refresh_token.to_string(),
            user_agent: client.user_agent.clone(),
            client_ip: client.client_ip.clone(),
            is_blocked: false,
            is_revoked: false,
            expires_at: payload.expired_at,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VerificationData {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) email: String,
    pub(crate) code: String,
    pub(crate) expires_at: DateTime<Utc>,
}

impl VerificationData {
    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TokenPair {
    pub(crate) access_token: String,
    pub(crate) access_token_expires_at: DateTime<Utc>,
    pub(crate) refresh_token: String,
    pub(crate) refresh_token_expires_at: DateTime<Utc>,
}
