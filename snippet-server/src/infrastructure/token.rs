use base64ct::{Base64UrlUnpadded, Encoding};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};
use chrono::{Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::auth::{TokenKind, TokenPayload};
use crate::domain::error::DomainError;

/// XChaCha20-Poly1305 key size in bytes.
pub(crate) const SYMMETRIC_KEY_SIZE: usize = 32;

const TOKEN_HEADER: &str = "v2.local.";
const NONCE_SIZE: usize = 24;

#[derive(Debug, Error)]
pub(crate) enum TokenError {
    #[error("invalid key size: must be exactly {expected} characters, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("token encode failed")]
    Encode(#[source] serde_json::Error),

    #[error("token encryption failed")]
    Seal,

    #[error("token is invalid")]
    Invalid,

    #[error("token has expired")]
    Expired,
}

impl From<TokenError> for DomainError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => DomainError::TokenExpired,
            TokenError::Invalid => DomainError::TokenInvalid,
            other => DomainError::Unexpected(other.to_string()),
        }
    }
}

pub(crate) trait TokenMaker: Send + Sync {
    fn create_token(
        &self,
        kind: TokenKind,
        user_id: Uuid,
        username: &str,
        duration: Duration,
    ) -> Result<(String, TokenPayload), TokenError>;

    fn verify_token(&self, token: &str) -> Result<TokenPayload, TokenError>;
}

/// Issues opaque bearer tokens: the JSON payload is sealed with XChaCha20-Poly1305
/// and the header is bound in as associated data.
pub(crate) struct SealedTokenMaker {
    cipher: XChaCha20Poly1305,
}

impl SealedTokenMaker {
    pub(crate) fn new(symmetric_key: &str) -> Result<Self, TokenError> {
        let key = symmetric_key.as_bytes();
        let invalid_size = || TokenError::InvalidKeySize {
            expected: SYMMETRIC_KEY_SIZE,
            actual: key.len(),
        };
        if key.len() != SYMMETRIC_KEY_SIZE {
            return Err(invalid_size());
        }

        let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| invalid_size())?;
        Ok(Self { cipher })
    }

    fn seal(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        let plaintext = serde_json::to_vec(payload).map_err(TokenError::Encode)?;
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: &plaintext,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Seal)?;

        let mut raw = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);

        Ok(format!("{TOKEN_HEADER}{}", Base64UrlUnpadded::encode_string(&raw)))
    }

    #[allow(deprecated)]
    fn open(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let body = token
            .strip_prefix(TOKEN_HEADER)
            .ok_or(TokenError::Invalid)?;
        let raw = Base64UrlUnpadded::decode_vec(body).map_err(|_| TokenError::Invalid)?;
        if raw.len() <= NONCE_SIZE {
            return Err(TokenError::Invalid);
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Invalid)?;

        serde_json::from_slice(&plaintext).map_err(|_| TokenError::Invalid)
    }
}

impl TokenMaker for SealedTokenMaker {
    fn create_token(
        &self,
        kind: TokenKind,
        user_id: Uuid,
        username: &str,
        duration: Duration,
    ) -> Result<(String, TokenPayload), TokenError> {
        let payload = TokenPayload::new(kind, user_id, username, duration);
        let token = self.seal(&payload)?;
        Ok((token, payload))
    }

    fn verify_token(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let payload = self.open(token)?;
        if payload.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }
        Ok(payload)
    }
}
