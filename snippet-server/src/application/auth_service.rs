use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{Rng, distributions::Alphanumeric};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::data::session_repository::SessionRepository;
use crate::data::user_repository::{NewUser, NewVerificationCode, UserRepository};
use crate::domain::auth::{ClientInfo, Session, TokenKind, TokenPair, TokenPayload};
use crate::domain::error::DomainError;
use crate::domain::user::{
    LoginRequest, RegisterRequest, ResetPasswordRequest, User, normalize_email,
};
use crate::infrastructure::mail::{EmailSender, render_reset_password_email};
use crate::infrastructure::password::PasswordHasher;
use crate::infrastructure::token::TokenMaker;

const RESET_CODE_LEN: usize = 8;

#[derive(Debug, Clone, Copy)]
pub(crate) struct AuthTtls {
    pub(crate) access_token: Duration,
    pub(crate) refresh_token: Duration,
    pub(crate) reset_code: Duration,
}

#[derive(Debug, Clone)]
pub(crate) struct LoginResult {
    pub(crate) user: User,
    pub(crate) tokens: TokenPair,
}

pub(crate) struct AuthService<U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenMaker>,
    mailer: Arc<dyn EmailSender>,
    ttls: AuthTtls,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(
        users: U,
        sessions: S,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenMaker>,
        mailer: Arc<dyn EmailSender>,
        ttls: AuthTtls,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            tokens,
            mailer,
            ttls,
        }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        if self.users.exists_by_email(&req.email).await? {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let password_hash = self.hasher.hash(&req.password)?;
        let user = self
            .users
            .create_user(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub(crate) async fn login(
        &self,
        req: LoginRequest,
        client: ClientInfo,
    ) -> Result<LoginResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.users.find_by_email(&req.email).await? {
            Some(user_creds) => user_creds,
            None => {
                // keep the response time close to the "wrong password" path
                match self.hasher.verify(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.hasher.verify(&req.password, &user_creds.password_hash)?;

        let tokens = self.start_session(&user_creds.user, &client).await?;
        info!(user_id = %user_creds.user.id, "user signed in");

        Ok(LoginResult {
            user: user_creds.user,
            tokens,
        })
    }

    /// Rotates a refresh token: the presented token's session is revoked and a
    /// new session backs the returned pair. Presenting a token twice fails with
    /// `TokenRevoked`.
    pub(crate) async fn refresh_token(
        &self,
        refresh_token: &str,
        client: ClientInfo,
    ) -> Result<TokenPair, DomainError> {
        let payload = self.tokens.verify_token(refresh_token)?;
        if payload.kind != TokenKind::Refresh {
            return Err(DomainError::TokenInvalid);
        }

        let session = self
            .sessions
            .find_session_by_id(payload.id)
            .await?
            .ok_or(DomainError::NotFound(format!("session id: {}", payload.id)))?;

        if session.is_revoked {
            warn!(
                session_id = %session.id,
                user_id = %session.user_id,
                "revoked refresh token presented"
            );
            return Err(DomainError::TokenRevoked);
        }
        if session.is_blocked {
            return Err(DomainError::Unauthorized);
        }
        if session.username != payload.username
            || session.refresh_token != refresh_token
            || session.user_id != payload.user_id
        {
            return Err(DomainError::Unauthorized);
        }
        if self.users.find_by_id(payload.user_id).await?.is_none() {
            return Err(DomainError::Unauthorized);
        }

        let (tokens, refresh_payload) = self.issue_tokens(payload.user_id, &payload.username)?;

        if !self.sessions.revoke_session_by_token(refresh_token).await? {
            return Err(DomainError::TokenRevoked);
        }

        self.sessions
            .create_session(Session::issue(
                &refresh_payload,
                &tokens.refresh_token,
                &client,
            ))
            .await?;

        debug!(
            old_session = %session.id,
            new_session = %refresh_payload.id,
            "refresh token rotated"
        );
        Ok(tokens)
    }

    pub(crate) async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let email = normalize_email(email)?;

        let Some(user_creds) = self.users.find_by_email(&email).await? else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };
        let user = user_creds.user;

        self.users.delete_verification_codes(user.id).await?;
        let verification = self
            .users
            .store_verification_code(NewVerificationCode {
                user_id: user.id,
                email: user.email.clone(),
                code: generate_reset_code(),
                expires_at: Utc::now() + self.ttls.reset_code,
            })
            .await?;

        let message = render_reset_password_email(
            &user.name,
            &verification.code,
            self.ttls.reset_code.num_minutes(),
        );
        self.mailer
            .send(&user.email, &message.html, &message.subject)
            .await?;

        info!(user_id = %user.id, "password reset code issued");
        Ok(())
    }

    pub(crate) async fn reset_password(
        &self,
        req: ResetPasswordRequest,
    ) -> Result<(), DomainError> {
        let req = req.validate()?;

        let verification = self
            .users
            .find_verification_by_code(&req.code)
            .await?
            .ok_or(DomainError::ResetCodeInvalid)?;
        if verification.is_expired_at(Utc::now()) {
            return Err(DomainError::ResetCodeInvalid);
        }

        let password_hash = self.hasher.hash(req.new_password()?)?;
        let updated = self
            .users
            .update_password(verification.user_id, &password_hash)
            .await?;
        if !updated {
            return Err(DomainError::NotFound(format!(
                "user id: {}",
                verification.user_id
            )));
        }

        self.users.delete_verification_code(verification.id).await?;

        info!(user_id = %verification.user_id, email = %verification.email, "password reset");
        Ok(())
    }

    async fn start_session(
        &self,
        user: &User,
        client: &ClientInfo,
    ) -> Result<TokenPair, DomainError> {
        let (tokens, refresh_payload) = self.issue_tokens(user.id, &user.name)?;
        self.sessions
            .create_session(Session::issue(
                &refresh_payload,
                &tokens.refresh_token,
                client,
            ))
            .await?;
        Ok(tokens)
    }

    fn issue_tokens(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<(TokenPair, TokenPayload), DomainError> {
        let (access_token, access_payload) = self.tokens.create_token(
            TokenKind::Access,
            user_id,
            username,
            self.ttls.access_token,
        )?;
        let (refresh_token, refresh_payload) = self.tokens.create_token(
            TokenKind::Refresh,
            user_id,
            username,
            self.ttls.refresh_token,
        )?;

        let tokens = TokenPair {
            access_token,
            access_token_expires_at: access_payload.expired_at,
            refresh_token,
            refresh_token_expires_at: refresh_payload.expired_at,
        };
        Ok((tokens, refresh_payload))
    }
}

fn generate_reset_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_CODE_LEN)
        .map(char::from)
        .collect()
}
