use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier,
        SaltString, rand_core::OsRng,
    },
};

use crate::domain::error::DomainError;

/// One-way password hashing shared by account and post passwords.
pub(crate) trait PasswordHasher: Send + Sync {
    fn hash(&self, raw_password: &str) -> Result<String, DomainError>;

    /// `DomainError::InvalidCredentials` on mismatch; a malformed hash is `Unexpected`.
    fn verify(&self, raw_password: &str, password_hash: &str) -> Result<(), DomainError>;
}

#[derive(Debug, Clone)]
pub(crate) struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    const MEMORY_KIB: u32 = 19 * 1024;
    const ITERATIONS: u32 = 2;
    const PARALLELISM: u32 = 1;

    pub(crate) fn new() -> Result<Self, DomainError> {
        let params = Params::new(Self::MEMORY_KIB, Self::ITERATIONS, Self::PARALLELISM, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2()
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    fn verify(&self, raw_password: &str, password_hash: &str) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        self.argon2()
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })
    }
}
