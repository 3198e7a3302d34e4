use crate::domain::error::DomainError;
use crate::infrastructure::password::PasswordHasher;

/// Reversible stand-in for Argon2 so engine tests stay fast.
pub(crate) struct PlainPasswordHasher;

impl PasswordHasher for PlainPasswordHasher {
    fn hash(&self, raw_password: &str) -> Result<String, DomainError> {
        Ok(format!("plain:{raw_password}"))
    }

    fn verify(&self, raw_password: &str, password_hash: &str) -> Result<(), DomainError> {
        match password_hash.strip_prefix("plain:") {
            Some(stored) if stored == raw_password => Ok(()),
            _ => Err(DomainError::InvalidCredentials),
        }
    }
}
