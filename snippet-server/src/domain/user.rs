use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct RegisterRequest {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = normalize_name(&self.name)?;
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(Self {
            name,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResetPasswordRequest {
    pub(crate) code: String,
    pub(crate) password: String,
    pub(crate) password_confirmation: String,
}

impl ResetPasswordRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(DomainError::Validation {
                field: "code",
                message: "must not be empty",
            });
        }
        Ok(Self {
            code: code.to_string(),
            ..self
        })
    }

    /// Checked only once the reset code itself has been accepted.
    pub(crate) fn new_password(&self) -> Result<&str, DomainError> {
        if self.password != self.password_confirmation {
            return Err(DomainError::Validation {
                field: "password_confirmation",
                message: "must match password",
            });
        }
        validate_password(&self.password)?;
        Ok(&self.password)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: Uuid,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id.is_nil() {
            return Err(DomainError::Validation {
                field: "id",
                message: "must not be nil",
            });
        }
        let name = normalize_name(&name.into())?;
        let email = normalize_email(&email.into())?;

        Ok(Self {
            id,
            name,
            email,
            created_at,
        })
    }
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    let len = name.chars().count();
    if !(3..=64).contains(&len) {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be 3..64 chars",
        });
    }
    Ok(name.to_string())
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    let password_len = password.chars().count();
    if !(8..=128).contains(&password_len) {
        return Err(DomainError::Validation {
            field: "password",
            message: "must be 8..128 chars",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        DomainError, RegisterRequest, ResetPasswordRequest, User, normalize_email, normalize_name,
    };
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn user_new_rejects_nil_id() {
        let result = User::new(Uuid::nil(), "John", "john@example.com", Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  JoHn@Example.COM ").expect("must be valid");
        assert_eq!(value, "john@example.com");
    }

    #[test]
    fn name_rules_are_applied() {
        assert!(normalize_name("ab").is_err());
        assert!(normalize_name("John").is_ok());
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = RegisterRequest {
            name: "John".to_string(),
            email: "john@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            name: " John ".to_string(),
            email: "John@Example.com".to_string(),
            password: "password".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.name, "John");
        assert_eq!(validated.email, "john@example.com");
    }

    #[test]
    fn reset_request_requires_matching_confirmation() {
        let req = ResetPasswordRequest {
            code: "AbCd1234".to_string(),
            password: "new-password".to_string(),
            password_confirmation: "other-password".to_string(),
        };

        let req = req.validate().expect("code is present");
        let err = req.new_password().expect_err("must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "password_confirmation",
                ..
            }
        ));
    }

    #[test]
    fn reset_request_trims_code_and_accepts_matching_passwords() {
        let req = ResetPasswordRequest {
            code: " AbCd1234 ".to_string(),
            password: "new-password".to_string(),
            password_confirmation: "new-password".to_string(),
        };

        let req = req.validate().expect("must be valid");
        assert_eq!(req.code, "AbCd1234");
        assert_eq!(req.new_password().expect("passwords match"), "new-password");
    }
}
