use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

pub(crate) const MIN_POST_PASSWORD_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Visibility {
    Private,
    Public,
    Unlisted,
}

impl Visibility {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "private" => Ok(Visibility::Private),
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            _ => Err(DomainError::Validation {
                field: "visibility",
                message: "must be one of private, public, unlisted",
            }),
        }
    }
}

/// A stored snippet. `password_hash` stays inside the server; DTOs never copy it.
#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: Uuid,
    pub(crate) owner_id: Option<Uuid>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) password_hash: Option<String>,
    pub(crate) has_password: bool,
    pub(crate) visibility: Visibility,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) expiration_at: Option<DateTime<Utc>>,
    pub(crate) delete_after_view: bool,
}

impl Post {
    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiration_at, Some(expiration_at) if now > expiration_at)
    }

    pub(crate) fn is_owned_by(&self, caller: Option<Uuid>) -> bool {
        match (self.owner_id, caller) {
            (Some(owner_id), Some(caller_id)) => owner_id == caller_id,
            _ => false,
        }
    }

    /// Rejects rows that break the password invariant.
    pub(crate) fn ensure_consistent(self) -> Result<Self, DomainError> {
        let hash_missing = self
            .password_hash
            .as_deref()
            .map(str::is_empty)
            .unwrap_or(true);
        if self.has_password && hash_missing {
            return Err(DomainError::Unexpected(format!(
                "post {} is password protected but has no hash",
                self.id
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) password: Option<String>,
    pub(crate) has_password: bool,
    pub(crate) visibility: Visibility,
    pub(crate) expiration_at: Option<DateTime<Utc>>,
    pub(crate) delete_after_view: bool,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            ..self
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
}

impl UpdatePostRequest {
    /// Blank fields are dropped so they leave the stored column untouched.
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = match non_blank(self.title) {
            Some(title) => Some(normalize_title(&title)?),
            None => None,
        };
        let content = non_blank(self.content);

        Ok(Self { title, content })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
