use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, html: &str, subject: &str) -> Result<(), DomainError>;
}

/// Development transport: writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub(crate) struct LogEmailSender {
    from: String,
}

impl LogEmailSender {
    pub(crate) fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, to: &str, html: &str, subject: &str) -> Result<(), DomainError> {
        info!(from = %self.from, to, subject, bytes = html.len(), "outgoing email");
        debug!(body = html, "outgoing email body");
        Ok(())
    }
}

pub(crate) struct RenderedEmail {
    pub(crate) subject: String,
    pub(crate) html: String,
}

pub(crate) fn render_reset_password_email(
    name: &str,
    code: &str,
    valid_minutes: i64,
) -> RenderedEmail {
    let name = escape_html(name);
    let code = escape_html(code);
    let html = format!(
        "<!DOCTYPE html>\
         <html><body>\
         <p>Hi {name},</p>\
         <p>Use the code below to reset your password. It expires in {valid_minutes} minutes.</p>\
         <p style=\"font-size:20px;font-weight:bold;letter-spacing:2px\">{code}</p>\
         <p>If you did not ask for a reset, you can ignore this email.</p>\
         </body></html>"
    );

    RenderedEmail {
        subject: "Reset your password".to_string(),
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
