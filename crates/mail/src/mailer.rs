//! The [`Mailer`] trait and its non-SMTP implementations.

use std::sync::Mutex;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A plain-text message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Subject line of confirmation-code emails.
pub const CONFIRMATION_SUBJECT: &str = "YaMDb confirmation code";

/// Build the email that carries a signup confirmation code.
pub fn confirmation_message(to: &str, username: &str, code: &str) -> OutgoingMessage {
    OutgoingMessage {
        to: to.to_string(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        body: format!(
            "Hello, {username}!\n\nYour confirmation code: {code}\n\n\
             Exchange it for an access token at /api/v1/auth/token/."
        ),
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Delivers outgoing email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MailError>;
}

/// Writes every message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email not sent (SMTP not configured)"
        );
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// The most recent message addressed to `to`.
    pub fn last_to(&self, to: &str) -> Option<OutgoingMessage> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MailError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| MailError::Build("mailbox lock poisoned".into()))?;
        sent.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_message_contains_code() {
        let msg = confirmation_message("a@b.c", "alice", "XYZ123");
        assert_eq!(msg.to, "a@b.c");
        assert_eq!(msg.subject, CONFIRMATION_SUBJECT);
        assert!(msg.body.contains("XYZ123"));
        assert!(msg.body.contains("alice"));
    }

    #[tokio::test]
    async fn memory_mailer_records_messages() {
        let mailer = MemoryMailer::new();
        mailer.send(confirmation_message("x@y.z", "x", "one")).await.unwrap();
        mailer.send(confirmation_message("x@y.z", "x", "two")).await.unwrap();
        mailer.send(confirmation_message("q@y.z", "q", "three")).await.unwrap();

        assert_eq!(mailer.sent().len(), 3);
        let last = mailer.last_to("x@y.z").unwrap();
        assert!(last.body.contains("two"));
        assert!(mailer.last_to("nobody@y.z").is_none());
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        assert!(LogMailer.send(confirmation_message("a@b.c", "a", "c")).await.is_ok());
    }

    #[test]
    fn mail_error_display_build() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
