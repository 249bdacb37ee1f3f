//! Outbound email for YaMDb.
//!
//! - [`Mailer`] -- the delivery seam the API server depends on.
//! - [`SmtpMailer`] -- SMTP delivery via `lettre`.
//! - [`LogMailer`] -- writes messages to the log; used when SMTP is not configured.
//! - [`MemoryMailer`] -- keeps messages in memory for tests and local tooling.

pub mod mailer;
pub mod smtp;

pub use mailer::{
    confirmation_message, LogMailer, MailError, Mailer, MemoryMailer, OutgoingMessage,
};
pub use smtp::{SmtpConfig, SmtpMailer};
