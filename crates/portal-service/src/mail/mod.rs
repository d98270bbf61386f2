//! Outgoing mail
//!
//! [`Mailer`] is the seam between services and delivery. The SMTP backend
//! talks to a relay through lettre; the console backend only logs, and the
//! memory backend keeps an outbox that tests can inspect.

mod console;
mod invitation;
mod memory;
mod message;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;

use portal_common::{MailBackend, MailConfig};

pub use console::ConsoleMailer;
pub use invitation::{invitation_email, invitation_link, INVITATION_SUBJECT};
pub use memory::MemoryMailer;
pub use message::{EmailMessage, MailError};
pub use smtp::SmtpMailer;

/// Delivers a fully built message
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Mailer selected by `EMAIL_BACKEND`
pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    Ok(match config.backend {
        MailBackend::Smtp => Arc::new(SmtpMailer::from_config(config)?),
        MailBackend::Console => Arc::new(ConsoleMailer),
    })
}
