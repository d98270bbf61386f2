use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, MailError, Mailer};

/// Writes messages to the log instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = ?message.to,
            subject = %message.subject,
            body = %message.body_text,
            "Email (console backend)"
        );
        Ok(())
    }
}
