use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{EmailMessage, MailError, Mailer};

/// Collects sent messages in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first
    #[must_use]
    pub fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.lock().clone()
    }

    pub fn clear(&self) {
        self.outbox.lock().clear();
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.outbox.lock().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_collects_messages() {
        let mailer = MemoryMailer::new();
        let message = EmailMessage::new("Hi", "a@example.com", "b@example.com", "Body");

        mailer.send(&message).await.unwrap();
        mailer.clone().send(&message).await.unwrap();

        assert_eq!(mailer.outbox().len(), 2);
        mailer.clear();
        assert!(mailer.outbox().is_empty());
    }
}
