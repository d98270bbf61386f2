use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use portal_core::{AuthEvent, DomainError};

/// Subscriber to login/logout events
#[async_trait]
pub trait AuthEventHandler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &AuthEvent) -> Result<(), DomainError>;
}

/// Ordered list of subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Vec<Arc<dyn AuthEventHandler>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Arc<dyn AuthEventHandler>) {
        self.handlers.push(handler);
    }

    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn AuthEventHandler>) -> Self {
        self.subscribe(handler);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler in subscription order, stopping at the first failure
    pub async fn publish(&self, event: &AuthEvent) -> Result<(), DomainError> {
        for handler in &self.handlers {
            debug!(
                handler = handler.name(),
                event_type = event.event_type(),
                user_id = %event.actor.id,
                "Dispatching auth event"
            );
            handler.handle(event).await?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
