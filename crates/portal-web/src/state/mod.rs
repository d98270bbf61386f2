//! Application state
//!
//! Holds the service context, the configuration and the compiled templates.

use std::sync::Arc;

use portal_common::AppConfig;
use portal_service::ServiceContext;

use crate::templates::Templates;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    templates: Arc<Templates>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, config: AppConfig, templates: Templates) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            templates: Arc::new(templates),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Name of the session cookie
    pub fn session_cookie_name(&self) -> &str {
        &self.config.session.cookie_name
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
