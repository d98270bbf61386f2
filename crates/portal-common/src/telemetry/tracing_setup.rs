//! `tracing` subscriber installation
//!
//! `RUST_LOG` wins over the configured level when it is set.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Log output settings
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    /// One JSON object per line instead of human-readable output
    pub json: bool,
    /// Log span open/close, useful to time handlers in development
    pub span_events: bool,
    /// Source file and line of each event
    pub source_location: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            source_location: true,
        }
    }
}

impl TracingConfig {
    /// Preset for `APP_ENV`: debug and span timings in development, JSON in production
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: Level::DEBUG,
                span_events: true,
                ..Self::default()
            },
            Environment::Staging => Self::default(),
            Environment::Production => Self {
                json: true,
                source_location: false,
                ..Self::default()
            },
        }
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Install the global subscriber
    ///
    /// Fails when one is already installed (a second call, or tests).
    pub fn try_init(&self) -> Result<(), TracingError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        // Only one of the two format layers is ever Some
        let json = self.json.then(|| {
            fmt::layer()
                .json()
                .with_file(self.source_location)
                .with_line_number(self.source_location)
                .with_span_events(self.fmt_span())
        });
        let text = (!self.json).then(|| {
            fmt::layer()
                .with_file(self.source_location)
                .with_line_number(self.source_location)
                .with_span_events(self.fmt_span())
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(json)
            .with(text)
            .try_init()
            .map_err(|_| TracingError::AlreadyInitialized)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_presets() {
        let production = TracingConfig::for_environment(Environment::Production);
        assert!(production.json);
        assert!(!production.source_location);
        assert_eq!(production.level, Level::INFO);

        let development = TracingConfig::for_environment(Environment::Development);
        assert_eq!(development.level, Level::DEBUG);
        assert!(development.span_events);
        assert!(!development.json);
    }

    #[test]
    fn test_second_install_fails() {
        let config = TracingConfig::default();
        // The first call may lose a race with another test; the second never succeeds.
        let _ = config.try_init();
        assert!(matches!(
            config.try_init(),
            Err(TracingError::AlreadyInitialized)
        ));
    }
}
