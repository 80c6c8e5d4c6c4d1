// src/logging.rs

//! Tracing-based logging setup.
//!
//! Builds the global subscriber from [`LoggingConfig`]: a console layer in the
//! configured format, plus an optional daily-rolling file layer. The worker
//! guards for non-blocking writers live on the manager so the appender flushes
//! on shutdown.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt,
    layer::{Identity, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};
use uuid::Uuid;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::Result;
use crate::manager::{ManagedState, Manager, ManagerState, ManagerStatus};

/// Owns the global tracing subscriber and its writer guards
#[derive(Debug)]
pub struct LoggingManager {
    state: ManagedState,
    config: LoggingConfig,
    _guards: Vec<WorkerGuard>, // Keep guards alive
}

impl LoggingManager {
    pub fn new(config: LoggingConfig) -> Self {
        Self {
            state: ManagedState::new(Uuid::new_v4(), "logging_manager"),
            config,
            _guards: Vec::new(),
        }
    }

    /// Installs the global subscriber based on configuration.
    ///
    /// A second call is a no-op so tests and embedders can initialize freely.
    fn setup_tracing(&mut self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.level));

        let registry = Registry::default().with(filter);

        let console_layer = match self.config.format {
            LogFormat::Json => fmt::layer().json().boxed(),
            LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
            LogFormat::Compact => fmt::layer().compact().boxed(),
        };
        let registry = registry.with(console_layer);

        let registry = if let Some(file_config) = &self.config.file {
            let file_appender =
                tracing_appender::rolling::daily(&file_config.directory, &file_config.prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            self._guards.push(guard);

            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            registry.with(file_layer)
        } else {
            registry.with(Identity::new().boxed())
        };

        if registry.try_init().is_err() {
            tracing::debug!("global subscriber already installed, keeping existing one");
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Manager for LoggingManager {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> Uuid {
        self.state.id()
    }

    async fn initialize(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Initializing).await;
        self.setup_tracing()?;
        self.state.set_state(ManagerState::Running).await;
        tracing::debug!(level = %self.config.level, "logging initialized");
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::ShuttingDown).await;
        // Dropping the guards flushes any buffered file output
        self._guards.clear();
        self.state.set_state(ManagerState::Shutdown).await;
        Ok(())
    }

    async fn status(&self) -> ManagerStatus {
        let mut status = self.state.status().await;
        status.add_metadata("level", serde_json::json!(self.config.level));
        status.add_metadata("format", serde_json::json!(format!("{:?}", self.config.format)));
        status.add_metadata(
            "file_logging",
            serde_json::json!(self.config.file.is_some()),
        );
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle() {
        let mut manager = LoggingManager::new(LoggingConfig::default());
        manager.initialize().await.unwrap();
        assert_eq!(manager.state.state().await, ManagerState::Running);

        manager.shutdown().await.unwrap();
        assert_eq!(manager.state.state().await, ManagerState::Shutdown);
    }

    #[tokio::test]
    async fn test_double_initialize_is_tolerated() {
        let mut first = LoggingManager::new(LoggingConfig::default());
        first.initialize().await.unwrap();

        let mut second = LoggingManager::new(LoggingConfig {
            format: LogFormat::Compact,
            ..LoggingConfig::default()
        });
        second.initialize().await.unwrap();
        assert_eq!(second.state.state().await, ManagerState::Running);
    }

    #[tokio::test]
    async fn test_file_layer_creates_guard() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = LoggingManager::new(LoggingConfig {
            file: Some(crate::config::FileLogConfig {
                directory: dir.path().to_path_buf(),
                prefix: "test".to_string(),
            }),
            ..LoggingConfig::default()
        });
        manager.initialize().await.unwrap();
        assert_eq!(manager._guards.len(), 1);
        manager.shutdown().await.unwrap();
    }
}
