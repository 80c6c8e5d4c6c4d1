// src/app.rs

//! Application core and manager orchestration.
//!
//! Wires the storefront stores together: configuration first, then logging,
//! the event bus, the storage backend, and finally the three domain stores
//! (catalog, cart, account). Shutdown runs in reverse and flushes every
//! store's snapshot.

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::timeout;
use uuid::Uuid;

use crate::account::AccountManager;
use crate::cart::CartManager;
use crate::catalog::CatalogManager;
use crate::config::{AppConfig, ConfigManager, StorageBackend};
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::event::{Event, EventBusManager};
use crate::logging::LoggingManager;
use crate::manager::{HealthStatus, ManagedState, Manager, ManagerState};
use crate::storage::{FileStorage, MemoryStorage, SharedStorage};
use crate::types::Metadata;
use crate::VERSION;

/// Aggregated health across all managers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationHealth {
    pub status: HealthStatus,
    pub uptime: Duration,
    pub managers: HashMap<String, HealthStatus>,
    pub last_check: DateTime<Utc>,
}

/// A point-in-time summary of the running application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime: Duration,
    pub state: ManagerState,
    pub manager_count: usize,
}

/// Fired once the core finishes initializing
#[derive(Debug, Clone)]
pub struct ApplicationStartedEvent {
    pub version: String,
    pub started_at: DateTime<Utc>,
    metadata: Metadata,
}

impl Event for ApplicationStartedEvent {
    fn event_type(&self) -> &'static str {
        "application.started"
    }

    fn source(&self) -> &str {
        "app_core"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fired just before managers begin shutting down
#[derive(Debug, Clone)]
pub struct ApplicationShuttingDownEvent {
    pub reason: String,
    metadata: Metadata,
}

impl Event for ApplicationShuttingDownEvent {
    fn event_type(&self) -> &'static str {
        "application.shutting_down"
    }

    fn source(&self) -> &str {
        "app_core"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Main application core that owns and orchestrates all managers
#[derive(Debug)]
pub struct AppCore {
    state: ManagedState,
    started_at: DateTime<Utc>,

    config_manager: Option<ConfigManager>,
    logging_manager: Option<LoggingManager>,
    event_bus: Option<Arc<EventBusManager>>,
    storage: Option<SharedStorage>,
    catalog: Option<CatalogManager>,
    cart: Option<CartManager>,
    account: Option<AccountManager>,

    shutdown_signal: broadcast::Sender<()>,
}

impl AppCore {
    pub fn new() -> Self {
        let (shutdown_signal, _) = broadcast::channel(1);

        Self {
            state: ManagedState::new(Uuid::new_v4(), "app_core"),
            started_at: Utc::now(),
            config_manager: None,
            logging_manager: None,
            event_bus: None,
            storage: None,
            catalog: None,
            cart: None,
            account: None,
            shutdown_signal,
        }
    }

    /// Creates a core whose configuration loads from `config_path`
    pub fn with_config_file(config_path: impl AsRef<Path>) -> Self {
        let mut app = Self::new();
        app.config_manager = Some(ConfigManager::with_config_file(config_path));
        app
    }

    /// Initializes every manager in dependency order and restores the
    /// persisted snapshots
    pub async fn initialize(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Initializing).await;

        self.init_config_manager().await?;
        let config = self.config().await;

        self.init_logging_manager(&config).await?;
        tracing::info!(version = VERSION, "initializing application core");

        self.init_event_bus().await?;
        self.init_storage(&config);
        self.init_catalog(&config).await?;
        self.init_cart(&config).await?;
        self.init_account(&config).await?;

        self.setup_signal_handler();

        if let Some(bus) = &self.event_bus {
            let event = ApplicationStartedEvent {
                version: VERSION.to_string(),
                started_at: self.started_at,
                metadata: Metadata::new(),
            };
            if let Err(e) = bus.publish(event) {
                tracing::debug!(error = %e, "failed to publish startup event");
            }
        }

        self.state.set_state(ManagerState::Running).await;
        tracing::info!("application core initialized");
        Ok(())
    }

    async fn init_config_manager(&mut self) -> Result<()> {
        if self.config_manager.is_none() {
            self.config_manager = Some(ConfigManager::new());
        }

        if let Some(config_manager) = &mut self.config_manager {
            config_manager
                .initialize()
                .await
                .with_context(|| "Failed to initialize configuration manager".to_string())?;
        }

        Ok(())
    }

    async fn init_logging_manager(&mut self, config: &AppConfig) -> Result<()> {
        let mut logging_manager = LoggingManager::new(config.logging.clone());
        logging_manager
            .initialize()
            .await
            .with_context(|| "Failed to initialize logging manager".to_string())?;
        self.logging_manager = Some(logging_manager);
        Ok(())
    }

    async fn init_event_bus(&mut self) -> Result<()> {
        let mut event_bus = EventBusManager::new();
        event_bus
            .initialize()
            .await
            .with_context(|| "Failed to initialize event bus manager".to_string())?;
        self.event_bus = Some(Arc::new(event_bus));
        Ok(())
    }

    fn init_storage(&mut self, config: &AppConfig) {
        let storage: SharedStorage = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File => Arc::new(FileStorage::new(config.storage.data_dir.clone())),
        };
        tracing::debug!(backend = ?config.storage.backend, "storage backend ready");
        self.storage = Some(storage);
    }

    async fn init_catalog(&mut self, config: &AppConfig) -> Result<()> {
        let mut catalog = CatalogManager::new(config.catalog.clone());
        if let Some(storage) = &self.storage {
            catalog = catalog.with_storage(Arc::clone(storage));
        }
        if let Some(bus) = &self.event_bus {
            catalog = catalog.with_event_bus(Arc::clone(bus));
        }
        catalog
            .initialize()
            .await
            .with_context(|| "Failed to initialize catalog manager".to_string())?;
        self.catalog = Some(catalog);
        Ok(())
    }

    async fn init_cart(&mut self, config: &AppConfig) -> Result<()> {
        let mut cart = CartManager::new(config.session.clone());
        if let Some(storage) = &self.storage {
            cart = cart.with_storage(Arc::clone(storage));
        }
        if let Some(bus) = &self.event_bus {
            cart = cart.with_event_bus(Arc::clone(bus));
        }
        cart.initialize()
            .await
            .with_context(|| "Failed to initialize cart manager".to_string())?;
        self.cart = Some(cart);
        Ok(())
    }

    async fn init_account(&mut self, config: &AppConfig) -> Result<()> {
        let mut account = AccountManager::new(config.session.clone());
        if let Some(storage) = &self.storage {
            account = account.with_storage(Arc::clone(storage));
        }
        if let Some(bus) = &self.event_bus {
            account = account.with_event_bus(Arc::clone(bus));
        }
        account
            .initialize()
            .await
            .with_context(|| "Failed to initialize account manager".to_string())?;
        self.account = Some(account);
        Ok(())
    }

    fn setup_signal_handler(&self) {
        let shutdown_sender = self.shutdown_signal.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received Ctrl+C, initiating graceful shutdown");
                let _ = shutdown_sender.send(());
            }
        });
    }

    /// The active configuration, or defaults before initialization
    pub async fn config(&self) -> AppConfig {
        match &self.config_manager {
            Some(config_manager) => config_manager.get_config().await,
            None => AppConfig::default(),
        }
    }

    pub fn catalog(&self) -> Result<&CatalogManager> {
        self.catalog.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Application, "catalog manager is not initialized")
        })
    }

    pub fn cart(&self) -> Result<&CartManager> {
        self.cart
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::Application, "cart manager is not initialized"))
    }

    pub fn account(&self) -> Result<&AccountManager> {
        self.account.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Application, "account manager is not initialized")
        })
    }

    pub fn event_bus(&self) -> Result<Arc<EventBusManager>> {
        self.event_bus.clone().ok_or_else(|| {
            Error::new(ErrorKind::Application, "event bus is not initialized")
        })
    }

    /// Asks the core to shut down; `wait_for_shutdown` unblocks
    pub fn request_shutdown(&self) {
        let _ = self.shutdown_signal.send(());
    }

    /// Blocks until Ctrl+C or `request_shutdown`
    pub async fn wait_for_shutdown(&self) -> Result<()> {
        let mut receiver = self.shutdown_signal.subscribe();
        receiver.recv().await.map_err(|_| {
            Error::new(
                ErrorKind::Application,
                "Shutdown signal channel closed unexpectedly",
            )
        })?;
        Ok(())
    }

    /// Shuts managers down in reverse order, flushing snapshots
    pub async fn shutdown(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::ShuttingDown).await;
        tracing::info!("shutting down application core");

        if let Some(bus) = &self.event_bus {
            let event = ApplicationShuttingDownEvent {
                reason: "Normal shutdown".to_string(),
                metadata: Metadata::new(),
            };
            let _ = bus.publish(event);
        }

        if let Some(mut account) = self.account.take() {
            let _ = timeout(Duration::from_secs(5), account.shutdown()).await;
        }
        if let Some(mut cart) = self.cart.take() {
            let _ = timeout(Duration::from_secs(5), cart.shutdown()).await;
        }
        if let Some(mut catalog) = self.catalog.take() {
            let _ = timeout(Duration::from_secs(5), catalog.shutdown()).await;
        }

        if let Some(event_bus) = self.event_bus.take() {
            if let Ok(mut bus) = Arc::try_unwrap(event_bus) {
                let _ = timeout(Duration::from_secs(5), bus.shutdown()).await;
            }
        }

        self.storage = None;

        if let Some(mut logging_manager) = self.logging_manager.take() {
            let _ = timeout(Duration::from_secs(5), logging_manager.shutdown()).await;
        }
        if let Some(mut config_manager) = self.config_manager.take() {
            let _ = timeout(Duration::from_secs(2), config_manager.shutdown()).await;
        }

        self.state.set_state(ManagerState::Shutdown).await;
        tracing::info!("application core shutdown complete");
        Ok(())
    }

    /// Health across every live manager
    pub async fn get_health(&self) -> ApplicationHealth {
        let mut managers = HashMap::new();
        let mut overall = HealthStatus::Healthy;

        let mut live: Vec<&dyn Manager> = Vec::new();
        if let Some(m) = &self.config_manager {
            live.push(m);
        }
        if let Some(m) = &self.logging_manager {
            live.push(m);
        }
        if let Some(m) = &self.event_bus {
            live.push(m.as_ref());
        }
        if let Some(m) = &self.catalog {
            live.push(m);
        }
        if let Some(m) = &self.cart {
            live.push(m);
        }
        if let Some(m) = &self.account {
            live.push(m);
        }

        for manager in live {
            let health = manager.health_check().await;
            if health != HealthStatus::Healthy {
                overall = HealthStatus::Degraded;
            }
            managers.insert(manager.name().to_string(), health);
        }

        ApplicationHealth {
            status: overall,
            uptime: (Utc::now() - self.started_at)
                .to_std()
                .unwrap_or(Duration::ZERO),
            managers,
            last_check: Utc::now(),
        }
    }

    pub async fn stats(&self) -> ApplicationStats {
        let manager_count = [
            self.config_manager.is_some(),
            self.logging_manager.is_some(),
            self.event_bus.is_some(),
            self.catalog.is_some(),
            self.cart.is_some(),
            self.account.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        ApplicationStats {
            version: VERSION.to_string(),
            started_at: self.started_at,
            uptime: (Utc::now() - self.started_at)
                .to_std()
                .unwrap_or(Duration::ZERO),
            state: self.state.state().await,
            manager_count,
        }
    }
}

impl Default for AppCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn running_core() -> AppCore {
        let mut core = AppCore::new();
        core.initialize().await.unwrap();
        core
    }

    #[tokio::test]
    async fn test_initialize_brings_every_store_up() {
        let core = running_core().await;

        assert_eq!(core.catalog().unwrap().products().len(), 28);
        assert!(core.cart().unwrap().is_empty());
        assert!(!core.account().unwrap().is_authenticated());
        assert_eq!(core.state.state().await, ManagerState::Running);
    }

    #[tokio::test]
    async fn test_health_covers_all_managers() {
        let core = running_core().await;
        let health = core.get_health().await;

        assert_eq!(health.status, HealthStatus::Healthy);
        for name in [
            "config_manager",
            "logging_manager",
            "event_bus_manager",
            "catalog_manager",
            "cart_manager",
            "account_manager",
        ] {
            assert!(health.managers.contains_key(name), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_stores_share_one_event_bus() {
        use futures::StreamExt;

        let core = running_core().await;
        let mut receiver = core
            .event_bus()
            .unwrap()
            .subscribe(crate::event::EventFilter::new().with_source_pattern("catalog"));

        core.catalog().unwrap().toggle_favorite("1").await;

        let event = receiver.next().await.unwrap();
        assert_eq!(event.event_type(), "catalog.favorite_toggled");
    }

    #[tokio::test]
    async fn test_shutdown_is_ordered_and_final() {
        let mut core = running_core().await;
        core.shutdown().await.unwrap();

        assert!(core.catalog().is_err());
        assert!(core.cart().is_err());
        assert!(core.account().is_err());
        assert_eq!(core.state.state().await, ManagerState::Shutdown);
    }

    #[tokio::test]
    async fn test_request_shutdown_unblocks_the_waiter() {
        let core = running_core().await;
        let (_, waited) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                core.request_shutdown();
            },
            core.wait_for_shutdown(),
        );
        waited.unwrap();
    }

    #[tokio::test]
    async fn test_accessors_error_before_initialization() {
        let core = AppCore::new();
        assert!(core.catalog().is_err());
        assert!(core.cart().is_err());
        assert!(core.account().is_err());
        assert!(core.event_bus().is_err());
    }
}
