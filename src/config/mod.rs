// src/config/mod.rs

//! Application configuration.
//!
//! Configuration is a set of typed sections with serde defaults, optionally
//! overridden by a JSON/YAML/TOML file chosen by extension. The demo runs
//! fine with no file at all.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, ManagerOperation, Result};
use crate::manager::{ManagedState, Manager, ManagerState, ManagerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            catalog: CatalogConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validates the configuration, returning the first violation found
    pub fn validate(&self) -> Result<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

        if self.app.name.trim().is_empty() {
            return Err(Error::config_key("app.name", "application name is empty"));
        }

        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::config_key(
                "logging.level",
                format!(
                    "unknown log level '{}' (expected one of {:?})",
                    self.logging.level, LEVELS
                ),
            ));
        }

        if self.session.otp_code.trim().is_empty() {
            return Err(Error::config_key("session.otp_code", "OTP code is empty"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub description: String,
    pub environment: String,
    pub debug: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "Nectar".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Nectar grocery storefront demo".to_string(),
            environment: "development".to_string(),
            debug: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<FileLogConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "nectar".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Data directory for the file backend; platform data dir when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Seed the demo catalog when no snapshot exists
    pub seed_demo_data: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Artificial delay applied to the simulated login/signup calls
    pub simulated_latency_ms: u64,
    /// The demo OTP code accepted by verification
    pub otp_code: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 1000,
            otp_code: "1234".to_string(),
        }
    }
}

/// Loads and serves the application configuration
pub struct ConfigManager {
    state: ManagedState,
    config_path: Option<PathBuf>,
    config: Arc<RwLock<AppConfig>>,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("config_path", &self.config_path)
            .finish()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            state: ManagedState::new(Uuid::new_v4(), "config_manager"),
            config_path: None,
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn with_config_file<P: AsRef<Path>>(config_path: P) -> Self {
        let mut manager = Self::new();
        manager.config_path = Some(config_path.as_ref().to_path_buf());
        manager
    }

    /// Returns a snapshot of the current configuration
    pub async fn get_config(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Parses a configuration file, format chosen by extension
    pub async fn load_file(path: &Path) -> Result<AppConfig> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| {
            Error::config(format!(
                "unsupported config extension: {}",
                path.display()
            ))
        })?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::config(format!("failed to read {}: {}", path.display(), e)))?;

        let config: AppConfig = match format {
            ConfigFormat::Json => serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("failed to parse JSON config: {}", e)))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("failed to parse YAML config: {}", e)))?,
            ConfigFormat::Toml => toml::from_str(&content)
                .map_err(|e| Error::config(format!("failed to parse TOML config: {}", e)))?,
        };

        Ok(config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Manager for ConfigManager {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> Uuid {
        self.state.id()
    }

    async fn initialize(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Initializing).await;

        let config = match &self.config_path {
            Some(path) => Self::load_file(path).await.map_err(|e| {
                Error::manager(
                    "config_manager",
                    ManagerOperation::Initialize,
                    format!("failed to load configuration: {}", e),
                )
            })?,
            None => AppConfig::default(),
        };

        config.validate()?;
        *self.config.write().await = config;

        self.state.set_state(ManagerState::Running).await;
        tracing::debug!(config_path = ?self.config_path, "configuration loaded");
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Shutdown).await;
        Ok(())
    }

    async fn status(&self) -> ManagerStatus {
        let mut status = self.state.status().await;
        if let Some(path) = &self.config_path {
            status.add_metadata("config_path", serde_json::json!(path.display().to_string()));
        }
        let config = self.config.read().await;
        status.add_metadata("environment", serde_json::json!(config.app.environment));
        status
    }
}
