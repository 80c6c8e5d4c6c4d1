// src/error.rs - Error handling for the storefront core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration {
        key: Option<String>,
        validation_errors: Vec<String>,
    },
    Manager {
        manager_name: String,
        operation: ManagerOperation,
    },
    Event {
        event_type: Option<String>,
        subscriber_id: Option<Uuid>,
        operation: EventOperation,
    },
    Storage {
        store: Option<String>,
        key: Option<String>,
        operation: StorageOperation,
    },
    Catalog {
        product_id: Option<String>,
    },
    Cart {
        product_id: Option<String>,
    },
    Account {
        reason: String,
    },
    Validation {
        field: Option<String>,
        rules: Vec<String>,
    },
    Application,
    Io,
    Serialization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerOperation {
    Initialize,
    Shutdown,
    Operation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOperation {
    Publish,
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageOperation {
    Get,
    Set,
    Delete,
    List,
    Clear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub message: String,
    pub severity: ErrorSeverity,
    pub source: String,
    pub correlation_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub metadata: crate::types::Metadata,
    pub backtrace: Option<String>,
    pub causes: Vec<String>,
}

impl Error {
    /// Creates a new error with the specified kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            severity: ErrorSeverity::Medium,
            source: "unknown".to_string(),
            correlation_id: None,
            timestamp: Utc::now(),
            metadata: std::collections::HashMap::new(),
            backtrace: Some(std::backtrace::Backtrace::capture().to_string()),
            causes: Vec::new(),
        }
    }

    /// Sets the error severity
    pub fn severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the error source
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the correlation ID
    pub fn correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Adds metadata to the error
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Adds a cause to the error chain
    pub fn caused_by(mut self, cause: impl fmt::Display) -> Self {
        self.causes.push(cause.to_string());
        self
    }

    /// Checks if the error should be handled automatically
    pub fn should_handle(&self) -> bool {
        matches!(self.severity, ErrorSeverity::Low | ErrorSeverity::Medium)
    }

    /// Checks if the error is critical
    pub fn is_critical(&self) -> bool {
        matches!(self.severity, ErrorSeverity::Critical)
    }

    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Configuration {
                key: None,
                validation_errors: Vec::new(),
            },
            message,
        )
        .severity(ErrorSeverity::High)
    }

    /// Creates a configuration validation error for a specific key
    pub fn config_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Configuration {
                key: Some(key.into()),
                validation_errors: Vec::new(),
            },
            message,
        )
        .severity(ErrorSeverity::High)
    }

    /// Creates a manager operation error
    pub fn manager(
        manager_name: impl Into<String>,
        operation: ManagerOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Manager {
                manager_name: manager_name.into(),
                operation,
            },
            message,
        )
        .severity(ErrorSeverity::High)
    }

    /// Creates a storage error for a named store and key
    pub fn storage(
        store: Option<String>,
        key: Option<String>,
        operation: StorageOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Storage {
                store,
                key,
                operation,
            },
            message,
        )
    }

    /// Creates a catalog error
    pub fn catalog(product_id: Option<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Catalog { product_id }, message)
    }

    /// Creates a cart error
    pub fn cart(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cart { product_id: None }, message)
    }

    /// Creates an account error
    pub fn account(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self::new(
            ErrorKind::Account {
                reason: msg.clone(),
            },
            msg,
        )
    }

    /// Creates a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Validation {
                field: Some(field.into()),
                rules: Vec::new(),
            },
            message,
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.source, self.id, self.message
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let msg = err.to_string();

        let mut error = Error::new(ErrorKind::Io, msg);
        error.source = "std::io::Error".to_string();
        error.severity = ErrorSeverity::High;

        error
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let msg = err.to_string();

        let mut error = Error::new(ErrorKind::Serialization, msg);
        error.source = "serde_json::Error".to_string();

        error
    }
}

/// Extension trait for Results to add context
pub trait ResultExt<T> {
    /// Adds context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Sets the error source
    fn with_source(self, source: impl Into<String>) -> Result<T>;

    /// Sets the correlation ID
    fn with_correlation(self, correlation_id: Uuid) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::new(ErrorKind::Application, f()).caused_by(e))
    }

    fn with_source(self, source: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            Error::new(ErrorKind::Application, e.to_string())
                .source(source)
                .caused_by(e)
        })
    }

    fn with_correlation(self, correlation_id: Uuid) -> Result<T> {
        self.map_err(|e| {
            Error::new(ErrorKind::Application, e.to_string())
                .correlation_id(correlation_id)
                .caused_by(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::config("Invalid configuration value")
            .source("config_manager")
            .metadata(
                "key",
                serde_json::Value::String("storage.data_dir".to_string()),
            );

        assert_eq!(error.severity, ErrorSeverity::High);
        assert_eq!(error.source, "config_manager");
        assert!(matches!(error.kind, ErrorKind::Configuration { .. }));
        assert!(error.metadata.contains_key("key"));
    }

    #[test]
    fn test_storage_error() {
        let error = Error::storage(
            Some("product-storage".to_string()),
            Some("product-storage".to_string()),
            StorageOperation::Set,
            "backend unavailable",
        );
        assert!(matches!(error.kind, ErrorKind::Storage { .. }));
        assert_eq!(error.severity, ErrorSeverity::Medium);
        assert!(error.should_handle());
    }

    #[test]
    fn test_account_error_carries_reason() {
        let error = Error::account("email is required");
        match &error.kind {
            ErrorKind::Account { reason } => assert_eq!(reason, "email is required"),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing snapshot",
        ));

        let error = result
            .with_context(|| "failed to restore cart".to_string())
            .unwrap_err();

        assert!(matches!(error.kind, ErrorKind::Application));
        assert_eq!(error.message, "failed to restore cart");
        assert_eq!(error.causes.len(), 1);
    }
}
