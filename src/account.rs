// src/account.rs

//! Session and account store.
//!
//! The backend is simulated: any well-formed credentials sign in after a
//! short artificial delay, and the demo user always gets id "1". The whole
//! session, including the chosen delivery location, persists under the
//! "auth-storage" key. Logging out keeps the delivery location so the next
//! sign-in lands in the same place.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::event::{Event, EventBusManager};
use crate::manager::{ManagedState, Manager, ManagerState, ManagerStatus};
use crate::storage::{load_snapshot, save_snapshot, SharedStorage, AUTH_STORE_KEY};
use crate::types::Metadata;
use crate::utils::{strings, validation};

/// Delivery zones offered by the location picker
pub const DELIVERY_ZONES: [&str; 4] = ["Banasree", "Gulshan", "Dhanmondi", "Bashundhara"];

/// An authenticated customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Fired on sign-in and sign-out
#[derive(Debug, Clone)]
pub struct SessionChangedEvent {
    pub authenticated: bool,
    metadata: Metadata,
}

impl Event for SessionChangedEvent {
    fn event_type(&self) -> &'static str {
        "session.changed"
    }

    fn source(&self) -> &str {
        "account_manager"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fired when the delivery location changes
#[derive(Debug, Clone)]
pub struct LocationChangedEvent {
    pub location: String,
    metadata: Metadata,
}

impl Event for LocationChangedEvent {
    fn event_type(&self) -> &'static str {
        "session.location_changed"
    }

    fn source(&self) -> &str {
        "account_manager"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Persisted session state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionState {
    user: Option<User>,
    is_authenticated: bool,
    location: Option<String>,
}

/// Account and session manager
pub struct AccountManager {
    state: ManagedState,
    config: SessionConfig,
    storage: Option<SharedStorage>,
    events: Option<Arc<EventBusManager>>,
    inner: Arc<parking_lot::RwLock<SessionState>>,
}

impl fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("AccountManager")
            .field("is_authenticated", &inner.is_authenticated)
            .field("location", &inner.location)
            .finish()
    }
}

impl AccountManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: ManagedState::new(Uuid::new_v4(), "account_manager"),
            config,
            storage: None,
            events: None,
            inner: Arc::new(parking_lot::RwLock::new(SessionState::default())),
        }
    }

    pub fn with_storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBusManager>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_authenticated
    }

    pub fn location(&self) -> Option<String> {
        self.inner.read().location.clone()
    }

    /// The signed-in user's name, or "Guest User"
    pub fn display_name(&self) -> String {
        self.inner
            .read()
            .user
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Guest User".to_string())
    }

    /// Signs in with an email address. The simulated backend accepts any
    /// well-formed address and answers after the configured delay.
    pub async fn login(&self, email: &str) -> Result<User> {
        if !validation::is_valid_email(email) {
            return Err(Error::account("a valid email address is required"));
        }

        self.simulate_backend_call().await;

        let user = User {
            id: "1".to_string(),
            name: "Demo User".to_string(),
            email: email.to_string(),
            phone: None,
            location: None,
        };
        {
            let mut inner = self.inner.write();
            inner.user = Some(user.clone());
            inner.is_authenticated = true;
        }
        self.persist().await;
        self.publish(SessionChangedEvent {
            authenticated: true,
            metadata: Metadata::new(),
        });

        tracing::info!(email, "signed in");
        Ok(user)
    }

    /// Creates an account and signs in, keeping the given display name
    pub async fn signup(&self, name: &str, email: &str) -> Result<User> {
        if strings::is_blank(name) {
            return Err(Error::account("a display name is required"));
        }
        if !validation::is_valid_email(email) {
            return Err(Error::account("a valid email address is required"));
        }

        self.simulate_backend_call().await;

        let user = User {
            id: "1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            location: None,
        };
        {
            let mut inner = self.inner.write();
            inner.user = Some(user.clone());
            inner.is_authenticated = true;
        }
        self.persist().await;
        self.publish(SessionChangedEvent {
            authenticated: true,
            metadata: Metadata::new(),
        });

        tracing::info!(email, "account created");
        Ok(user)
    }

    /// Signs out. The delivery location survives for the next session.
    pub async fn logout(&self) {
        {
            let mut inner = self.inner.write();
            inner.user = None;
            inner.is_authenticated = false;
        }
        self.persist().await;
        self.publish(SessionChangedEvent {
            authenticated: false,
            metadata: Metadata::new(),
        });
        tracing::info!("signed out");
    }

    /// Checks a one-time code against the configured demo code
    pub fn verify_otp(&self, code: &str) -> bool {
        code == self.config.otp_code
    }

    /// Stores the delivery location as "zone, area", or just the zone when
    /// no area is given. Returns the composed location.
    pub async fn set_location(&self, zone: &str, area: Option<&str>) -> String {
        let location = match area.filter(|a| !a.is_empty()) {
            Some(area) => format!("{}, {}", zone, area),
            None => zone.to_string(),
        };
        self.inner.write().location = Some(location.clone());
        self.persist().await;
        self.publish(LocationChangedEvent {
            location: location.clone(),
            metadata: Metadata::new(),
        });
        location
    }

    async fn simulate_backend_call(&self) {
        tokio::time::sleep(Duration::from_millis(self.config.simulated_latency_ms)).await;
    }

    /// Best-effort snapshot write, session changes never fail on storage
    /// errors
    async fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let snapshot = self.inner.read().clone();
        if let Err(e) = save_snapshot(storage.as_ref(), AUTH_STORE_KEY, &snapshot).await {
            tracing::warn!(error = %e, "failed to persist session snapshot");
        }
    }

    fn publish<E: Event + 'static>(&self, event: E) {
        if let Some(bus) = &self.events {
            if let Err(e) = bus.publish(event) {
                tracing::debug!(error = %e, "failed to publish session event");
            }
        }
    }
}

#[async_trait::async_trait]
impl Manager for AccountManager {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> Uuid {
        self.state.id()
    }

    async fn initialize(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Initializing).await;

        if let Some(storage) = &self.storage {
            match load_snapshot::<SessionState>(storage.as_ref(), AUTH_STORE_KEY).await {
                Ok(Some(snapshot)) => {
                    let authenticated = snapshot.is_authenticated;
                    *self.inner.write() = snapshot;
                    tracing::info!(authenticated, "session restored from snapshot");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "session snapshot unreadable, starting signed out");
                }
            }
        }

        self.state.set_state(ManagerState::Running).await;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::ShuttingDown).await;
        self.persist().await;
        self.state.set_state(ManagerState::Shutdown).await;
        Ok(())
    }

    async fn status(&self) -> ManagerStatus {
        let mut status = self.state.status().await;
        let inner = self.inner.read();
        status.add_metadata("authenticated", serde_json::json!(inner.is_authenticated));
        status.add_metadata("has_location", serde_json::json!(inner.location.is_some()));
        status
    }
}
