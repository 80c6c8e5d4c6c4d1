// src/cart.rs

//! Shopping cart store.
//!
//! Cart lines keep a full copy of the product at the time it was added, so
//! the cart renders without consulting the catalog. The whole line list
//! persists under the "cart-storage" key on every mutation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Product;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::event::{Event, EventBusManager};
use crate::manager::{ManagedState, Manager, ManagerState, ManagerStatus};
use crate::storage::{load_snapshot, save_snapshot, SharedStorage, CART_STORE_KEY};
use crate::types::{Metadata, OrderStatus};

/// One cart line: a product and how many of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Fired after any cart mutation
#[derive(Debug, Clone)]
pub struct CartUpdatedEvent {
    pub item_count: u32,
    pub total_price: f64,
    metadata: Metadata,
}

impl Event for CartUpdatedEvent {
    fn event_type(&self) -> &'static str {
        "cart.updated"
    }

    fn source(&self) -> &str {
        "cart_manager"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fired after checkout completes
#[derive(Debug, Clone)]
pub struct OrderPlacedEvent {
    pub status: OrderStatus,
    pub item_count: u32,
    pub total_price: f64,
    metadata: Metadata,
}

impl Event for OrderPlacedEvent {
    fn event_type(&self) -> &'static str {
        "cart.order_placed"
    }

    fn source(&self) -> &str {
        "cart_manager"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CartSnapshot {
    items: Vec<CartItem>,
}

/// Shopping cart manager
pub struct CartManager {
    state: ManagedState,
    config: SessionConfig,
    storage: Option<SharedStorage>,
    events: Option<Arc<EventBusManager>>,
    items: Arc<parking_lot::RwLock<Vec<CartItem>>>,
}

impl fmt::Debug for CartManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("items", &self.items.read().len())
            .finish()
    }
}

impl CartManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: ManagedState::new(Uuid::new_v4(), "cart_manager"),
            config,
            storage: None,
            events: None,
            items: Arc::new(parking_lot::RwLock::new(Vec::new())),
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

    pub fn items(&self) -> Vec<CartItem> {
        self.items.read().clone()
    }

    /// Total units across all lines, the cart badge number
    pub fn item_count(&self) -> u32 {
        self.items.read().iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn total_price(&self) -> f64 {
        self.items.read().iter().map(CartItem::line_total).sum()
    }

    /// Adds `quantity` of a product, merging into an existing line for the
    /// same product id
    pub async fn add_to_cart(&self, product: Product, quantity: u32) {
        {
            let mut items = self.items.write();
            if let Some(item) = items.iter_mut().find(|i| i.product.id == product.id) {
                item.quantity += quantity;
            } else {
                items.push(CartItem { product, quantity });
            }
        }
        self.after_mutation().await;
    }

    pub async fn remove_from_cart(&self, product_id: &str) {
        self.items.write().retain(|i| i.product.id != product_id);
        self.after_mutation().await;
    }

    /// Adjusts a line's quantity by `delta`, clamping at zero. Lines that
    /// reach zero are removed. Unknown product ids are ignored.
    pub async fn update_quantity(&self, product_id: &str, delta: i32) {
        {
            let mut items = self.items.write();
            for item in items.iter_mut() {
                if item.product.id == product_id {
                    item.quantity = (i64::from(item.quantity) + i64::from(delta)).max(0) as u32;
                }
            }
            items.retain(|i| i.quantity > 0);
        }
        self.after_mutation().await;
    }

    pub async fn clear(&self) {
        self.items.write().clear();
        self.after_mutation().await;
    }

    /// Places the order: the simulated backend always accepts it. The cart
    /// is emptied and the order status returned.
    pub async fn checkout(&self) -> Result<OrderStatus> {
        let (item_count, total_price) = {
            let items = self.items.read();
            if items.is_empty() {
                return Err(Error::cart("cannot check out an empty cart"));
            }
            (
                items.iter().map(|i| i.quantity).sum::<u32>(),
                items.iter().map(CartItem::line_total).sum(),
            )
        };

        tokio::time::sleep(Duration::from_millis(self.config.simulated_latency_ms)).await;

        self.items.write().clear();
        self.persist().await;
        self.publish(OrderPlacedEvent {
            status: OrderStatus::Success,
            item_count,
            total_price,
            metadata: Metadata::new(),
        });

        tracing::info!(item_count, total_price, "order placed");
        Ok(OrderStatus::Success)
    }

    async fn after_mutation(&self) {
        self.persist().await;
        let (item_count, total_price) = {
            let items = self.items.read();
            (
                items.iter().map(|i| i.quantity).sum::<u32>(),
                items.iter().map(CartItem::line_total).sum(),
            )
        };
        self.publish(CartUpdatedEvent {
            item_count,
            total_price,
            metadata: Metadata::new(),
        });
    }

    /// Best-effort snapshot write, mutations never fail on storage errors
    async fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let snapshot = CartSnapshot {
            items: self.items.read().clone(),
        };
        if let Err(e) = save_snapshot(storage.as_ref(), CART_STORE_KEY, &snapshot).await {
            tracing::warn!(error = %e, "failed to persist cart snapshot");
        }
    }

    fn publish<E: Event + 'static>(&self, event: E) {
        if let Some(bus) = &self.events {
            if let Err(e) = bus.publish(event) {
                tracing::debug!(error = %e, "failed to publish cart event");
            }
        }
    }
}

#[async_trait::async_trait]
impl Manager for CartManager {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> Uuid {
        self.state.id()
    }

    async fn initialize(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Initializing).await;

        if let Some(storage) = &self.storage {
            match load_snapshot::<CartSnapshot>(storage.as_ref(), CART_STORE_KEY).await {
                Ok(Some(snapshot)) => {
                    let count = snapshot.items.len();
                    *self.items.write() = snapshot.items;
                    tracing::info!(items = count, "cart restored from snapshot");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "cart snapshot unreadable, starting empty");
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
        status.add_metadata("item_count", serde_json::json!(self.item_count()));
        status.add_metadata("total_price", serde_json::json!(self.total_price()));
        status
    }
}
