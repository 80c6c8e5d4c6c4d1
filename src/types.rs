use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for managers, subscriptions, etc.
pub type Id = Uuid;

/// Generic metadata container
pub type Metadata = HashMap<String, Value>;

/// Product identifier as carried by the catalog, cart, and favorites
pub type ProductId = String;

/// Lifecycle of a placed order as the checkout screens see it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Success,
    Failed,
}
