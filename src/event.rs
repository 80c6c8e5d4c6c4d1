// src/event.rs

//! Store-change notification bus.
//!
//! Stores publish a small set of change events (`catalog.*`, `cart.*`,
//! `session.*`) after each mutation so a shell can react without polling.
//! Delivery is synchronous and fire-and-forget; a publish never fails the
//! mutation that triggered it.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::channel::mpsc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Error, ErrorKind, EventOperation, Result};
use crate::manager::{ManagedState, Manager, ManagerState, ManagerStatus};
use crate::types::Metadata;

/// Base trait implemented by every store-change event
pub trait Event: Send + Sync + Debug {
    /// Event type identifier, e.g. "catalog.products_changed"
    fn event_type(&self) -> &'static str;

    /// The store that produced the event
    fn source(&self) -> &str;

    /// Event metadata
    fn metadata(&self) -> &Metadata;

    /// The event as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Event timestamp
    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Event subscription filter
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Event types to match (empty means all)
    pub event_types: Vec<String>,
    /// Source patterns to match ("*" or substring)
    pub source_patterns: Vec<String>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self {
            event_types: Vec::new(),
            source_patterns: Vec::new(),
        }
    }

    /// Add event type filter
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    /// Add source pattern filter
    pub fn with_source_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.source_patterns.push(pattern.into());
        self
    }

    /// Check if an event matches this filter
    pub fn matches(&self, event: &dyn Event) -> bool {
        if !self.event_types.is_empty()
            && !self.event_types.contains(&event.event_type().to_string())
        {
            return false;
        }

        if !self.source_patterns.is_empty() {
            let source = event.source();
            if !self
                .source_patterns
                .iter()
                .any(|pattern| pattern == "*" || source.contains(pattern.as_str()))
            {
                return false;
            }
        }

        true
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Event subscription
pub struct EventSubscription {
    pub id: Uuid,
    pub filter: EventFilter,
    pub sender: mpsc::UnboundedSender<Arc<dyn Event>>,
    pub created_at: DateTime<Utc>,
}

impl Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("id", &self.id)
            .field("filter", &self.filter)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Event bus statistics
#[derive(Debug, Clone, Default)]
pub struct EventStats {
    pub total_published: u64,
    pub total_delivered: u64,
    pub total_dropped: u64,
    pub events_by_type: HashMap<String, u64>,
    pub active_subscriptions: usize,
}

/// In-process event bus for store-change notifications
pub struct EventBusManager {
    state: ManagedState,
    subscriptions: Arc<DashMap<Uuid, EventSubscription>>,
    stats: Arc<RwLock<EventStats>>,
    event_counter: Arc<AtomicU64>,
}

impl Debug for EventBusManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBusManager")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBusManager {
    /// Create a new event bus manager
    pub fn new() -> Self {
        Self {
            state: ManagedState::new(Uuid::new_v4(), "event_bus_manager"),
            subscriptions: Arc::new(DashMap::new()),
            stats: Arc::new(RwLock::new(EventStats::default())),
            event_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish an event to all matching subscriptions
    pub fn publish<E: Event + 'static>(&self, event: E) -> Result<()> {
        let event_arc: Arc<dyn Event> = Arc::new(event);

        self.event_counter.fetch_add(1, Ordering::Relaxed);
        {
            let mut stats = self.stats.write();
            stats.total_published += 1;
            *stats
                .events_by_type
                .entry(event_arc.event_type().to_string())
                .or_insert(0) += 1;
        }

        let matching: Vec<Uuid> = self
            .subscriptions
            .iter()
            .filter_map(|entry| {
                let subscription = entry.value();
                if subscription.filter.matches(event_arc.as_ref()) {
                    Some(subscription.id)
                } else {
                    None
                }
            })
            .collect();

        let mut delivered = 0u64;
        let mut dropped = 0u64;

        for subscription_id in matching {
            let Some(subscription) = self.subscriptions.get(&subscription_id) else {
                continue;
            };
            let send_failed = subscription
                .sender
                .unbounded_send(Arc::clone(&event_arc))
                .is_err();
            drop(subscription);

            if send_failed {
                // Receiver gone; prune the subscription
                dropped += 1;
                self.subscriptions.remove(&subscription_id);
            } else {
                delivered += 1;
            }
        }

        {
            let mut stats = self.stats.write();
            stats.total_delivered += delivered;
            stats.total_dropped += dropped;
            stats.active_subscriptions = self.subscriptions.len();
        }

        tracing::trace!(
            event_type = event_arc.event_type(),
            delivered,
            dropped,
            "published store event"
        );

        Ok(())
    }

    /// Subscribe to events with a filter, receiving them on a channel
    pub fn subscribe(&self, filter: EventFilter) -> mpsc::UnboundedReceiver<Arc<dyn Event>> {
        let (sender, receiver) = mpsc::unbounded::<Arc<dyn Event>>();
        let subscription_id = Uuid::new_v4();

        let subscription = EventSubscription {
            id: subscription_id,
            filter,
            sender,
            created_at: Utc::now(),
        };

        self.subscriptions.insert(subscription_id, subscription);
        self.stats.write().active_subscriptions = self.subscriptions.len();

        receiver
    }

    /// Unsubscribe from events
    pub fn unsubscribe(&self, subscription_id: Uuid) -> Result<()> {
        self.subscriptions.remove(&subscription_id).ok_or_else(|| {
            Error::new(
                ErrorKind::Event {
                    event_type: None,
                    subscriber_id: Some(subscription_id),
                    operation: EventOperation::Unsubscribe,
                },
                "Subscription not found",
            )
        })?;

        self.stats.write().active_subscriptions = self.subscriptions.len();
        Ok(())
    }

    /// Event bus statistics snapshot
    pub fn stats(&self) -> EventStats {
        self.stats.read().clone()
    }
}

impl Default for EventBusManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Manager for EventBusManager {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> Uuid {
        self.state.id()
    }

    async fn initialize(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Running).await;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::ShuttingDown).await;
        self.subscriptions.clear();
        self.stats.write().active_subscriptions = 0;
        self.state.set_state(ManagerState::Shutdown).await;
        Ok(())
    }

    async fn status(&self) -> ManagerStatus {
        let mut status = self.state.status().await;
        status.add_metadata(
            "active_subscriptions",
            serde_json::json!(self.subscriptions.len()),
        );
        status.add_metadata(
            "total_published",
            serde_json::json!(self.event_counter.load(Ordering::Relaxed)),
        );
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[derive(Debug)]
    struct TestEvent {
        source: String,
        metadata: Metadata,
    }

    impl TestEvent {
        fn new(source: &str) -> Self {
            Self {
                source: source.to_string(),
                metadata: HashMap::new(),
            }
        }
    }

    impl Event for TestEvent {
        fn event_type(&self) -> &'static str {
            "test.changed"
        }

        fn source(&self) -> &str {
            &self.source
        }

        fn metadata(&self) -> &Metadata {
            &self.metadata
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBusManager::new();
        let mut receiver = bus.subscribe(EventFilter::new().with_event_type("test.changed"));

        bus.publish(TestEvent::new("catalog_manager")).unwrap();

        let received = receiver.next().await.unwrap();
        assert_eq!(received.event_type(), "test.changed");
        assert_eq!(received.source(), "catalog_manager");

        let stats = bus.stats();
        assert_eq!(stats.total_published, 1);
        assert_eq!(stats.total_delivered, 1);
    }

    #[tokio::test]
    async fn test_filter_by_source() {
        let bus = EventBusManager::new();
        let mut cart_only = bus.subscribe(EventFilter::new().with_source_pattern("cart"));

        bus.publish(TestEvent::new("catalog_manager")).unwrap();
        bus.publish(TestEvent::new("cart_manager")).unwrap();

        let received = cart_only.next().await.unwrap();
        assert_eq!(received.source(), "cart_manager");
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let bus = EventBusManager::new();
        let receiver = bus.subscribe(EventFilter::new());
        drop(receiver);

        bus.publish(TestEvent::new("catalog_manager")).unwrap();

        let stats = bus.stats();
        assert_eq!(stats.active_subscriptions, 0);
        assert_eq!(stats.total_dropped, 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_id() {
        let bus = EventBusManager::new();
        let result = bus.unsubscribe(Uuid::new_v4());
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_matching() {
        let event = TestEvent::new("catalog_manager");

        assert!(EventFilter::new().matches(&event));
        assert!(EventFilter::new()
            .with_event_type("test.changed")
            .matches(&event));
        assert!(!EventFilter::new()
            .with_event_type("cart.changed")
            .matches(&event));
        assert!(EventFilter::new().with_source_pattern("*").matches(&event));
        assert!(!EventFilter::new()
            .with_source_pattern("account")
            .matches(&event));
    }
}
