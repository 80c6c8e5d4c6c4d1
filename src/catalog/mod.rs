// src/catalog/mod.rs

//! Product catalog store.
//!
//! Owns the product list, the review log on each product, the favorites
//! list, and the active filter selection. The filtered view is computed on
//! read from the current selection, so it can never drift out of sync with
//! the catalog.
//!
//! Products and favorites persist as one snapshot under the
//! "product-storage" key. Filter state is session-local and never persisted.

pub mod filter;
pub mod fixture;
pub mod model;

pub use filter::{FilterSelection, BRAND_OPTIONS, SUB_CATEGORY_OPTIONS};
pub use model::{Category, Product, Review, UnknownCategory};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::event::{Event, EventBusManager};
use crate::manager::{ManagedState, Manager, ManagerState, ManagerStatus};
use crate::storage::{load_snapshot, save_snapshot, SharedStorage, PRODUCT_STORE_KEY};
use crate::types::Metadata;
use crate::utils::strings;
use crate::utils::Time;

/// Fired after a review lands on a product
#[derive(Debug, Clone)]
pub struct ProductReviewedEvent {
    pub product_id: String,
    pub rating: f64,
    pub review_count: usize,
    metadata: Metadata,
}

impl Event for ProductReviewedEvent {
    fn event_type(&self) -> &'static str {
        "catalog.product_reviewed"
    }

    fn source(&self) -> &str {
        "catalog_manager"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fired after a favorite is toggled on or off
#[derive(Debug, Clone)]
pub struct FavoriteToggledEvent {
    pub product_id: String,
    pub favorited: bool,
    metadata: Metadata,
}

impl Event for FavoriteToggledEvent {
    fn event_type(&self) -> &'static str {
        "catalog.favorite_toggled"
    }

    fn source(&self) -> &str {
        "catalog_manager"
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Persisted portion of the catalog state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogSnapshot {
    products: Vec<Product>,
    favorites: Vec<String>,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: Vec<Product>,
    favorites: Vec<String>,
    selection: FilterSelection,
}

/// Catalog store manager
pub struct CatalogManager {
    state: ManagedState,
    config: CatalogConfig,
    storage: Option<SharedStorage>,
    events: Option<Arc<EventBusManager>>,
    inner: Arc<parking_lot::RwLock<CatalogState>>,
}

impl fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("CatalogManager")
            .field("products", &inner.products.len())
            .field("favorites", &inner.favorites.len())
            .field("selection", &inner.selection)
            .finish()
    }
}

impl CatalogManager {
    /// Creates a catalog, seeded with the demo products when configured
    pub fn new(config: CatalogConfig) -> Self {
        let products = if config.seed_demo_data {
            fixture::demo_products()
        } else {
            Vec::new()
        };
        Self {
            state: ManagedState::new(Uuid::new_v4(), "catalog_manager"),
            config,
            storage: None,
            events: None,
            inner: Arc::new(parking_lot::RwLock::new(CatalogState {
                products,
                ..CatalogState::default()
            })),
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

    /// The full catalog, in stable order
    pub fn products(&self) -> Vec<Product> {
        self.inner.read().products.clone()
    }

    pub fn product(&self, product_id: &str) -> Option<Product> {
        self.inner
            .read()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
    }

    /// The catalog narrowed by the active selection, in catalog order
    pub fn filtered_products(&self) -> Vec<Product> {
        let inner = self.inner.read();
        inner.selection.apply(&inner.products)
    }

    /// First home rail: the leading slice of the filtered view
    pub fn best_selling(&self) -> Vec<Product> {
        self.filtered_products().into_iter().take(4).collect()
    }

    /// Second home rail: the two products after the best sellers
    pub fn exclusive_offers(&self) -> Vec<Product> {
        self.filtered_products().into_iter().skip(4).take(2).collect()
    }

    pub fn selection(&self) -> FilterSelection {
        self.inner.read().selection.clone()
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.inner.write().selection.query = query.into();
    }

    /// Sets or clears the category context. Contexts that are not category
    /// display names fall back to matching product names.
    pub fn set_category_filter(&self, context: Option<String>) {
        if let Some(raw) = context.as_deref() {
            if raw.parse::<Category>().is_err() {
                tracing::debug!(context = raw, "filter context is not a category, matching names");
            }
        }
        self.inner.write().selection.category_context = context;
    }

    pub fn toggle_sub_category(&self, tag: &str) {
        let mut inner = self.inner.write();
        toggle_membership(&mut inner.selection.sub_categories, tag);
    }

    pub fn toggle_brand(&self, brand: &str) {
        let mut inner = self.inner.write();
        toggle_membership(&mut inner.selection.brands, brand);
    }

    /// Clears all four filter axes
    pub fn reset_filters(&self) {
        self.inner.write().selection = FilterSelection::default();
    }

    /// Favorited product ids, oldest first
    pub fn favorites(&self) -> Vec<String> {
        self.inner.read().favorites.clone()
    }

    pub fn is_favorite(&self, product_id: &str) -> bool {
        self.inner.read().favorites.iter().any(|f| f == product_id)
    }

    /// Favorited products in catalog order
    pub fn favorite_products(&self) -> Vec<Product> {
        let inner = self.inner.read();
        inner
            .products
            .iter()
            .filter(|p| inner.favorites.contains(&p.id))
            .cloned()
            .collect()
    }

    /// Adds or removes `product_id` from the favorites list. The id is not
    /// validated against the catalog, and the filter selection is untouched.
    pub async fn toggle_favorite(&self, product_id: &str) {
        let favorited = {
            let mut inner = self.inner.write();
            toggle_membership(&mut inner.favorites, product_id)
        };
        self.persist().await;
        self.publish(FavoriteToggledEvent {
            product_id: product_id.to_string(),
            favorited,
            metadata: Metadata::new(),
        });
    }

    /// Appends a review and recomputes the product's headline rating as the
    /// mean of all its reviews, rounded to one decimal.
    ///
    /// Reviews with a blank comment, or for an unknown product, are dropped
    /// silently. A missing or blank author is recorded as "Guest User".
    pub async fn add_review(
        &self,
        product_id: &str,
        author: Option<&str>,
        rating: u8,
        comment: &str,
    ) {
        if strings::is_blank(comment) {
            tracing::debug!(product_id, "dropping review with blank comment");
            return;
        }

        let event = {
            let mut inner = self.inner.write();
            let Some(product) = inner.products.iter_mut().find(|p| p.id == product_id) else {
                tracing::debug!(product_id, "dropping review for unknown product");
                return;
            };

            let author = author
                .filter(|a| !strings::is_blank(a))
                .unwrap_or("Guest User");
            product.reviews.push(Review {
                id: Time::now_millis().to_string(),
                author: author.to_string(),
                rating,
                comment: comment.to_string(),
                date: Time::now(),
            });
            product.rating = mean_rating(&product.reviews);

            ProductReviewedEvent {
                product_id: product_id.to_string(),
                rating: product.rating,
                review_count: product.reviews.len(),
                metadata: Metadata::new(),
            }
        };

        self.persist().await;
        self.publish(event);
    }

    /// Writes the current snapshot, logging instead of failing. Mutations
    /// always land in memory even when the backing store is unavailable.
    async fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let snapshot = {
            let inner = self.inner.read();
            CatalogSnapshot {
                products: inner.products.clone(),
                favorites: inner.favorites.clone(),
            }
        };
        if let Err(e) = save_snapshot(storage.as_ref(), PRODUCT_STORE_KEY, &snapshot).await {
            tracing::warn!(error = %e, "failed to persist catalog snapshot");
        }
    }

    fn publish<E: Event + 'static>(&self, event: E) {
        if let Some(bus) = &self.events {
            if let Err(e) = bus.publish(event) {
                tracing::debug!(error = %e, "failed to publish catalog event");
            }
        }
    }
}

/// Mean of all review ratings, rounded half away from zero to one decimal
fn mean_rating(reviews: &[Review]) -> f64 {
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    (total as f64 / reviews.len() as f64 * 10.0).round() / 10.0
}

/// Removes `value` when present, appends it otherwise. Returns whether the
/// value is now in the list.
fn toggle_membership(list: &mut Vec<String>, value: &str) -> bool {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
        false
    } else {
        list.push(value.to_string());
        true
    }
}

#[async_trait::async_trait]
impl Manager for CatalogManager {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> Uuid {
        self.state.id()
    }

    async fn initialize(&mut self) -> Result<()> {
        self.state.set_state(ManagerState::Initializing).await;

        if let Some(storage) = &self.storage {
            match load_snapshot::<CatalogSnapshot>(storage.as_ref(), PRODUCT_STORE_KEY).await {
                Ok(Some(snapshot)) => {
                    let mut inner = self.inner.write();
                    inner.products = snapshot.products;
                    inner.favorites = snapshot.favorites;
                    tracing::info!(
                        products = inner.products.len(),
                        favorites = inner.favorites.len(),
                        "catalog restored from snapshot"
                    );
                }
                Ok(None) => {
                    tracing::info!(
                        seeded = self.config.seed_demo_data,
                        "no catalog snapshot, starting from seed"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "catalog snapshot unreadable, starting from seed");
                    let mut inner = self.inner.write();
                    inner.products = if self.config.seed_demo_data {
                        fixture::demo_products()
                    } else {
                        Vec::new()
                    };
                    inner.favorites.clear();
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
        let (products, favorites, filtering) = {
            let inner = self.inner.read();
            (
                inner.products.len(),
                inner.favorites.len(),
                !inner.selection.is_empty(),
            )
        };
        status.add_metadata("product_count", serde_json::json!(products));
        status.add_metadata("favorite_count", serde_json::json!(favorites));
        status.add_metadata("filter_active", serde_json::json!(filtering));
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageProvider};
    use futures::StreamExt;

    fn catalog() -> CatalogManager {
        CatalogManager::new(CatalogConfig::default())
    }

    /// Storage that accepts reads but refuses writes
    #[derive(Debug)]
    struct ReadOnlyStorage;

    #[async_trait::async_trait]
    impl StorageProvider for ReadOnlyStorage {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn set(&self, key: &str, _value: &[u8]) -> Result<()> {
            Err(crate::error::Error::storage(
                None,
                Some(key.to_string()),
                crate::error::StorageOperation::Set,
                "read-only storage",
            ))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn list_keys(&self, _prefix: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_review_recomputes_mean_rating() {
        let catalog = catalog();

        catalog.add_review("1", Some("Ana"), 5, "Great peppers").await;
        assert_eq!(catalog.product("1").unwrap().rating, 5.0);

        catalog.add_review("1", Some("Ben"), 5, "Still great").await;
        catalog.add_review("1", Some("Cleo"), 3, "A bit soft").await;

        let product = catalog.product("1").unwrap();
        // 13 / 3 rounds to one decimal
        assert_eq!(product.rating, 4.3);
        assert_eq!(product.reviews.len(), 3);
        let authors: Vec<&str> = product.reviews.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, vec!["Ana", "Ben", "Cleo"]);
    }

    #[tokio::test]
    async fn test_first_review_replaces_seed_rating() {
        let catalog = catalog();
        // Seeded headline rating is 4.5, reviews alone define the new one
        catalog.add_review("1", Some("Ana"), 5, "Great").await;
        assert_eq!(catalog.product("1").unwrap().rating, 5.0);
    }

    #[tokio::test]
    async fn test_blank_comment_is_dropped_silently() {
        let catalog = catalog();
        catalog.add_review("1", Some("Ana"), 5, "   ").await;
        catalog.add_review("1", Some("Ana"), 5, "").await;

        let product = catalog.product("1").unwrap();
        assert!(product.reviews.is_empty());
        assert_eq!(product.rating, 4.5);
    }

    #[tokio::test]
    async fn test_review_for_unknown_product_is_dropped_silently() {
        let catalog = catalog();
        catalog.add_review("999", Some("Ana"), 5, "Where is it").await;
        assert!(catalog.product("999").is_none());
        assert!(catalog.products().iter().all(|p| p.reviews.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_author_becomes_guest_user() {
        let catalog = catalog();
        catalog.add_review("1", None, 4, "Fine").await;
        catalog.add_review("1", Some("   "), 4, "Fine too").await;

        let product = catalog.product("1").unwrap();
        assert!(product.reviews.iter().all(|r| r.author == "Guest User"));
    }

    #[tokio::test]
    async fn test_toggle_favorite_round_trips() {
        let catalog = catalog();

        catalog.toggle_favorite("3").await;
        catalog.toggle_favorite("1").await;
        assert!(catalog.is_favorite("3"));
        assert_eq!(catalog.favorites(), vec!["3", "1"]);

        catalog.toggle_favorite("3").await;
        assert!(!catalog.is_favorite("3"));
        assert_eq!(catalog.favorites(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_favorites_accept_unknown_ids() {
        let catalog = catalog();
        catalog.toggle_favorite("does-not-exist").await;
        assert!(catalog.is_favorite("does-not-exist"));
        assert!(catalog.favorite_products().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_favorite_leaves_selection_alone() {
        let catalog = catalog();
        catalog.set_search_query("egg");
        let before = catalog.filtered_products();

        catalog.toggle_favorite("1").await;

        assert_eq!(catalog.selection().query, "egg");
        assert_eq!(catalog.filtered_products(), before);
    }

    #[tokio::test]
    async fn test_reset_filters_clears_every_axis() {
        let catalog = catalog();
        catalog.set_search_query("egg");
        catalog.set_category_filter(Some("Beverages".to_string()));
        catalog.toggle_sub_category("Eggs");
        catalog.toggle_brand("Cocola");
        assert!(!catalog.selection().is_empty());

        catalog.reset_filters();

        assert!(catalog.selection().is_empty());
        assert_eq!(catalog.filtered_products().len(), 28);
    }

    #[tokio::test]
    async fn test_toggling_twice_restores_the_axis() {
        let catalog = catalog();
        catalog.toggle_sub_category("Eggs");
        catalog.toggle_sub_category("Eggs");
        catalog.toggle_brand("Cocola");
        catalog.toggle_brand("Cocola");
        assert!(catalog.selection().is_empty());
    }

    #[tokio::test]
    async fn test_home_rails_slice_the_filtered_view() {
        let catalog = catalog();

        let best: Vec<String> = catalog.best_selling().into_iter().map(|p| p.id).collect();
        assert_eq!(best, vec!["1", "2", "3", "4"]);

        let exclusive: Vec<String> =
            catalog.exclusive_offers().into_iter().map(|p| p.id).collect();
        assert_eq!(exclusive, vec!["11", "12"]);

        catalog.set_search_query("juice");
        let best: Vec<String> = catalog.best_selling().into_iter().map(|p| p.id).collect();
        assert_eq!(best, vec!["7", "17"]);
        assert!(catalog.exclusive_offers().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_across_instances() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());

        let mut first = catalog().with_storage(Arc::clone(&storage));
        first.initialize().await.unwrap();
        first.add_review("1", Some("Ana"), 5, "Great").await;
        first.toggle_favorite("3").await;
        first.shutdown().await.unwrap();

        let mut second = catalog().with_storage(Arc::clone(&storage));
        second.initialize().await.unwrap();

        let product = second.product("1").unwrap();
        assert_eq!(product.reviews.len(), 1);
        assert_eq!(product.rating, 5.0);
        assert_eq!(second.favorites(), vec!["3"]);
    }

    #[tokio::test]
    async fn test_missing_snapshot_keeps_the_seed() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let mut catalog = catalog().with_storage(Arc::clone(&storage));
        catalog.initialize().await.unwrap();

        assert_eq!(catalog.products().len(), 28);
        // Restoring without mutating writes nothing back
        assert_eq!(storage.get(PRODUCT_STORE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_falls_back_to_seed() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        storage.set(PRODUCT_STORE_KEY, b"not json").await.unwrap();

        let mut catalog = catalog().with_storage(Arc::clone(&storage));
        catalog.initialize().await.unwrap();
        assert_eq!(catalog.products().len(), 28);
        assert!(catalog.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_survive_a_failing_store() {
        let catalog = catalog().with_storage(Arc::new(ReadOnlyStorage));

        catalog.add_review("1", Some("Ana"), 5, "Great").await;
        catalog.toggle_favorite("1").await;

        assert_eq!(catalog.product("1").unwrap().reviews.len(), 1);
        assert!(catalog.is_favorite("1"));
    }

    #[tokio::test]
    async fn test_review_event_reaches_subscribers() {
        let bus = Arc::new(EventBusManager::new());
        let mut receiver = bus.subscribe(crate::event::EventFilter::default());

        let catalog = catalog().with_event_bus(Arc::clone(&bus));
        catalog.add_review("1", Some("Ana"), 4, "Good").await;

        let event = receiver.next().await.unwrap();
        assert_eq!(event.event_type(), "catalog.product_reviewed");
        let reviewed = event
            .as_any()
            .downcast_ref::<ProductReviewedEvent>()
            .unwrap();
        assert_eq!(reviewed.product_id, "1");
        assert_eq!(reviewed.rating, 4.0);
        assert_eq!(reviewed.review_count, 1);
    }
}
