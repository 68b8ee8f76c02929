//! The cart store: in-memory cart, local persistence, remote stock checks.
//!
//! Every operation follows the same path:
//!
//! ```text
//! caller -> operation -> (catalog fetch) -> next cart -> storage write -> subscribers
//! ```
//!
//! Operations are fire-and-forget. Failures are logged, reported through the
//! [`Notifier`] and leave the cart untouched.
//!
//! Nothing serializes concurrent operations. Each one reads the current cart,
//! awaits the catalog and then replaces the cart, so overlapping calls for the
//! same product can lose an update.

use std::sync::Arc;

use rocketshoes_core::{Cart, ProductId};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{CatalogApi, HttpCatalogClient};
use crate::config::CartConfig;
use crate::error::{CartError, Operation};
use crate::notify::{Notification, Notifier};
use crate::storage::{CartStorage, FileStorage, StorageError};

/// Arguments for [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i32,
}

/// Observable cart state shared by every UI component.
///
/// Cheaply cloneable via `Arc`; clones operate on the same cart.
pub struct CartStore<C, S, N> {
    inner: Arc<CartStoreInner<C, S, N>>,
}

struct CartStoreInner<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    storage_key: String,
    cart: watch::Sender<Cart>,
}

impl<C, S, N> Clone for CartStore<C, S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: Notifier> CartStore<HttpCatalogClient, FileStorage, N> {
    /// Build a store backed by the HTTP catalog and file storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the storage
    /// file cannot be read.
    pub fn from_config(config: &CartConfig, notifier: N) -> Result<Self, CartError> {
        let catalog = HttpCatalogClient::new(config)?;
        let storage = FileStorage::new(&config.storage_path);
        Self::init(catalog, storage, notifier, config.storage_key.clone())
    }
}

impl<C: CatalogApi, S: CartStorage, N: Notifier> CartStore<C, S, N> {
    /// Create the store, loading the cart persisted under `storage_key`.
    ///
    /// A missing or unparsable stored cart starts the store empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage backend cannot be read.
    pub fn init(
        catalog: C,
        storage: S,
        notifier: N,
        storage_key: impl Into<String>,
    ) -> Result<Self, CartError> {
        let storage_key = storage_key.into();
        let cart = load_cart(&storage, &storage_key)?;
        debug!(
            storage_key = %storage_key,
            lines = cart.len(),
            "Cart loaded from storage"
        );

        let (sender, _) = watch::channel(cart);

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                catalog,
                storage,
                notifier,
                storage_key,
                cart: sender,
            }),
        })
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.cart.borrow().clone()
    }

    /// Subscribe to cart changes. The receiver is woken after every commit.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.cart.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through
    /// [`update_product_amount`](Self::update_product_amount) with its amount
    /// plus one, so stock is checked and failures use that operation's
    /// messages. A new product is fetched from the catalog and appended with
    /// amount 1.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let existing = self
            .inner
            .cart
            .borrow()
            .find(product_id)
            .map(|product| product.amount);

        if let Some(amount) = existing {
            self.update_product_amount(UpdateProductAmount {
                product_id,
                amount: amount.saturating_add(1),
            })
            .await;
            return;
        }

        if let Err(err) = self.try_add_product(product_id).await {
            self.report(Operation::Add, &err);
        }
    }

    /// Remove a product line from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) {
        if let Err(err) = self.try_remove_product(product_id) {
            self.report(Operation::Remove, &err);
        }
    }

    /// Set a product line's amount after checking remote stock.
    ///
    /// Non-positive amounts are ignored without a notification.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(&self, update: UpdateProductAmount) {
        let UpdateProductAmount { product_id, amount } = update;

        // FIXME: a non-positive amount arguably means "remove"; kept as a silent no-op for now
        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return;
        }

        if let Err(err) = self.try_update_product_amount(product_id, amount).await {
            self.report(Operation::Update, &err);
        }
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let product = self.inner.catalog.get_product(product_id).await?;

        let updated = self.inner.cart.borrow().with_added(product)?;
        self.commit(updated)?;

        info!("Product added to cart");
        Ok(())
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let updated = self
            .inner
            .cart
            .borrow()
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        self.commit(updated)?;

        info!("Product removed from cart");
        Ok(())
    }

    async fn try_update_product_amount(
        &self,
        product_id: ProductId,
        amount: i32,
    ) -> Result<(), CartError> {
        if !self.inner.cart.borrow().contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let stock = self.inner.catalog.get_stock(product_id).await?;
        if !stock.covers(amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        // Re-read: the line may have been removed while the stock request was in flight
        let updated = self
            .inner
            .cart
            .borrow()
            .with_amount(product_id, amount)
            .ok_or(CartError::NotInCart(product_id))?;
        self.commit(updated)?;

        info!("Product amount updated");
        Ok(())
    }

    /// Persist `cart` and publish it to subscribers.
    ///
    /// Storage is written first; if that fails the in-memory cart is unchanged.
    fn commit(&self, cart: Cart) -> Result<(), CartError> {
        let encoded = serde_json::to_string(&cart)?;
        self.inner
            .storage
            .set_item(&self.inner.storage_key, &encoded)?;

        debug!(lines = cart.len(), items = cart.total_items(), "Cart committed");
        self.inner.cart.send_replace(cart);
        Ok(())
    }

    fn report(&self, operation: Operation, err: &CartError) {
        warn!(operation = %operation, error = %err, "Cart operation failed");
        self.inner
            .notifier
            .notify(Notification::new(err.notification_message(operation)));
    }
}

/// Read the persisted cart, falling back to an empty one if absent or unparsable.
fn load_cart<S: CartStorage>(storage: &S, key: &str) -> Result<Cart, CartError> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(Cart::new()),
        Err(StorageError::Corrupt { path, source }) => {
            warn!(
                path = %path.display(),
                error = %source,
                "Storage file is corrupt, starting with an empty cart"
            );
            return Ok(Cart::new());
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => Ok(cart),
        Err(e) => {
            warn!(
                storage_key = %key,
                error = %e,
                "Stored cart is unparsable, starting with an empty cart"
            );
            Ok(Cart::new())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use rocketshoes_core::{Product, StockEntry};
    use rust_decimal::Decimal;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::catalog::ApiError;
    use crate::error::messages;
    use crate::notify::{ChannelNotifier, LogNotifier};
    use crate::storage::MemoryStorage;

    const KEY: &str = "@RocketShoes:cart";

    // =========================================================================
    // Fakes
    // =========================================================================

    #[derive(Default)]
    struct FakeCatalog {
        products: HashMap<ProductId, Product>,
        stock: HashMap<ProductId, i32>,
        unavailable: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn with_product(mut self, id: i32, stock: i32) -> Self {
            let id = ProductId::new(id);
            self.products.insert(id, product(id.as_i32(), 0));
            self.stock.insert(id, stock);
            self
        }

        fn unavailable(mut self) -> Self {
            self.unavailable = true;
            self
        }

        fn check(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.unavailable {
                return Err(ApiError::Api {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    impl CatalogApi for FakeCatalog {
        async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
            self.check(format!("products/{id}"))?;
            self.products
                .get(&id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("products/{id}")))
        }

        async fn get_stock(&self, id: ProductId) -> Result<StockEntry, ApiError> {
            self.check(format!("stock/{id}"))?;
            self.stock
                .get(&id)
                .map(|&amount| StockEntry { id, amount })
                .ok_or_else(|| ApiError::NotFound(format!("stock/{id}")))
        }
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStorage(MemoryStorage);

    impl CartStorage for ReadOnlyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get_item(key)
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "quota exceeded"),
            })
        }
    }

    fn product(id: i32, amount: i32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Tênis {id}"),
            price: Decimal::new(17990, 2),
            image: format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/{id}.jpg"),
            amount,
        }
    }

    fn stored(lines: &[(i32, i32)]) -> MemoryStorage {
        let items: Vec<Product> = lines.iter().map(|&(id, amount)| product(id, amount)).collect();
        MemoryStorage::with_item(KEY, serde_json::to_string(&items).unwrap())
    }

    fn store_with(
        catalog: FakeCatalog,
        storage: MemoryStorage,
    ) -> (
        CartStore<FakeCatalog, MemoryStorage, ChannelNotifier>,
        UnboundedReceiver<Notification>,
    ) {
        let (notifier, rx) = ChannelNotifier::channel();
        let store = CartStore::init(catalog, storage, notifier, KEY).unwrap();
        (store, rx)
    }

    fn amounts(cart: &Cart) -> Vec<(i32, i32)> {
        cart.iter().map(|p| (p.id.as_i32(), p.amount)).collect()
    }

    fn persisted(storage: &MemoryStorage) -> Cart {
        serde_json::from_str(&storage.get_item(KEY).unwrap().unwrap()).unwrap()
    }

    fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(notification) = rx.try_recv() {
            messages.push(notification.message);
        }
        messages
    }

    // =========================================================================
    // Init
    // =========================================================================

    #[test]
    fn test_init_without_stored_cart_is_empty() {
        let (store, _rx) = store_with(FakeCatalog::default(), MemoryStorage::new());
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_init_loads_stored_cart_in_order() {
        let (store, _rx) = store_with(FakeCatalog::default(), stored(&[(3, 1), (1, 2)]));
        assert_eq!(amounts(&store.cart()), vec![(3, 1), (1, 2)]);
    }

    #[test]
    fn test_init_with_unparsable_cart_is_empty() {
        let storage = MemoryStorage::with_item(KEY, "{not json");
        let (store, _rx) = store_with(FakeCatalog::default(), storage);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_init_with_duplicate_lines_is_empty() {
        let raw = serde_json::to_string(&vec![product(1, 1), product(1, 2)]).unwrap();
        let (store, _rx) = store_with(FakeCatalog::default(), MemoryStorage::with_item(KEY, raw));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_storage_file_starts_empty_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"@RocketShoes:cart": [ {"id":1} ]}"#).unwrap();

        let (notifier, mut rx) = ChannelNotifier::channel();
        let catalog = FakeCatalog::default().with_product(1, 3);
        let store = CartStore::init(catalog, FileStorage::new(&path), notifier, KEY).unwrap();
        assert!(store.cart().is_empty());

        store.add_product(ProductId::new(1)).await;

        assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
        assert!(drain(&mut rx).is_empty());
        let raw = FileStorage::new(&path).get_item(KEY).unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Cart>(&raw).unwrap(), store.cart());
    }

    #[test]
    fn test_unreadable_storage_fails_init() {
        struct BrokenStorage;

        impl CartStorage for BrokenStorage {
            fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
                Err(StorageError::Io {
                    path: "broken".into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                })
            }

            fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let (notifier, _rx) = ChannelNotifier::channel();
        let result = CartStore::init(FakeCatalog::default(), BrokenStorage, notifier, KEY);
        assert!(matches!(result, Err(CartError::Storage(_))));
    }

    // =========================================================================
    // add_product
    // =========================================================================

    #[tokio::test]
    async fn test_add_new_product_appends_with_amount_one() {
        let storage = MemoryStorage::new();
        let (store, mut rx) = store_with(FakeCatalog::default().with_product(2, 3), storage.clone());

        store.add_product(ProductId::new(2)).await;

        assert_eq!(amounts(&store.cart()), vec![(2, 1)]);
        assert_eq!(persisted(&storage), store.cart());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_within_stock() {
        let catalog = FakeCatalog::default().with_product(1, 5);
        let storage = stored(&[(1, 2)]);
        let (store, mut rx) = store_with(catalog, storage.clone());

        store.add_product(ProductId::new(1)).await;

        assert_eq!(amounts(&store.cart()), vec![(1, 3)]);
        assert_eq!(persisted(&storage), store.cart());
        assert!(drain(&mut rx).is_empty());
        // Existing lines are never re-fetched from the catalog
        assert_eq!(
            *store.inner.catalog.calls.lock().unwrap(),
            vec!["stock/1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_add_existing_product_beyond_stock_reports_out_of_stock() {
        let (store, mut rx) = store_with(
            FakeCatalog::default().with_product(1, 2),
            stored(&[(1, 2)]),
        );

        store.add_product(ProductId::new(1)).await;

        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
        assert_eq!(drain(&mut rx), vec![messages::OUT_OF_STOCK]);
    }

    #[tokio::test]
    async fn test_add_unknown_product_reports_addition_error() {
        let storage = MemoryStorage::new();
        let (store, mut rx) = store_with(FakeCatalog::default(), storage.clone());

        store.add_product(ProductId::new(99)).await;

        assert!(store.cart().is_empty());
        assert!(storage.get_item(KEY).unwrap().is_none());
        assert_eq!(drain(&mut rx), vec![messages::ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_add_with_catalog_down_reports_addition_error() {
        let (store, mut rx) = store_with(
            FakeCatalog::default().with_product(1, 5).unavailable(),
            MemoryStorage::new(),
        );

        store.add_product(ProductId::new(1)).await;

        assert!(store.cart().is_empty());
        assert_eq!(drain(&mut rx), vec![messages::ADD_FAILED]);
    }

    // =========================================================================
    // remove_product
    // =========================================================================

    #[test]
    fn test_remove_present_product() {
        let storage = stored(&[(1, 1), (2, 3), (3, 1)]);
        let (store, mut rx) = store_with(FakeCatalog::default(), storage.clone());

        store.remove_product(ProductId::new(2));

        assert_eq!(amounts(&store.cart()), vec![(1, 1), (3, 1)]);
        assert_eq!(persisted(&storage), store.cart());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_log_notifier_store_reports_without_touching_cart() {
        let storage = stored(&[(1, 2)]);
        let store =
            CartStore::init(FakeCatalog::default(), storage.clone(), LogNotifier, KEY).unwrap();

        store.remove_product(ProductId::new(9));

        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
        assert_eq!(persisted(&storage), store.cart());
    }

    #[test]
    fn test_remove_absent_product_reports_removal_error() {
        let storage = stored(&[(1, 1)]);
        let before = storage.get_item(KEY).unwrap();
        let (store, mut rx) = store_with(FakeCatalog::default(), storage.clone());

        store.remove_product(ProductId::new(2));

        assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
        assert_eq!(storage.get_item(KEY).unwrap(), before);
        assert_eq!(drain(&mut rx), vec![messages::REMOVE_FAILED]);
    }

    // =========================================================================
    // update_product_amount
    // =========================================================================

    #[tokio::test]
    async fn test_update_up_to_stock_succeeds_and_beyond_fails() {
        let storage = stored(&[(1, 2)]);
        let (store, mut rx) = store_with(FakeCatalog::default().with_product(1, 5), storage.clone());

        store
            .update_product_amount(UpdateProductAmount {
                product_id: ProductId::new(1),
                amount: 5,
            })
            .await;
        assert_eq!(amounts(&store.cart()), vec![(1, 5)]);
        assert!(drain(&mut rx).is_empty());

        store
            .update_product_amount(UpdateProductAmount {
                product_id: ProductId::new(1),
                amount: 6,
            })
            .await;
        assert_eq!(amounts(&store.cart()), vec![(1, 5)]);
        assert_eq!(amounts(&persisted(&storage)), vec![(1, 5)]);
        assert_eq!(drain(&mut rx), vec![messages::OUT_OF_STOCK]);
    }

    #[tokio::test]
    async fn test_update_preserves_line_order() {
        let catalog = FakeCatalog::default().with_product(2, 10);
        let (store, _rx) = store_with(catalog, stored(&[(1, 1), (2, 1), (3, 1)]));

        store
            .update_product_amount(UpdateProductAmount {
                product_id: ProductId::new(2),
                amount: 4,
            })
            .await;

        assert_eq!(amounts(&store.cart()), vec![(1, 1), (2, 4), (3, 1)]);
    }

    #[tokio::test]
    async fn test_update_non_positive_amount_is_silent_noop() {
        let (store, mut rx) = store_with(FakeCatalog::default().with_product(1, 5), stored(&[(1, 2)]));

        for amount in [0, -1, i32::MIN] {
            store
                .update_product_amount(UpdateProductAmount {
                    product_id: ProductId::new(1),
                    amount,
                })
                .await;
        }

        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
        assert!(drain(&mut rx).is_empty());
        assert!(store.inner.catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_absent_product_reports_update_error() {
        let (store, mut rx) = store_with(FakeCatalog::default().with_product(4, 5), stored(&[(1, 2)]));

        store
            .update_product_amount(UpdateProductAmount {
                product_id: ProductId::new(4),
                amount: 1,
            })
            .await;

        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
        assert_eq!(drain(&mut rx), vec![messages::UPDATE_FAILED]);
        // No stock lookup for a product that is not in the cart
        assert!(store.inner.catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_stock_api_down_reports_update_error() {
        let (store, mut rx) = store_with(
            FakeCatalog::default().with_product(1, 5).unavailable(),
            stored(&[(1, 2)]),
        );

        store
            .update_product_amount(UpdateProductAmount {
                product_id: ProductId::new(1),
                amount: 3,
            })
            .await;

        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
        assert_eq!(drain(&mut rx), vec![messages::UPDATE_FAILED]);
    }

    // =========================================================================
    // Commit
    // =========================================================================

    #[tokio::test]
    async fn test_failed_storage_write_leaves_cart_unchanged() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        let store = CartStore::init(
            FakeCatalog::default().with_product(1, 5),
            ReadOnlyStorage(MemoryStorage::new()),
            notifier,
            KEY,
        )
        .unwrap();

        store.add_product(ProductId::new(1)).await;

        assert!(store.cart().is_empty());
        assert_eq!(drain(&mut rx), vec![messages::ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_commit() {
        let (store, _rx) = store_with(FakeCatalog::default().with_product(1, 5), MemoryStorage::new());
        let mut updates = store.subscribe();

        store.add_product(ProductId::new(1)).await;
        assert!(updates.has_changed().unwrap());
        assert_eq!(amounts(&updates.borrow_and_update()), vec![(1, 1)]);

        store.remove_product(ProductId::new(1));
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_failed_operation_does_not_wake_subscribers() {
        let (store, _rx) = store_with(FakeCatalog::default(), MemoryStorage::new());
        let mut updates = store.subscribe();

        store.add_product(ProductId::new(1)).await;
        store.remove_product(ProductId::new(1));

        assert!(!updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (store, _rx) = store_with(FakeCatalog::default().with_product(1, 5), MemoryStorage::new());
        let other = store.clone();

        other.add_product(ProductId::new(1)).await;

        assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
    }
}
