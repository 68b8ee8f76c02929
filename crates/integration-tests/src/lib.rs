//! Integration tests for RocketShoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! The tests need no external services: [`TestContext`] starts the catalog
//! service on an ephemeral local port and points a cart store at it, with
//! file storage in a temporary directory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::PathBuf;

use rocketshoes_api::{AppState, Catalog};
use rocketshoes_cart::{CartConfig, CartStore, ChannelNotifier, FileStorage, HttpCatalogClient, Notification};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Catalog data shared by the tests.
pub const TEST_CATALOG: &str = r#"{
  "products": [
    { "id": 1, "title": "Tênis de Caminhada Leve Confortável", "price": 179.9, "image": "https://example.com/tenis1.jpg" },
    { "id": 2, "title": "Tênis VR Caminhada Confortável Detalhes Couro Masculino", "price": 139.9, "image": "https://example.com/tenis2.jpg" },
    { "id": 3, "title": "Tênis Adidas Duramo Lite 2.0", "price": 219.9, "image": "https://example.com/tenis3.jpg" }
  ],
  "stock": [
    { "id": 1, "amount": 5 },
    { "id": 2, "amount": 2 },
    { "id": 3, "amount": 1 }
  ]
}"#;

/// The cart store type used in integration tests.
pub type TestStore = CartStore<HttpCatalogClient, FileStorage, ChannelNotifier>;

/// A running catalog service plus a scratch directory for cart storage.
pub struct TestContext {
    pub addr: SocketAddr,
    pub dir: TempDir,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start the catalog service with [`TEST_CATALOG`].
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be started.
    pub async fn new() -> Self {
        Self::with_catalog(TEST_CATALOG).await
    }

    /// Start the catalog service with the given catalog JSON.
    ///
    /// # Panics
    ///
    /// Panics if the catalog is invalid or the service cannot be started.
    pub async fn with_catalog(catalog_json: &str) -> Self {
        let catalog = Catalog::from_json(catalog_json).expect("invalid test catalog");
        let app = rocketshoes_api::routes().with_state(AppState::new(catalog));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        Self {
            addr,
            dir: tempfile::tempdir().expect("failed to create temp dir"),
            server,
        }
    }

    /// Base URL of the running service.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Path of the cart storage file.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    /// Cart configuration pointing at the running service.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration is rejected.
    #[must_use]
    pub fn config(&self) -> CartConfig {
        let base_url = self.base_url();
        let storage_path = self.storage_path().display().to_string();
        CartConfig::from_lookup(|key| match key {
            "ROCKETSHOES_API_URL" => Some(base_url.clone()),
            "ROCKETSHOES_STORAGE_PATH" => Some(storage_path.clone()),
            _ => None,
        })
        .expect("invalid test configuration")
    }

    /// Open a cart store against the running service.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be opened.
    #[must_use]
    pub fn open_store(&self) -> (TestStore, UnboundedReceiver<Notification>) {
        let (notifier, rx) = ChannelNotifier::channel();
        let store = CartStore::from_config(&self.config(), notifier).expect("failed to open store");
        (store, rx)
    }

    /// Open a cart store that shares this context's storage file but talks
    /// to an address where nothing is listening.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be opened.
    pub async fn open_store_with_api_down(&self) -> (TestStore, UnboundedReceiver<Notification>) {
        let base_url = unreachable_base_url().await;
        let storage_path = self.storage_path().display().to_string();
        let config = CartConfig::from_lookup(|key| match key {
            "ROCKETSHOES_API_URL" => Some(base_url.clone()),
            "ROCKETSHOES_STORAGE_PATH" => Some(storage_path.clone()),
            _ => None,
        })
        .expect("invalid test configuration");

        let (notifier, rx) = ChannelNotifier::channel();
        let store = CartStore::from_config(&config, notifier).expect("failed to open store");
        (store, rx)
    }
}

/// A local base URL whose port was just released, so connections are refused.
async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind probe listener");
    let addr = listener.local_addr().expect("listener has no address");
    drop(listener);
    format!("http://{addr}/")
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Collect every pending notification message.
pub fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        messages.push(notification.message);
    }
    messages
}
