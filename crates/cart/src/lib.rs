//! RocketShoes cart store.
//!
//! Holds the shopper's cart in memory, mirrors it to a local key-value store
//! after every change and validates quantities against the remote stock API.
//!
//! # Architecture
//!
//! [`CartStore`] is generic over three seams:
//! - [`CatalogApi`] - product and stock lookups ([`HttpCatalogClient`] in production)
//! - [`CartStorage`] - synchronous key-value persistence ([`FileStorage`], [`MemoryStorage`])
//! - [`Notifier`] - user-facing error messages ([`LogNotifier`], [`ChannelNotifier`])
//!
//! Operations never return errors to the caller. Failures are logged and
//! surfaced as notifications, and the cart is left unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, CartStore, LogNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::from_config(&config, LogNotifier)?;
//!
//! let mut updates = store.subscribe();
//! store.add_product(ProductId::new(1)).await;
//! updates.changed().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use catalog::{ApiError, CatalogApi, HttpCatalogClient};
pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Operation, messages};
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, UpdateProductAmount};
