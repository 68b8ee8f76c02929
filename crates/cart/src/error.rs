//! Cart operation errors and their user-facing messages.
//!
//! Errors never reach the caller of a cart operation. The store converts each
//! one into a notification using [`CartError::notification_message`].

use rocketshoes_core::{InvalidCart, ProductId};
use thiserror::Error;

use crate::catalog::ApiError;
use crate::storage::StorageError;

/// User-facing notification texts, in the storefront's display language.
pub mod messages {
    /// Adding a product failed (catalog unreachable, unknown product, ...).
    pub const ADD_FAILED: &str = "Erro na adição do produto";
    /// Removing a product that is not in the cart.
    pub const REMOVE_FAILED: &str = "Erro na remoção do produto";
    /// Changing the quantity of a product failed.
    pub const UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";
    /// The requested quantity exceeds the units in stock.
    pub const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";
}

/// The cart operation an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    /// Generic failure message for this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => messages::ADD_FAILED,
            Self::Remove => messages::REMOVE_FAILED,
            Self::Update => messages::UPDATE_FAILED,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Errors raised while executing a cart operation.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product or stock lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] ApiError),

    /// Reading or writing the persisted cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded for storage.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The operation targets a product that is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The requested quantity exceeds the units in stock.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    /// The transition would break the cart's invariants.
    #[error("Invalid cart: {0}")]
    InvalidCart(#[from] InvalidCart),
}

impl CartError {
    /// The notification shown to the shopper when `operation` fails with this error.
    #[must_use]
    pub fn notification_message(&self, operation: Operation) -> &'static str {
        match self {
            Self::OutOfStock { .. } => messages::OUT_OF_STOCK,
            _ => operation.failure_message(),
        }
    }
}
