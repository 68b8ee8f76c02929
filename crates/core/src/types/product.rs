//! Catalog records as served by the product and stock endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product line as stored in the cart.
///
/// The catalog serves the same record without an `amount`; it deserializes
/// with `amount = 0` and the cart sets the quantity when the line is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price. Serialized as a JSON number to match the catalog format.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    pub image: String,
    /// Quantity in the cart. Omitted from catalog records.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub amount: i32,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde passes fields by reference
const fn is_zero(amount: &i32) -> bool {
    *amount == 0
}

impl Product {
    /// Return a copy of this product with the given cart quantity.
    #[must_use]
    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }
}

/// Units available for a product, as reported by the stock endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: ProductId,
    pub amount: i32,
}

impl StockEntry {
    /// Whether `requested` units can be taken from this entry.
    #[must_use]
    pub const fn covers(&self, requested: i32) -> bool {
        requested <= self.amount
    }
}
