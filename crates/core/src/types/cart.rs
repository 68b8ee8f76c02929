//! The shopper's cart as an ordered, id-unique list of product lines.
//!
//! All transitions are pure: they return a new `Cart` and leave the original
//! untouched, so a store can compute the next state before committing it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::product::Product;

/// A cart that violates its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCart {
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    #[error("product {0} has a non-positive amount")]
    NonPositiveAmount(ProductId),
}

/// Ordered cart lines, insertion order = add order.
///
/// At most one line exists per product id and every amount is positive.
/// Serializes as a plain JSON array of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn find(&self, product_id: ProductId) -> Option<&Product> {
        self.items.iter().find(|product| product.id == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find(product_id).is_some()
    }

    /// Sum of all line amounts (the cart badge count).
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|product| i64::from(product.amount)).sum()
    }

    /// Append a new line for `product` with amount 1.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCart::DuplicateProduct` if the product is already in the cart.
    pub fn with_added(&self, product: Product) -> Result<Self, InvalidCart> {
        if self.contains(product.id) {
            return Err(InvalidCart::DuplicateProduct(product.id));
        }

        let mut items = self.items.clone();
        items.push(product.with_amount(1));
        Ok(Self { items })
    }

    /// Drop the line for a product. Returns `None` if it is not in the cart.
    #[must_use]
    pub fn without(&self, product_id: ProductId) -> Option<Self> {
        if !self.contains(product_id) {
            return None;
        }

        Some(Self {
            items: self
                .items
                .iter()
                .filter(|product| product.id != product_id)
                .cloned()
                .collect(),
        })
    }

    /// Replace a line's amount in place, preserving order.
    ///
    /// Returns `None` if the product is not in the cart. Callers are expected
    /// to pass a positive amount.
    #[must_use]
    pub fn with_amount(&self, product_id: ProductId, amount: i32) -> Option<Self> {
        if !self.contains(product_id) {
            return None;
        }

        Some(Self {
            items: self
                .items
                .iter()
                .map(|product| {
                    if product.id == product_id {
                        product.clone().with_amount(amount)
                    } else {
                        product.clone()
                    }
                })
                .collect(),
        })
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<Product>) -> Result<Self, Self::Error> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        for product in &items {
            if !seen.insert(product.id) {
                return Err(InvalidCart::DuplicateProduct(product.id));
            }
            if product.amount <= 0 {
                return Err(InvalidCart::NonPositiveAmount(product.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
