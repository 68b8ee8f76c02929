//! In-memory catalog loaded from a JSON data file.
//!
//! The file holds two collections:
//!
//! ```json
//! { "products": [{ "id": 1, "title": "...", "price": 179.9, "image": "..." }],
//!   "stock":    [{ "id": 1, "amount": 3 }] }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rocketshoes_core::{Product, ProductId, StockEntry};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate {collection} entry for product {id}")]
    Duplicate {
        collection: &'static str,
        id: ProductId,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    stock: Vec<StockEntry>,
}

/// Product and stock lookups by id. Product listing keeps file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    product_index: HashMap<ProductId, usize>,
    stock: HashMap<ProductId, StockEntry>,
}

impl Catalog {
    /// Load the catalog from a JSON data file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// lists the same product id twice in one collection.
    pub fn from_file(path: &Path) -> Result<Self, CatalogLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid JSON or duplicate ids.
    pub fn from_json(raw: &str) -> Result<Self, CatalogLoadError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.products, file.stock)
    }

    /// Build a catalog from product records and stock entries.
    ///
    /// # Errors
    ///
    /// Returns an error if an id appears twice in either collection.
    pub fn new(products: Vec<Product>, stock: Vec<StockEntry>) -> Result<Self, CatalogLoadError> {
        let mut product_index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product_index.insert(product.id, position).is_some() {
                return Err(CatalogLoadError::Duplicate {
                    collection: "products",
                    id: product.id,
                });
            }
        }

        let mut stock_index = HashMap::with_capacity(stock.len());
        for entry in stock {
            if stock_index.insert(entry.id, entry).is_some() {
                return Err(CatalogLoadError::Duplicate {
                    collection: "stock",
                    id: entry.id,
                });
            }
        }

        Ok(Self {
            products,
            product_index,
            stock: stock_index,
        })
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.product_index
            .get(&id)
            .and_then(|&position| self.products.get(position))
    }

    #[must_use]
    pub fn stock(&self, id: ProductId) -> Option<StockEntry> {
        self.stock.get(&id).copied()
    }
}
