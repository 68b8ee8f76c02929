//! Remote product catalog and stock lookups.
//!
//! # Endpoints
//!
//! ```text
//! GET products/{id}  - Product record (id, title, price, image)
//! GET stock/{id}     - Stock entry (id, amount)
//! ```
//!
//! Product records are cached in-memory via `moka`. Stock is always read
//! from the API.

mod client;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, StockEntry};
use thiserror::Error;

pub use client::HttpCatalogClient;

/// Errors that can occur when calling the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured API token cannot be sent as a header.
    #[error("Invalid API token format: {0}")]
    InvalidToken(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API answered with a record for a different product.
    #[error("Requested product {requested}, API returned {returned}")]
    IdMismatch {
        requested: ProductId,
        returned: ProductId,
    },
}

/// Source of product records and stock levels.
pub trait CatalogApi: Send + Sync + 'static {
    /// Fetch a product record by id.
    fn get_product(&self, id: ProductId) -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// Fetch the current stock level for a product.
    fn get_stock(&self, id: ProductId) -> impl Future<Output = Result<StockEntry, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("products/7".to_string());
        assert_eq!(err.to_string(), "Not found: products/7");

        let err = ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
