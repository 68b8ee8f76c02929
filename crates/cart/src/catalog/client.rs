//! HTTP implementation of [`CatalogApi`] using `reqwest`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, StockEntry};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, CatalogApi};
use crate::config::CartConfig;

/// Maximum number of cached product records.
const CACHE_CAPACITY: u64 = 1000;

/// Client for the catalog/stock REST API.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalogClient {
    inner: Arc<HttpCatalogClientInner>,
}

struct HttpCatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, Product>>,
}

impl HttpCatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CartConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let products = config.catalog_cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(HttpCatalogClientInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
                products,
            }),
        })
    }

    /// The API base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET a path relative to the base URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl CatalogApi for HttpCatalogClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{id}")).await?;
        if product.id != id {
            return Err(ApiError::IdMismatch {
                requested: id,
                returned: product.id,
            });
        }

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_stock(&self, id: ProductId) -> Result<StockEntry, ApiError> {
        let stock: StockEntry = self.get_json(&format!("stock/{id}")).await?;
        if stock.id != id {
            return Err(ApiError::IdMismatch {
                requested: id,
                returned: stock.id,
            });
        }

        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }
}
