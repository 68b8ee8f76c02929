//! HTTP route handlers for the catalog service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health          - Health check
//! GET  /products        - Product listing
//! GET  /products/{id}   - Product record
//! GET  /stock/{id}      - Stock entry
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use rocketshoes_core::{Product, ProductId, StockEntry};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the service router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/products", get(list_products))
        .route("/products/{id}", get(show_product))
        .route("/stock/{id}", get(show_stock))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse::<ProductId>()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {raw}")))
}

/// List every product in catalog order.
#[instrument(skip(state))]
async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog().products().to_vec())
}

/// Get one product record.
#[instrument(skip(state))]
async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    state
        .catalog()
        .product(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("products/{id}")))
}

/// Get the stock entry for a product.
#[instrument(skip(state))]
async fn show_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StockEntry>> {
    let id = parse_id(&id)?;
    state
        .catalog()
        .stock(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("stock/{id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::Catalog;

    fn app() -> Router {
        let catalog = Catalog::from_json(include_str!("../data/db.json")).unwrap();
        routes().with_state(AppState::new(catalog))
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_show_product() {
        let (status, body) = get("/products/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 3);
        assert_eq!(body["title"], "Tênis Adidas Duramo Lite 2.0");
        assert_eq!(body["price"], 219.9);
        assert!(body.get("amount").is_none());
    }

    #[tokio::test]
    async fn test_show_stock() {
        let (status, body) = get("/stock/4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"id": 4, "amount": 1}));
    }

    #[tokio::test]
    async fn test_list_products() {
        let (status, body) = get("/products").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (status, _) = get("/products/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get("/stock/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let (status, _) = get("/products/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
