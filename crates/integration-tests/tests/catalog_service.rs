//! Catalog service tests over a real socket.

use rocketshoes_integration_tests::TestContext;

#[tokio::test]
async fn test_service_serves_products_and_stock() {
    let ctx = TestContext::new().await;
    let client = reqwest::Client::new();

    let product: serde_json::Value = client
        .get(format!("{}products/1", ctx.base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["title"], "Tênis de Caminhada Leve Confortável");
    assert_eq!(product["price"], 179.9);

    let stock: serde_json::Value = client
        .get(format!("{}stock/2", ctx.base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stock, serde_json::json!({"id": 2, "amount": 2}));
}

#[tokio::test]
async fn test_service_unknown_ids_are_not_found() {
    let ctx = TestContext::new().await;
    let client = reqwest::Client::new();

    for path in ["products/99", "stock/99"] {
        let response = client
            .get(format!("{}{path}", ctx.base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let body = reqwest::get(format!("{}health", ctx.base_url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}
