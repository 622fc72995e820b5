//! Integration tests for the product catalog routes.

use axum::http::{Method, StatusCode};
use serde_json::json;

use orchard_integration_tests::TestApp;

async fn logged_in_app() -> TestApp {
    let mut app = TestApp::new();
    app.login().await;
    app
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_listing_defaults_to_newest_first() {
    let mut app = logged_in_app().await;

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);

    let products = response.json();
    let names: Vec<&str> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Banana", "Apple"]);
}

#[tokio::test]
async fn test_listing_sorted_by_name() {
    let mut app = logged_in_app().await;

    let products = app.get("/?sort=name_asc").await.json();
    let names: Vec<&str> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Apple", "Banana"]);
}

#[tokio::test]
async fn test_listing_unknown_sort_falls_back_to_default() {
    let mut app = logged_in_app().await;

    let response = app.get("/?sort=sideways").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_listing_search_filter() {
    let mut app = logged_in_app().await;

    let products = app.get("/?search=ban").await.json();
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Banana");

    let empty = app.get("/?search=durian").await.json();
    assert!(empty.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_prices_serialize_as_decimal_strings() {
    let mut app = logged_in_app().await;

    let products = app.get("/?sort=price_desc").await.json();
    assert_eq!(products[0]["price"], "10");
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn test_detail_roundtrip() {
    let mut app = logged_in_app().await;

    let products = app.get("/").await.json();
    let id = products[0]["id"].as_str().unwrap().to_owned();

    let response = app.get(&format!("/details/{id}")).await;
    let product: orchard_core::Product = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(product.id.as_str(), id);
    assert_eq!(product.name, "Banana");
    assert_eq!(product.price, orchard_core::Price::from(8));
}

#[tokio::test]
async fn test_detail_missing_product_is_404() {
    let mut app = logged_in_app().await;

    let response = app.get("/details/no-such-id").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Create / Update / Delete
// ============================================================================

#[tokio::test]
async fn test_create_product_assigns_server_side_id() {
    let mut app = logged_in_app().await;

    let response = app
        .send_json(
            Method::POST,
            "/products",
            &json!({
                "name": "Cherry",
                "price": "3.50",
                "image": "https://images.orchard.dev/cherry.jpg",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let created = response.json();
    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(created["price"], "3.50");

    let fetched = app.get(&format!("/details/{id}")).await.json();
    assert_eq!(fetched["name"], "Cherry");
}

#[tokio::test]
async fn test_create_rejects_invalid_submission() {
    let mut app = logged_in_app().await;

    let response = app
        .send_json(
            Method::POST,
            "/products",
            &json!({
                "name": "   ",
                "price": "3.50",
                "image": "https://images.orchard.dev/cherry.jpg",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .send_json(
            Method::POST,
            "/products",
            &json!({
                "name": "Cherry",
                "price": "-1",
                "image": "https://images.orchard.dev/cherry.jpg",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_merges_partial_payload() {
    let mut app = logged_in_app().await;

    let products = app.get("/?search=apple").await.json();
    let id = products[0]["id"].as_str().unwrap().to_owned();

    let response = app
        .send_json(
            Method::PUT,
            &format!("/products/{id}"),
            &json!({ "price": "12.00" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let updated = response.json();
    assert_eq!(updated["name"], "Apple");
    assert_eq!(updated["price"], "12.00");
    assert!(updated["updated_at"].is_string());
}

#[tokio::test]
async fn test_update_missing_product_is_404() {
    let mut app = logged_in_app().await;

    let response = app
        .send_json(Method::PUT, "/products/no-such-id", &json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let mut app = logged_in_app().await;

    let products = app.get("/?search=apple").await.json();
    let id = products[0]["id"].as_str().unwrap().to_owned();

    let response = app.delete(&format!("/products/{id}")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.get(&format!("/details/{id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_product_is_404_not_silent() {
    let mut app = logged_in_app().await;

    let response = app.delete("/products/no-such-id").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_summary() {
    let mut app = logged_in_app().await;

    let products = app.get("/?search=apple").await.json();
    let id = products[0]["id"].as_str().unwrap().to_owned();

    let summary = app.get(&format!("/checkout/{id}")).await.json();
    assert_eq!(summary["product"]["name"], "Apple");
    assert_eq!(summary["total"], "10");
    assert_eq!(summary["buyer_email"], "buyer@example.com");
}

#[tokio::test]
async fn test_checkout_missing_product_is_404() {
    let mut app = logged_in_app().await;

    let response = app.get("/checkout/no-such-id").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
