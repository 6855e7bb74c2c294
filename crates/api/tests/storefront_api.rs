//! Integration tests for the proxied storefront reads.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app_with_origin, get, TestApp};
use serde_json::json;
use storelink_core::onboarding::Platform;
use storelink_db::models::merchant::UpsertMerchant;
use storelink_db::store::OnboardingStore;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SHOP: &str = "mystore.myshopify.com";
const TOKEN: &str = "tok-proxy";

async fn connect_merchant(app: &TestApp) {
    app.store
        .upsert_merchant(&UpsertMerchant {
            shop_domain: SHOP.to_string(),
            platform: Platform::Shopify,
            access_token: TOKEN.to_string(),
            scope: "read_products".to_string(),
        })
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test: products are proxied with the stored token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn products_are_proxied_with_stored_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/products.json"))
        .and(header("X-Shopify-Access-Token", TOKEN))
        .and(query_param("limit", "50"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "products": [{ "id": 1 }] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());
    connect_merchant(&app).await;

    let response = get(app.router, "/api/shopify/mystore/products").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "products": [{ "id": 1 }] }));
}

#[tokio::test]
async fn product_limit_is_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/products.json"))
        .and(query_param("limit", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .expect(1)
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());
    connect_merchant(&app).await;

    let response = get(app.router, &format!("/api/shopify/{SHOP}/products?limit=1000")).await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: shop metadata
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shop_is_proxied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/shop.json"))
        .and(header("X-Shopify-Access-Token", TOKEN))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "shop": { "name": "My Store" } })),
        )
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());
    connect_merchant(&app).await;

    let response = get(app.router, &format!("/api/shopify/{SHOP}/shop")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["shop"]["name"], "My Store");
}

// ---------------------------------------------------------------------------
// Test: error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_merchant_is_not_connected() {
    let server = MockServer::start().await;
    let app = build_test_app_with_origin(&server.uri());

    let response = get(app.router, &format!("/api/shopify/{SHOP}/products")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Not connected");
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unsupported_provider_is_rejected() {
    let server = MockServer::start().await;
    let app = build_test_app_with_origin(&server.uri());
    connect_merchant(&app).await;

    let response = get(app.router, &format!("/api/woocommerce/{SHOP}/shop")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Unsupported provider"));
}

#[tokio::test]
async fn upstream_status_passes_through_with_generic_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/shop.json"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "errors": "[API] Invalid token" })),
        )
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());
    connect_merchant(&app).await;

    let response = get(app.router, &format!("/api/shopify/{SHOP}/shop")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(!json.to_string().contains("Invalid token"));
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    // Nothing listens on the discard port.
    let app = build_test_app_with_origin("http://127.0.0.1:9");
    connect_merchant(&app).await;

    let response = get(app.router, &format!("/api/shopify/{SHOP}/shop")).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");
}
