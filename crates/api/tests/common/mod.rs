#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use reqwest::Url;
use serde_json::Value;
use tower::ServiceExt;

use storelink_api::config::ServerConfig;
use storelink_api::router::build_app_router;
use storelink_api::state::AppState;
use storelink_db::store::MemoryStore;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const FRONTEND_URL: &str = "http://localhost:5173/";

/// Build a test `ServerConfig` with Shopify credentials and the given
/// overrides on top of the development defaults.
pub fn test_config(overrides: &[(&str, &str)]) -> ServerConfig {
    let mut vars: HashMap<String, String> = [
        ("HOST", "127.0.0.1"),
        ("PORT", "0"),
        ("SHOPIFY_CLIENT_ID", CLIENT_ID),
        ("SHOPIFY_CLIENT_SECRET", CLIENT_SECRET),
        ("FRONTEND_URL", FRONTEND_URL),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    ServerConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config should be valid")
}

/// The router plus handles on its in-memory store and state.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

/// Build the full application router with all middleware layers over a
/// fresh in-memory store.
///
/// Uses `build_app_router` so integration tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) that
/// production uses.
pub fn build_test_app(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config.clone(), store.clone()).expect("state should build");
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        store,
        state,
    }
}

/// Test app whose Shopify calls go to `api_origin` (a wiremock server).
pub fn build_test_app_with_origin(api_origin: &str) -> TestApp {
    build_test_app(test_config(&[("SHOPIFY_API_ORIGIN", api_origin)]))
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse the `Location` header of a redirect.
pub fn location(response: &Response) -> Url {
    let value = response
        .headers()
        .get(header::LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap();
    Url::parse(value).unwrap()
}

/// Query parameters of a URL as a map.
pub fn query_map(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

/// Start an authorization through the API and return the `state` embedded
/// in the returned URL.
pub async fn start_auth(app: Router, shop_domain: &str) -> String {
    let response = post_json(
        app,
        "/auth/shopify/start",
        serde_json::json!({ "shopDomain": shop_domain }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let json = body_json(response).await;
    let url = Url::parse(json["authUrl"].as_str().unwrap()).unwrap();
    query_map(&url)["state"].clone()
}
