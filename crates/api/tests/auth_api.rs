//! HTTP-level integration tests for the OAuth endpoints.
//!
//! Tests cover starting an authorization, every callback outcome, the
//! connection status endpoint and provider validation. Shopify is replaced
//! by a wiremock server.

mod common;

use std::collections::BTreeMap;
use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with_origin, get, location, post_json, query_map,
    start_auth, test_config, CLIENT_ID, CLIENT_SECRET,
};
use serde_json::json;
use storelink_core::oauth::sign_callback_params;
use storelink_core::onboarding::{Platform, SessionStatus};
use storelink_db::models::merchant::UpsertMerchant;
use storelink_db::store::OnboardingStore;
use wiremock::matchers::{body_json as body_matches, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SHOP: &str = "mystore.myshopify.com";

/// Mount the token endpoint and the two verifier endpoints.
async fn mock_shopify(server: &MockServer, token: &str, product_count: u64) {
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": token, "scope": "read_products" })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/shop.json"))
        .and(header("X-Shopify-Access-Token", token))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "shop": { "name": "My Store" } })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/products/count.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": product_count })))
        .mount(server)
        .await;
}

fn callback_uri(params: &BTreeMap<String, String>) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("/auth/shopify/callback?{query}")
}

fn callback_params(code: &str, state: &str, shop: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("code".to_string(), code.to_string()),
        ("state".to_string(), state.to_string()),
        ("shop".to_string(), shop.to_string()),
        ("timestamp".to_string(), "1700000000".to_string()),
    ])
}

// ---------------------------------------------------------------------------
// Test: start normalizes the domain and embeds client id, scope and state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_returns_authorize_url_for_normalized_shop() {
    let app = build_test_app(test_config(&[]));

    let response = post_json(
        app.router,
        "/auth/shopify/start",
        json!({ "shopDomain": "mystore.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let url = reqwest::Url::parse(json["authUrl"].as_str().unwrap()).unwrap();
    assert_eq!(url.host_str(), Some(SHOP));
    assert_eq!(url.path(), "/admin/oauth/authorize");

    let query = query_map(&url);
    assert_eq!(query["client_id"], CLIENT_ID);
    assert!(query["scope"].split(',').any(|s| s == "read_products"));
    assert!(query["state"].len() >= 32);
    assert!(query["state"].chars().all(|c| c.is_ascii_hexdigit()));

    let session = app
        .store
        .find_session_by_state(&query["state"])
        .await
        .unwrap()
        .expect("session should exist for the state");
    assert_eq!(session.status, SessionStatus::InProgress);
    assert_eq!(session.shop_domain.as_deref(), Some(SHOP));
}

// ---------------------------------------------------------------------------
// Test: start validation and configuration errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_requires_shop_domain() {
    let app = build_test_app(test_config(&[]));

    let response = post_json(app.router, "/auth/shopify/start", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.session_count(), 0);
}

#[tokio::test]
async fn start_rejects_invalid_domain() {
    let app = build_test_app(test_config(&[]));

    let response = post_json(
        app.router,
        "/auth/shopify/start",
        json!({ "shopDomain": "my_store!" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_DOMAIN");
    assert_eq!(app.store.session_count(), 0);
}

#[tokio::test]
async fn start_without_client_id_is_a_configuration_error() {
    let app = build_test_app(test_config(&[("SHOPIFY_CLIENT_ID", "")]));

    let response = post_json(
        app.router,
        "/auth/shopify/start",
        json!({ "shopDomain": "mystore" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_CONFIGURED");
    assert_eq!(json["error"], "Failed to generate auth URL");
    assert_eq!(app.store.session_count(), 0);
}

#[tokio::test]
async fn unsupported_provider_is_rejected() {
    let app = build_test_app(test_config(&[]));

    let response = post_json(
        app.router.clone(),
        "/auth/woocommerce/start",
        json!({ "shopDomain": "mystore" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app.router, "/auth/etsy/callback?code=a&state=b&shop=c").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: callback missing a parameter redirects with missing_params
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_missing_code_redirects_without_mutation() {
    let app = build_test_app(test_config(&[]));
    let state = start_auth(app.router.clone(), "mystore").await;

    let uri = format!("/auth/shopify/callback?state={state}&shop={SHOP}");
    let response = get(app.router, &uri).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(query_map(&location(&response))["error"], "missing_params");

    let session = app.store.find_session_by_state(&state).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::InProgress);
    assert_eq!(app.store.merchant_count(), 0);
}

// ---------------------------------------------------------------------------
// Test: successful callback stores the token and completes the session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_success_connects_the_merchant() {
    let server = MockServer::start().await;
    mock_shopify(&server, "tok123", 12).await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore.com").await;
    let uri = callback_uri(&callback_params("auth-code", &state, SHOP));
    let response = get(app.router, &uri).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert_eq!(target.host_str(), Some("localhost"));
    let query = query_map(&target);
    assert_eq!(query["connected"], "shopify");
    assert_eq!(query["shop"], SHOP);
    assert_eq!(query["productCount"], "12");
    assert!(!query.contains_key("error"));

    let merchant = app
        .store
        .find_merchant_by_domain(SHOP)
        .await
        .unwrap()
        .expect("merchant should be stored");
    assert_eq!(merchant.access_token, "tok123");
    assert_eq!(merchant.scope, "read_products");

    let session = app.store.find_session_by_state(&state).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.merchant_id, Some(merchant.id));
    assert!(session.completed_at.is_some());
}

// ---------------------------------------------------------------------------
// Test: the token exchange request carries the app credentials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_posts_credentials_and_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_matches(json!({
            "client_id": CLIENT_ID,
            "client_secret": CLIENT_SECRET,
            "code": "the-code",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "tok", "scope": "read_products" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore").await;
    let response = get(app.router, &callback_uri(&callback_params("the-code", &state, SHOP))).await;

    // Verifier endpoints are not mocked; the redirect falls back to a zero
    // product count.
    assert_eq!(query_map(&location(&response))["productCount"], "0");
}

// ---------------------------------------------------------------------------
// Test: upstream rejection fails the session with a generic reason
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_exchange_failure_fails_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_request: code used"))
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore").await;
    let response = get(app.router, &callback_uri(&callback_params("bad", &state, SHOP))).await;

    let target = location(&response);
    assert_eq!(query_map(&target)["error"], "token_exchange_failed");
    assert!(!target.as_str().contains("code used"));

    let session = app.store.find_session_by_state(&state).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
    assert_eq!(app.store.merchant_count(), 0);
}

// ---------------------------------------------------------------------------
// Test: unknown or reused state is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_with_unknown_state_is_rejected() {
    let app = build_test_app(test_config(&[]));

    let uri = callback_uri(&callback_params("code", &"f".repeat(64), SHOP));
    let response = get(app.router, &uri).await;

    assert_eq!(query_map(&location(&response))["error"], "invalid_state");
    assert_eq!(app.store.merchant_count(), 0);
}

#[tokio::test]
async fn callback_state_is_single_use() {
    let server = MockServer::start().await;
    mock_shopify(&server, "tok123", 3).await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore").await;
    let uri = callback_uri(&callback_params("code-1", &state, SHOP));

    let first = get(app.router.clone(), &uri).await;
    assert_eq!(query_map(&location(&first))["connected"], "shopify");

    let replay = get(app.router, &uri).await;
    assert_eq!(query_map(&location(&replay))["error"], "invalid_state");
}

#[tokio::test]
async fn concurrent_callbacks_with_one_state_exchange_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "tok-race", "scope": "read_products" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore").await;
    let uri_a = callback_uri(&callback_params("code-a", &state, SHOP));
    let uri_b = callback_uri(&callback_params("code-b", &state, SHOP));
    let (a, b) = tokio::join!(
        get(app.router.clone(), &uri_a),
        get(app.router.clone(), &uri_b),
    );

    let mut outcomes = [query_map(&location(&a)), query_map(&location(&b))];
    outcomes.sort_by_key(|q| q.contains_key("error"));
    assert_eq!(outcomes[0]["connected"], "shopify");
    assert_eq!(outcomes[1]["error"], "invalid_state");

    assert_eq!(app.store.merchant_count(), 1);
    let session = app.store.find_session_by_state(&state).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

// ---------------------------------------------------------------------------
// Test: a dropped callback request still resolves its session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dropped_callback_still_completes_the_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "tok-late", "scope": "read_products" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore").await;
    let uri = callback_uri(&callback_params("code", &state, SHOP));

    // The browser gives up long before the provider answers.
    let abandoned = tokio::time::timeout(Duration::from_millis(100), get(app.router, &uri)).await;
    assert!(abandoned.is_err());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let session = loop {
        let session = app.store.find_session_by_state(&state).await.unwrap().unwrap();
        if session.status.is_terminal() {
            break session;
        }
        assert!(tokio::time::Instant::now() < deadline, "session never resolved");
        tokio::time::sleep(Duration::from_millis(50)).await;
    };

    assert_eq!(session.status, SessionStatus::Completed);
    let merchant = app.store.find_merchant_by_domain(SHOP).await.unwrap().unwrap();
    assert_eq!(merchant.access_token, "tok-late");
}

#[tokio::test]
async fn callback_for_another_shop_fails_the_session() {
    let app = build_test_app(test_config(&[]));

    let state = start_auth(app.router.clone(), "mystore").await;
    let uri = callback_uri(&callback_params("code", &state, "othershop.myshopify.com"));
    let response = get(app.router, &uri).await;

    assert_eq!(query_map(&location(&response))["error"], "invalid_state");
    let session = app.store.find_session_by_state(&state).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
}

// ---------------------------------------------------------------------------
// Test: callback signature handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_with_wrong_hmac_is_rejected_before_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore").await;
    let mut params = callback_params("code", &state, SHOP);
    let mut signature = sign_callback_params(CLIENT_SECRET, &params);
    let last = if signature.ends_with('0') { "1" } else { "0" };
    signature.replace_range(signature.len() - 1.., last);
    params.insert("hmac".to_string(), signature);

    let response = get(app.router, &callback_uri(&params)).await;

    assert_eq!(query_map(&location(&response))["error"], "invalid_hmac");
    assert_eq!(app.store.merchant_count(), 0);

    let session = app.store.find_session_by_state(&state).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
}

#[tokio::test]
async fn callback_with_valid_hmac_is_accepted() {
    let server = MockServer::start().await;
    mock_shopify(&server, "tok-signed", 1).await;
    let app = build_test_app_with_origin(&server.uri());

    let state = start_auth(app.router.clone(), "mystore").await;
    let mut params = callback_params("code", &state, SHOP);
    let signature = sign_callback_params(CLIENT_SECRET, &params);
    params.insert("hmac".to_string(), signature);

    let response = get(app.router, &callback_uri(&params)).await;

    assert_eq!(query_map(&location(&response))["connected"], "shopify");
}

#[tokio::test]
async fn callback_without_hmac_is_rejected_when_required() {
    let app = build_test_app(test_config(&[("SHOPIFY_REQUIRE_HMAC", "true")]));

    let state = start_auth(app.router.clone(), "mystore").await;
    let response = get(app.router, &callback_uri(&callback_params("code", &state, SHOP))).await;

    assert_eq!(query_map(&location(&response))["error"], "invalid_hmac");
}

// ---------------------------------------------------------------------------
// Test: GET /auth/status/{shop_domain}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_for_unknown_shop_is_not_connected() {
    let app = build_test_app(test_config(&[]));

    let response = get(app.router, "/auth/status/nobody.myshopify.com").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "connected": false }));
}

#[tokio::test]
async fn status_for_connected_shop_reports_details() {
    let server = MockServer::start().await;
    mock_shopify(&server, "tok-status", 42).await;
    let app = build_test_app_with_origin(&server.uri());

    app.store
        .upsert_merchant(&UpsertMerchant {
            shop_domain: SHOP.to_string(),
            platform: Platform::Shopify,
            access_token: "tok-status".to_string(),
            scope: "read_products".to_string(),
        })
        .await
        .unwrap();

    // The path accepts the same loose forms as the start endpoint.
    let response = get(app.router, "/auth/status/MyStore.com").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["connected"], true);
    assert_eq!(json["shopName"], "My Store");
    assert_eq!(json["productCount"], 42);
}
