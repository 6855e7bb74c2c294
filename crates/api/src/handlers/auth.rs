//! Handlers for the Shopify OAuth flow.
//!
//! `start_auth` answers JSON. The callback is a browser navigation, so every
//! outcome (including failures) is a redirect to the frontend carrying either
//! success markers or an `error=<reason>` query parameter.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use storelink_core::shop_domain::parse_shop_domain;

use super::oauth_provider;
use crate::error::{AppError, AppResult};
use crate::oauth::OAuthError;
use crate::state::AppState;

/// Reason used when the callback lacks `code`, `state` or `shop`.
pub const MISSING_PARAMS: &str = "missing_params";

// ---------------------------------------------------------------------------
// POST /auth/{provider}/start
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAuthRequest {
    #[serde(default)]
    pub shop_domain: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAuthResponse {
    pub auth_url: String,
}

/// Begin an authorization for the shop named in the body.
pub async fn start_auth(
    Path(provider): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<StartAuthRequest>,
) -> AppResult<Json<StartAuthResponse>> {
    oauth_provider(&provider)?;

    let shop_domain = input
        .shop_domain
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("shopDomain is required".to_string()))?;

    let started = state.oauth.generate_auth_url(&shop_domain).await?;

    Ok(Json(StartAuthResponse {
        auth_url: started.auth_url,
    }))
}

// ---------------------------------------------------------------------------
// GET /auth/{provider}/callback
// ---------------------------------------------------------------------------

/// Finish the authorization and send the browser back to the frontend.
///
/// On success the redirect carries `connected`, `shop` and `productCount`;
/// the frontend then reports completion over the socket.
pub async fn oauth_callback(
    Path(provider): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> AppResult<Response> {
    let platform = oauth_provider(&provider)?;
    let frontend = &state.config.frontend_url;

    let required = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());
    let (Some(code), Some(csrf_state), Some(shop)) =
        (required("code"), required("state"), required("shop"))
    else {
        tracing::warn!(?params, "OAuth callback missing parameters");
        return Ok(error_redirect(frontend, MISSING_PARAMS));
    };

    if let Err(e) = state.oauth.verify_callback(&params) {
        if matches!(e, OAuthError::InvalidHmac) {
            state.oauth.reject_callback(csrf_state).await;
        }
        return Ok(error_redirect(frontend, e.code()));
    }

    // Detached so a closed popup cannot leave the session in progress.
    let exchange = Arc::clone(&state.oauth).exchange_detached(
        shop.to_string(),
        code.to_string(),
        csrf_state.to_string(),
    );
    let grant = match exchange.await {
        Ok(grant) => grant,
        Err(e) => {
            tracing::warn!(shop, error = %e, "OAuth callback rejected");
            return Ok(error_redirect(frontend, e.code()));
        }
    };

    let report = state
        .shopify
        .test_connection(&grant.shop_domain, &grant.access_token)
        .await;
    let product_count = report.product_count.unwrap_or(0);

    let mut target = frontend.clone();
    target
        .query_pairs_mut()
        .append_pair("connected", platform.as_str())
        .append_pair("shop", &grant.shop_domain)
        .append_pair("productCount", &product_count.to_string());

    Ok(Redirect::to(target.as_str()).into_response())
}

fn error_redirect(frontend: &Url, reason: &str) -> Response {
    let mut target = frontend.clone();
    target.query_pairs_mut().append_pair("error", reason);
    Redirect::to(target.as_str()).into_response()
}

// ---------------------------------------------------------------------------
// GET /auth/status/{shop_domain}
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u64>,
}

/// Report whether a stored token still works for the shop.
pub async fn connection_status(
    Path(shop_domain): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ConnectionStatus>> {
    let shop_domain = parse_shop_domain(&shop_domain)?;

    let Some(merchant) = state.store.find_merchant_by_domain(&shop_domain).await? else {
        return Ok(Json(ConnectionStatus {
            connected: false,
            shop_name: None,
            product_count: None,
        }));
    };

    let report = state
        .shopify
        .test_connection(&merchant.shop_domain, &merchant.access_token)
        .await;

    Ok(Json(ConnectionStatus {
        connected: report.success,
        shop_name: report.shop_name,
        product_count: report.product_count,
    }))
}
