//! Read-only storefront endpoints proxied to the Shopify Admin API with the
//! merchant's stored token.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use storelink_core::shop_domain::parse_shop_domain;
use storelink_db::models::merchant::Merchant;

use super::oauth_provider;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PRODUCT_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub limit: Option<u32>,
}

/// GET /api/{provider}/{shop_domain}/products
pub async fn list_products(
    Path((provider, shop_domain)): Path<(String, String)>,
    Query(query): Query<ProductsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    oauth_provider(&provider)?;
    let merchant = connected_merchant(&state, &shop_domain).await?;

    let body = state
        .shopify
        .products(
            &merchant.shop_domain,
            &merchant.access_token,
            query.limit.unwrap_or(DEFAULT_PRODUCT_LIMIT),
        )
        .await?;

    Ok(Json(body))
}

/// GET /api/{provider}/{shop_domain}/shop
pub async fn get_shop(
    Path((provider, shop_domain)): Path<(String, String)>,
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    oauth_provider(&provider)?;
    let merchant = connected_merchant(&state, &shop_domain).await?;

    let body = state
        .shopify
        .shop(&merchant.shop_domain, &merchant.access_token)
        .await?;

    Ok(Json(body))
}

async fn connected_merchant(state: &AppState, raw_shop: &str) -> AppResult<Merchant> {
    let shop_domain = parse_shop_domain(raw_shop)?;
    state
        .store
        .find_merchant_by_domain(&shop_domain)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not connected".to_string()))
}
