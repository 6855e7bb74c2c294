//! Route definitions for proxied storefront reads.
//!
//! Mounted at `/api` by `app_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::storefront;
use crate::state::AppState;

/// ```text
/// GET    /{provider}/{shop_domain}/products?limit=   -> list_products
/// GET    /{provider}/{shop_domain}/shop              -> get_shop
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{provider}/{shop_domain}/products",
            get(storefront::list_products),
        )
        .route("/{provider}/{shop_domain}/shop", get(storefront::get_shop))
}
