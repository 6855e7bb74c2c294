pub mod auth;
pub mod health;
pub mod storefront;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the application route tree (everything except `/health`).
///
/// Route hierarchy:
///
/// ```text
/// /ws                                          canvas WebSocket
///
/// /auth/{provider}/start                       begin OAuth (POST)
/// /auth/{provider}/callback                    OAuth redirect target (GET)
/// /auth/status/{shop_domain}                   connection status (GET)
///
/// /api/{provider}/{shop_domain}/products       proxied product list (GET)
/// /api/{provider}/{shop_domain}/shop           proxied shop metadata (GET)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/api", storefront::router())
}
