//! Route definitions for the OAuth flow.
//!
//! Mounted at `/auth` by `app_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// OAuth routes.
///
/// ```text
/// POST   /{provider}/start           -> start_auth
/// GET    /{provider}/callback        -> oauth_callback
/// GET    /status/{shop_domain}       -> connection_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{provider}/start", post(auth::start_auth))
        .route("/{provider}/callback", get(auth::oauth_callback))
        .route("/status/{shop_domain}", get(auth::connection_status))
}
