//! The OAuth authorization-code flow.
//!
//! [`ShopifyOAuth`] owns the session state machine: it creates the session
//! behind each CSRF state token, checks callbacks against it and records the
//! outcome.

mod engine;
mod error;

pub use engine::{AuthorizationStart, ShopifyOAuth, TokenGrant};
pub use error::OAuthError;
