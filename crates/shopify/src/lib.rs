//! Shopify Admin API client.
//!
//! Covers the OAuth authorization-code endpoints, the read-only Admin REST
//! calls used after a store connects, and the connection check built on
//! them.

pub mod client;
pub mod error;
pub mod verifier;

pub use client::{authorize_url, AccessTokenResponse, AuthorizeParams, ShopInfo, ShopifyClient};
pub use error::ShopifyError;
pub use verifier::ConnectionReport;
