//! OAuth primitives: CSRF state tokens, the requested scope list, and
//! callback signature verification.
//!
//! This module lives in `core` (no I/O) so both the flow engine in the API
//! crate and tests can use it directly.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Bytes of entropy in a CSRF state token (hex-encoded to twice this length).
pub const STATE_TOKEN_BYTES: usize = 32;

/// Name of the signature parameter in provider callbacks.
pub const HMAC_PARAM: &str = "hmac";

/// Read-only Shopify scopes requested during authorization.
pub const SHOPIFY_SCOPES: &[&str] = &[
    "read_products",
    "read_product_listings",
    "read_inventory",
    "read_orders",
    "read_customers",
    "read_content",
    "read_themes",
    "read_files",
    "read_locales",
    "read_translations",
    "read_price_rules",
    "read_discounts",
    "read_shipping",
    "read_analytics",
];

/// The scope list in the comma-separated form the provider expects.
pub fn shopify_scope_param() -> String {
    SHOPIFY_SCOPES.join(",")
}

// ---------------------------------------------------------------------------
// State tokens
// ---------------------------------------------------------------------------

/// Generate a fresh CSRF state token from the thread-local CSPRNG.
pub fn generate_state_token() -> String {
    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    rand::rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

// ---------------------------------------------------------------------------
// Callback HMAC
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// Build the message that the provider signs: every parameter except
/// `hmac`, sorted by key, joined as `key=value` pairs with `&`.
pub fn callback_signing_message(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(key, _)| key.as_str() != HMAC_PARAM)
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the hex-encoded HMAC-SHA256 of the callback parameters.
pub fn sign_callback_params(secret: &str, params: &BTreeMap<String, String>) -> String {
    let mut mac = new_mac(secret);
    mac.update(callback_signing_message(params).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify the `hmac` parameter of a provider callback.
///
/// Returns `false` when the parameter is absent, is not valid hex, or does
/// not match. The digest comparison is constant-time.
pub fn verify_callback_hmac(secret: &str, params: &BTreeMap<String, String>) -> bool {
    let Some(supplied) = params.get(HMAC_PARAM) else {
        return false;
    };
    let Ok(supplied) = hex::decode(supplied) else {
        return false;
    };

    let mut mac = new_mac(secret);
    mac.update(callback_signing_message(params).as_bytes());
    mac.verify_slice(&supplied).is_ok()
}

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
