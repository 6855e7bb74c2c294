//! Shop domain normalization.
//!
//! Merchants type their store address in many shapes (`MyStore.com/`,
//! `https://mystore.myshopify.com`, `mystore`). Every entry point that
//! receives a domain (auth-URL generation, code exchange, status checks,
//! proxy calls) runs it through [`normalize_domain`] so the same store always
//! maps to the same merchant record.

use crate::error::CoreError;

/// Canonical Shopify shop domain suffix.
pub const SHOPIFY_DOMAIN_SUFFIX: &str = ".myshopify.com";

/// Normalize a raw shop domain to its canonical `<name>.myshopify.com` form.
///
/// Trims whitespace, lower-cases, strips leading `http://` / `https://` and
/// trailing slashes. If the result does not already end in
/// [`SHOPIFY_DOMAIN_SUFFIX`], the part before the first `.` is kept and the
/// suffix appended. The function is idempotent.
pub fn normalize_domain(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.ends_with(SHOPIFY_DOMAIN_SUFFIX) {
        return current;
    }

    let label = current.split('.').next().unwrap_or_default();
    format!("{label}{SHOPIFY_DOMAIN_SUFFIX}")
}

fn clean_once(s: &str) -> String {
    let s = s.trim().to_lowercase();
    let s = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(&s);
    s.strip_suffix('/').unwrap_or(s).to_string()
}

/// Normalize and validate a shop domain.
///
/// The store name (everything before [`SHOPIFY_DOMAIN_SUFFIX`]) must be
/// non-empty and consist of ASCII letters, digits, `-` and `.` only.
pub fn parse_shop_domain(raw: &str) -> Result<String, CoreError> {
    let domain = normalize_domain(raw);
    let name = domain
        .strip_suffix(SHOPIFY_DOMAIN_SUFFIX)
        .unwrap_or_default();

    if name.is_empty() {
        return Err(CoreError::Validation("Shop domain is empty".to_string()));
    }

    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid || name.starts_with('-') || name.starts_with('.') {
        return Err(CoreError::Validation(format!(
            "Invalid shop domain '{domain}'"
        )));
    }

    Ok(domain)
}
