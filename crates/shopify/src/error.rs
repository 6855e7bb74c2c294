/// Errors from Shopify API calls.
#[derive(Debug, thiserror::Error)]
pub enum ShopifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Shopify answered with a non-2xx status. The body is logged, not kept.
    #[error("Shopify returned HTTP {0}")]
    HttpStatus(u16),

    /// The response parsed as JSON but lacked the expected fields.
    #[error("Malformed Shopify response: {0}")]
    Malformed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ShopifyError {
    /// Upstream status code, if the failure was an HTTP status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ShopifyError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}
