use storelink_db::store::StoreError;

/// Failures of the OAuth flow.
///
/// Each variant has a stable [`code`](OAuthError::code) that the callback
/// handler puts in the `error` query parameter of its redirect.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Client id or secret is not configured.
    #[error("OAuth is not configured")]
    NotConfigured,

    #[error("Invalid shop domain: {0}")]
    InvalidDomain(String),

    /// Unknown, reused or mismatched state token.
    #[error("Invalid or expired OAuth state")]
    InvalidState,

    /// Callback signature present but wrong, or absent when required.
    #[error("Callback signature verification failed")]
    InvalidHmac,

    /// The provider rejected the code or could not be reached.
    #[error("Token exchange failed")]
    ExchangeFailed,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl OAuthError {
    /// Machine-readable reason used in redirects.
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::NotConfigured => "not_configured",
            OAuthError::InvalidDomain(_) => "invalid_domain",
            OAuthError::InvalidState => "invalid_state",
            OAuthError::InvalidHmac => "invalid_hmac",
            OAuthError::ExchangeFailed => "token_exchange_failed",
            OAuthError::Store(_) => "oauth_failed",
        }
    }
}
