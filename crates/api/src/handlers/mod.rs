pub mod auth;
pub mod storefront;

use storelink_core::onboarding::Platform;

use crate::error::{AppError, AppResult};

/// Resolve the `{provider}` path segment to a platform with an OAuth
/// integration.
pub(crate) fn oauth_provider(provider: &str) -> AppResult<Platform> {
    match provider.parse::<Platform>() {
        Ok(platform) if platform.supports_oauth() => Ok(platform),
        _ => Err(AppError::BadRequest(format!(
            "Unsupported provider '{provider}'"
        ))),
    }
}
