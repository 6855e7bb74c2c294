use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storelink_core::error::CoreError;
use storelink_db::store::StoreError;
use storelink_shopify::ShopifyError;

use crate::oauth::OAuthError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent `{error, code}` JSON
/// bodies. 5xx messages are sanitized; details go to the log only.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `storelink_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A failed call to the Shopify Admin API.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            // --- OAuth flow ---
            AppError::OAuth(err) => classify_oauth_error(err),

            // --- Storage ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }

            // --- Upstream ---
            AppError::Shopify(err) => classify_shopify_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an OAuth flow error to a status, error code and client-safe message.
fn classify_oauth_error(err: &OAuthError) -> (StatusCode, &'static str, String) {
    match err {
        OAuthError::NotConfigured => {
            tracing::error!("Shopify OAuth credentials are not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NOT_CONFIGURED",
                "Failed to generate auth URL".to_string(),
            )
        }
        OAuthError::InvalidDomain(msg) => {
            (StatusCode::BAD_REQUEST, "INVALID_DOMAIN", msg.clone())
        }
        OAuthError::InvalidState | OAuthError::InvalidHmac => (
            StatusCode::BAD_REQUEST,
            "INVALID_CALLBACK",
            err.to_string(),
        ),
        OAuthError::ExchangeFailed => (
            StatusCode::BAD_GATEWAY,
            "TOKEN_EXCHANGE_FAILED",
            err.to_string(),
        ),
        OAuthError::Store(inner) => {
            tracing::error!(error = %inner, "Store error during OAuth");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

/// Pass upstream HTTP statuses through with a generic body; transport and
/// decode failures become 502.
fn classify_shopify_error(err: &ShopifyError) -> (StatusCode, &'static str, String) {
    if let Some(status) = err
        .status()
        .and_then(|code| StatusCode::from_u16(code).ok())
    {
        return (status, "UPSTREAM_ERROR", "Shopify API error".to_string());
    }

    tracing::error!(error = %err, "Shopify request failed");
    (
        StatusCode::BAD_GATEWAY,
        "UPSTREAM_ERROR",
        "Failed to reach Shopify".to_string(),
    )
}
