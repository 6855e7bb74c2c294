use std::fmt;
use std::str::FromStr;

use axum::http::HeaderValue;
use reqwest::Url;
use storelink_db::store::StoreBackend;
use storelink_shopify::client::DEFAULT_API_VERSION;

/// Longest accepted `SESSION_TIMEOUT_MINS` (one week).
const MAX_SESSION_TIMEOUT_MINS: i64 = 7 * 24 * 60;

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Shopify app credentials and endpoints.
///
/// The credentials are optional: a server without them still starts, and
/// OAuth requests fail with a configuration error.
#[derive(Clone)]
pub struct ShopifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Redirect URI registered with the Shopify app.
    pub callback_url: String,
    pub api_version: String,
    /// Replaces `https://{shop}` for server-to-server calls.
    pub api_origin: Option<Url>,
    /// Reject callbacks that carry no `hmac` parameter.
    pub require_hmac: bool,
}

impl fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("callback_url", &self.callback_url)
            .field("api_version", &self.api_version)
            .field("api_origin", &self.api_origin.as_ref().map(Url::as_str))
            .field("require_hmac", &self.require_hmac)
            .finish()
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Where the OAuth callback sends the browser afterwards.
    pub frontend_url: Url,
    pub store: StoreBackend,
    pub shopify: ShopifyConfig,
    /// Age after which open onboarding sessions are failed (default: `15`).
    pub session_timeout_mins: i64,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                                       |
    /// |-------------------------|-----------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                     |
    /// | `PORT`                  | `8001`                                        |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`                       |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                          |
    /// | `FRONTEND_URL`          | `http://localhost:5173`                       |
    /// | `STORE_BACKEND`         | `memory`                                      |
    /// | `DATABASE_URL`          | required for `STORE_BACKEND=postgres`         |
    /// | `SHOPIFY_CLIENT_ID`     | unset                                         |
    /// | `SHOPIFY_CLIENT_SECRET` | unset                                         |
    /// | `OAUTH_CALLBACK_URL`    | `http://localhost:8001/auth/shopify/callback` |
    /// | `SHOPIFY_API_VERSION`   | `2024-01`                                     |
    /// | `SHOPIFY_API_ORIGIN`    | unset                                         |
    /// | `SHOPIFY_REQUIRE_HMAC`  | `false`                                       |
    /// | `SESSION_TIMEOUT_MINS`  | `15`                                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("HOST", "0.0.0.0");
        let port = parse("PORT", var("PORT", "8001"), "a valid u16")?;

        let cors_origins = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    expected: "a comma-separated list of origins",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs =
            parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"), "a valid u64")?;

        let frontend_url = parse_url("FRONTEND_URL", var("FRONTEND_URL", "http://localhost:5173"))?;

        let store = match var("STORE_BACKEND", "memory").trim() {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: optional("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORE_BACKEND",
                    expected: "'memory' or 'postgres'",
                    value: other.to_string(),
                })
            }
        };

        let api_origin = optional("SHOPIFY_API_ORIGIN")
            .map(|v| parse_url("SHOPIFY_API_ORIGIN", v))
            .transpose()?;

        let shopify = ShopifyConfig {
            client_id: optional("SHOPIFY_CLIENT_ID"),
            client_secret: optional("SHOPIFY_CLIENT_SECRET"),
            callback_url: var(
                "OAUTH_CALLBACK_URL",
                "http://localhost:8001/auth/shopify/callback",
            ),
            api_version: var("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            api_origin,
            require_hmac: parse(
                "SHOPIFY_REQUIRE_HMAC",
                var("SHOPIFY_REQUIRE_HMAC", "false"),
                "'true' or 'false'",
            )?,
        };

        let session_timeout_mins: i64 = parse(
            "SESSION_TIMEOUT_MINS",
            var("SESSION_TIMEOUT_MINS", "15"),
            "a positive number of minutes",
        )?;
        if !(1..=MAX_SESSION_TIMEOUT_MINS).contains(&session_timeout_mins) {
            return Err(ConfigError::Invalid {
                var: "SESSION_TIMEOUT_MINS",
                expected: "between 1 and 10080",
                value: session_timeout_mins.to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            frontend_url,
            store,
            shopify,
            session_timeout_mins,
        })
    }
}

fn parse<T: FromStr>(var: &'static str, value: String, expected: &'static str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        })
}

fn parse_url(var: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|_| ConfigError::Invalid {
        var,
        expected: "an absolute URL",
        value,
    })
}
