//! HTTP client for the Shopify OAuth and Admin REST endpoints.

use std::fmt;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ShopifyError;

/// Header carrying the merchant's bearer token on Admin API calls.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Admin REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-01";

/// Upper bound on `limit` for list endpoints.
pub const MAX_PAGE_LIMIT: u32 = 250;

/// HTTP timeout for a single Shopify call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Authorization URL
// ---------------------------------------------------------------------------

/// Query parameters of the authorization redirect.
#[derive(Debug, Clone)]
pub struct AuthorizeParams<'a> {
    pub client_id: &'a str,
    /// Comma-separated scope list.
    pub scope: &'a str,
    pub redirect_uri: &'a str,
    pub state: &'a str,
}

/// Build `https://{shop}/admin/oauth/authorize?client_id=…&scope=…&redirect_uri=…&state=…`.
///
/// The merchant's browser follows this URL, so it always points at the real
/// shop domain.
pub fn authorize_url(shop_domain: &str, params: &AuthorizeParams<'_>) -> Result<Url, ShopifyError> {
    Url::parse_with_params(
        &format!("https://{shop_domain}/admin/oauth/authorize"),
        [
            ("client_id", params.client_id),
            ("scope", params.scope),
            ("redirect_uri", params.redirect_uri),
            ("state", params.state),
        ],
    )
    .map_err(|e| ShopifyError::InvalidUrl(e.to_string()))
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Successful body of the code-for-token exchange.
#[derive(Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// Granted scopes, comma-separated.
    #[serde(default)]
    pub scope: String,
}

impl fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// The subset of `shop.json` the service reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopInfo {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub myshopify_domain: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Deserialize)]
struct ShopEnvelope {
    shop: ShopInfo,
}

#[derive(Deserialize)]
struct CountEnvelope {
    count: u64,
}

// ---------------------------------------------------------------------------
// ShopifyClient
// ---------------------------------------------------------------------------

/// Server-to-server Shopify client.
///
/// Requests go to `https://{shop}` unless an API origin override is set, in
/// which case every shop resolves to that origin (local mocks, tests).
#[derive(Debug, Clone)]
pub struct ShopifyClient {
    http: reqwest::Client,
    api_version: String,
    api_origin: Option<Url>,
}

impl ShopifyClient {
    pub fn new(api_version: impl Into<String>) -> Result<Self, ShopifyError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_version: api_version.into(),
            api_origin: None,
        })
    }

    /// Send every request to `origin` instead of the shop's own host.
    pub fn with_api_origin(mut self, origin: Url) -> Self {
        self.api_origin = Some(origin);
        self
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn shop_url(&self, shop_domain: &str, path: &str) -> Result<Url, ShopifyError> {
        let base = match &self.api_origin {
            Some(origin) => origin.clone(),
            None => Url::parse(&format!("https://{shop_domain}"))
                .map_err(|e| ShopifyError::InvalidUrl(e.to_string()))?,
        };
        base.join(path)
            .map_err(|e| ShopifyError::InvalidUrl(e.to_string()))
    }

    fn admin_url(&self, shop_domain: &str, resource: &str) -> Result<Url, ShopifyError> {
        self.shop_url(
            shop_domain,
            &format!("/admin/api/{}/{resource}", self.api_version),
        )
    }

    /// Exchange an authorization code for a permanent access token.
    ///
    /// A non-2xx answer is logged with its body here and surfaced only as
    /// [`ShopifyError::HttpStatus`].
    pub async fn exchange_code(
        &self,
        shop_domain: &str,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<AccessTokenResponse, ShopifyError> {
        let url = self.shop_url(shop_domain, "/admin/oauth/access_token")?;
        let response = self
            .http
            .post(url)
            .json(&TokenRequest {
                client_id,
                client_secret,
                code,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                shop = shop_domain,
                status = status.as_u16(),
                body = %body,
                "Shopify token exchange rejected"
            );
            return Err(ShopifyError::HttpStatus(status.as_u16()));
        }

        let token: AccessTokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(ShopifyError::Malformed("empty access_token".to_string()));
        }
        Ok(token)
    }

    /// GET an Admin API resource as raw JSON.
    async fn get_admin(
        &self,
        shop_domain: &str,
        access_token: &str,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ShopifyError> {
        let url = self.admin_url(shop_domain, resource)?;
        let response = self
            .http
            .get(url)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status != StatusCode::UNAUTHORIZED {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    shop = shop_domain,
                    resource,
                    status = status.as_u16(),
                    body = %body,
                    "Shopify Admin API error"
                );
            }
            return Err(ShopifyError::HttpStatus(status.as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        shop_domain: &str,
        access_token: &str,
        resource: &str,
    ) -> Result<T, ShopifyError> {
        let value = self.get_admin(shop_domain, access_token, resource, &[]).await?;
        serde_json::from_value(value).map_err(|e| ShopifyError::Malformed(e.to_string()))
    }

    /// Raw `shop.json` body.
    pub async fn shop(&self, shop_domain: &str, access_token: &str) -> Result<Value, ShopifyError> {
        self.get_admin(shop_domain, access_token, "shop.json", &[]).await
    }

    /// Parsed shop metadata.
    pub async fn shop_info(
        &self,
        shop_domain: &str,
        access_token: &str,
    ) -> Result<ShopInfo, ShopifyError> {
        let envelope: ShopEnvelope = self.get_typed(shop_domain, access_token, "shop.json").await?;
        Ok(envelope.shop)
    }

    pub async fn product_count(
        &self,
        shop_domain: &str,
        access_token: &str,
    ) -> Result<u64, ShopifyError> {
        let envelope: CountEnvelope = self
            .get_typed(shop_domain, access_token, "products/count.json")
            .await?;
        Ok(envelope.count)
    }

    /// Raw `products.json` body. `limit` is clamped to `1..=250`.
    pub async fn products(
        &self,
        shop_domain: &str,
        access_token: &str,
        limit: u32,
    ) -> Result<Value, ShopifyError> {
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self.get_admin(
            shop_domain,
            access_token,
            "products.json",
            &[("limit", limit.to_string())],
        )
        .await
    }
}
