//! Connection check for a freshly connected (or previously stored) token.
//!
//! The shop metadata call decides success. The product count is extra
//! information: when it fails the check still succeeds with a count of 0.

use serde::Serialize;

use crate::client::ShopifyClient;

/// Outcome of [`ShopifyClient::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionReport {
    fn failed(error: &str) -> Self {
        Self {
            success: false,
            shop_name: None,
            product_count: None,
            error: Some(error.to_string()),
        }
    }
}

impl ShopifyClient {
    /// Confirm that `access_token` works for `shop_domain`.
    pub async fn test_connection(&self, shop_domain: &str, access_token: &str) -> ConnectionReport {
        let shop = match self.shop_info(shop_domain, access_token).await {
            Ok(shop) => shop,
            Err(e) => {
                tracing::warn!(shop = shop_domain, error = %e, "Shopify connection test failed");
                return ConnectionReport::failed("API request failed");
            }
        };

        let product_count = match self.product_count(shop_domain, access_token).await {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!(shop = shop_domain, error = %e, "Product count unavailable");
                0
            }
        };

        ConnectionReport {
            success: true,
            shop_name: Some(shop.name),
            product_count: Some(product_count),
            error: None,
        }
    }
}
