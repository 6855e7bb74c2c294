//! Merchant entity model and DTOs.

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use storelink_core::onboarding::Platform;
use storelink_core::types::{RecordId, Timestamp};

/// A row from the `merchants` table.
///
/// The access token is a bearer credential: it is never serialized and
/// `Debug` prints it redacted.
#[derive(Clone, FromRow, Serialize)]
pub struct Merchant {
    pub id: RecordId,
    pub shop_domain: String,
    #[sqlx(try_from = "String")]
    pub platform: Platform,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub scope: String,
    pub onboarding_completed: bool,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl fmt::Debug for Merchant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merchant")
            .field("id", &self.id)
            .field("shop_domain", &self.shop_domain)
            .field("platform", &self.platform)
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .field("onboarding_completed", &self.onboarding_completed)
            .field("metadata", &self.metadata)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input for inserting a merchant or refreshing the credentials of an
/// existing one with the same shop domain.
#[derive(Clone)]
pub struct UpsertMerchant {
    pub shop_domain: String,
    pub platform: Platform,
    pub access_token: String,
    pub scope: String,
}

impl fmt::Debug for UpsertMerchant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpsertMerchant")
            .field("shop_domain", &self.shop_domain)
            .field("platform", &self.platform)
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}
