//! Repository for the `merchants` table.

use sqlx::PgPool;
use storelink_core::types::new_record_id;

use crate::models::merchant::{Merchant, UpsertMerchant};

/// Column list for `merchants` queries.
const COLUMNS: &str = "\
    id, shop_domain, platform, access_token, scope, \
    onboarding_completed, metadata, created_at, updated_at";

/// Provides upsert and lookup for merchant records.
pub struct MerchantRepo;

impl MerchantRepo {
    /// Insert a merchant, or refresh the token and scope of the existing row
    /// for the same shop domain.
    ///
    /// Single statement keyed on `uq_merchants_shop_domain`, so concurrent
    /// calls for one domain never produce two rows. `onboarding_completed`
    /// and `metadata` of an existing row are left as they are.
    pub async fn upsert_by_domain(
        pool: &PgPool,
        input: &UpsertMerchant,
    ) -> Result<Merchant, sqlx::Error> {
        let query = format!(
            "INSERT INTO merchants (id, shop_domain, platform, access_token, scope) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (shop_domain) DO UPDATE SET \
                access_token = EXCLUDED.access_token, \
                scope = EXCLUDED.scope, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Merchant>(&query)
            .bind(new_record_id())
            .bind(&input.shop_domain)
            .bind(input.platform.as_str())
            .bind(&input.access_token)
            .bind(&input.scope)
            .fetch_one(pool)
            .await
    }

    /// Find a merchant by its normalized shop domain.
    pub async fn find_by_domain(
        pool: &PgPool,
        shop_domain: &str,
    ) -> Result<Option<Merchant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM merchants WHERE shop_domain = $1");
        sqlx::query_as::<_, Merchant>(&query)
            .bind(shop_domain)
            .fetch_optional(pool)
            .await
    }
}
