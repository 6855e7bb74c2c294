use async_trait::async_trait;
use storelink_core::types::{RecordId, Timestamp};

use super::{OnboardingStore, StoreError, StoreResult};
use crate::models::merchant::{Merchant, UpsertMerchant};
use crate::models::onboarding_session::{CreateSession, OnboardingSession, SessionTransition};
use crate::repositories::{MerchantRepo, OnboardingSessionRepo};
use crate::DbPool;

/// Durable backend on top of the Postgres repositories.
#[derive(Clone)]
pub struct PostgresStore {
    pool: DbPool,
}

impl PostgresStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a unique violation on the state token to [`StoreError::DuplicateState`].
fn classify_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some("uq_onboarding_sessions_state") {
            return StoreError::DuplicateState;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl OnboardingStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create_session(&self, input: &CreateSession) -> StoreResult<OnboardingSession> {
        OnboardingSessionRepo::create(&self.pool, input)
            .await
            .map_err(classify_insert_error)
    }

    async fn find_session_by_state(&self, state: &str) -> StoreResult<Option<OnboardingSession>> {
        Ok(OnboardingSessionRepo::find_by_state(&self.pool, state).await?)
    }

    async fn transition_session(
        &self,
        id: RecordId,
        change: &SessionTransition,
    ) -> StoreResult<Option<OnboardingSession>> {
        Ok(OnboardingSessionRepo::transition(&self.pool, id, change).await?)
    }

    async fn claim_session_for_exchange(
        &self,
        id: RecordId,
    ) -> StoreResult<Option<OnboardingSession>> {
        Ok(OnboardingSessionRepo::claim_for_exchange(&self.pool, id).await?)
    }

    async fn fail_stale_sessions(&self, cutoff: Timestamp) -> StoreResult<u64> {
        Ok(OnboardingSessionRepo::fail_created_before(&self.pool, cutoff).await?)
    }

    async fn upsert_merchant(&self, input: &UpsertMerchant) -> StoreResult<Merchant> {
        Ok(MerchantRepo::upsert_by_domain(&self.pool, input).await?)
    }

    async fn find_merchant_by_domain(&self, shop_domain: &str) -> StoreResult<Option<Merchant>> {
        Ok(MerchantRepo::find_by_domain(&self.pool, shop_domain).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
