//! The storage seam for the onboarding flow.
//!
//! [`OnboardingStore`] is the only way the API touches persisted state. The
//! backend is chosen once at startup with [`open_store`]; call sites never
//! branch on which one is active.

mod memory;
mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use storelink_core::types::{RecordId, Timestamp};

use crate::models::merchant::{Merchant, UpsertMerchant};
use crate::models::onboarding_session::{CreateSession, OnboardingSession, SessionTransition};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Errors surfaced by any store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A session with this state token already exists.
    #[error("Duplicate state token")]
    DuplicateState,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations needed by the OAuth flow.
///
/// Every mutating method is atomic with respect to its key: transitions are
/// guarded compare-and-set on the session's status, and merchant upserts are
/// a single insert-or-update keyed by shop domain.
#[async_trait]
pub trait OnboardingStore: Send + Sync {
    /// Short backend label for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// Persist a new `pending` session.
    async fn create_session(&self, input: &CreateSession) -> StoreResult<OnboardingSession>;

    async fn find_session_by_state(&self, state: &str) -> StoreResult<Option<OnboardingSession>>;

    /// Apply `change` if the session's current status permits it.
    ///
    /// Returns the updated session, or `None` if the session is missing or
    /// the transition is not allowed from its current status.
    async fn transition_session(
        &self,
        id: RecordId,
        change: &SessionTransition,
    ) -> StoreResult<Option<OnboardingSession>>;

    /// Mark an `in_progress` session as having its code exchange under way.
    ///
    /// At most one caller gets `Some` per session; everyone else, and any
    /// caller on a session that is not `in_progress`, gets `None`.
    async fn claim_session_for_exchange(
        &self,
        id: RecordId,
    ) -> StoreResult<Option<OnboardingSession>>;

    /// Fail every non-terminal session created before `cutoff`.
    async fn fail_stale_sessions(&self, cutoff: Timestamp) -> StoreResult<u64>;

    /// Insert or refresh the merchant for `input.shop_domain`.
    async fn upsert_merchant(&self, input: &UpsertMerchant) -> StoreResult<Merchant>;

    async fn find_merchant_by_domain(&self, shop_domain: &str) -> StoreResult<Option<Merchant>>;

    async fn health_check(&self) -> StoreResult<()>;
}

/// Which backend to open.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { database_url: String },
}

impl fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("Memory"),
            // The URL usually embeds a password.
            StoreBackend::Postgres { .. } => f.write_str("Postgres { database_url: <redacted> }"),
        }
    }
}

/// Open the configured backend. For Postgres this connects, checks health
/// and applies migrations.
pub async fn open_store(backend: &StoreBackend) -> StoreResult<Arc<dyn OnboardingStore>> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory onboarding store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres { database_url } => {
            let pool = crate::create_pool(database_url).await?;
            tracing::info!("Database connection pool created");

            crate::health_check(&pool).await?;
            crate::run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PostgresStore::new(pool)))
        }
    }
}
