//! Repository for the `onboarding_sessions` table.

use sqlx::PgPool;
use storelink_core::onboarding::SessionStatus;
use storelink_core::types::{new_record_id, RecordId, Timestamp};

use crate::models::onboarding_session::{CreateSession, OnboardingSession, SessionTransition};

/// Column list for `onboarding_sessions` queries.
const COLUMNS: &str = "\
    id, state, platform, shop_domain, status, merchant_id, exchange_started_at, \
    created_at, updated_at, completed_at";

/// Provides session creation, lookup and guarded status transitions.
pub struct OnboardingSessionRepo;

impl OnboardingSessionRepo {
    /// Insert a new `pending` session.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSession,
    ) -> Result<OnboardingSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_sessions (id, state, platform, shop_domain, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(new_record_id())
            .bind(&input.state)
            .bind(input.platform.as_str())
            .bind(&input.shop_domain)
            .bind(SessionStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a session by its CSRF state token.
    pub async fn find_by_state(
        pool: &PgPool,
        state: &str,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE state = $1");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Apply a status transition if the current status allows it.
    ///
    /// Returns `None` when the session does not exist or its status is not a
    /// predecessor of the target. The status guard is part of the `WHERE`
    /// clause, so two racing transitions cannot both succeed.
    pub async fn transition(
        pool: &PgPool,
        id: RecordId,
        change: &SessionTransition,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let allowed: Vec<&str> = change.to.predecessors().iter().map(|s| s.as_str()).collect();
        let query = format!(
            "UPDATE onboarding_sessions SET \
                status = $2, \
                shop_domain = COALESCE($3, shop_domain), \
                merchant_id = COALESCE($4, merchant_id), \
                completed_at = CASE WHEN $5 THEN NOW() ELSE completed_at END, \
                updated_at = NOW() \
             WHERE id = $1 AND status = ANY($6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(change.to.as_str())
            .bind(&change.shop_domain)
            .bind(change.merchant_id)
            .bind(change.to.is_terminal())
            .bind(allowed.as_slice())
            .fetch_optional(pool)
            .await
    }

    /// Claim an `in_progress` session for its single code exchange.
    ///
    /// Returns `None` if the session is not `in_progress` or another
    /// callback already claimed it.
    pub async fn claim_for_exchange(
        pool: &PgPool,
        id: RecordId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET \
                exchange_started_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = $2 AND exchange_started_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(SessionStatus::InProgress.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Move every non-terminal session created before `cutoff` to `failed`.
    /// Returns the number of sessions expired.
    pub async fn fail_created_before(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE onboarding_sessions SET \
                status = $1, completed_at = NOW(), updated_at = NOW() \
             WHERE status IN ($2, $3) AND created_at < $4",
        )
        .bind(SessionStatus::Failed.as_str())
        .bind(SessionStatus::Pending.as_str())
        .bind(SessionStatus::InProgress.as_str())
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
