//! Periodic expiry of abandoned onboarding sessions.
//!
//! A session whose callback never arrives would stay `pending` or
//! `in_progress` forever. This job fails every such session older than the
//! configured timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use storelink_db::store::{OnboardingStore, StoreResult};
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the expiry loop until `cancel` is triggered.
pub async fn run(store: Arc<dyn OnboardingStore>, timeout_mins: i64, cancel: CancellationToken) {
    tracing::info!(
        timeout_mins,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Session expiry job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session expiry job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep(store.as_ref(), timeout_mins).await {
                    Ok(expired) if expired > 0 => {
                        tracing::info!(expired, "Session expiry: failed stale sessions");
                    }
                    Ok(_) => tracing::debug!("Session expiry: nothing to expire"),
                    Err(e) => tracing::error!(error = %e, "Session expiry: sweep failed"),
                }
            }
        }
    }
}

/// Fail every open session created more than `timeout_mins` ago.
pub async fn sweep(store: &dyn OnboardingStore, timeout_mins: i64) -> StoreResult<u64> {
    let cutoff = Utc::now() - chrono::Duration::minutes(timeout_mins);
    store.fail_stale_sessions(cutoff).await
}
