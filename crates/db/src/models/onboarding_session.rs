//! Onboarding session entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use storelink_core::onboarding::{Platform, SessionStatus};
use storelink_core::types::{RecordId, Timestamp};

/// A row from the `onboarding_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingSession {
    pub id: RecordId,
    /// CSRF state token sent to the provider.
    pub state: String,
    #[sqlx(try_from = "String")]
    pub platform: Platform,
    pub shop_domain: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: SessionStatus,
    /// Set once the session completes.
    pub merchant_id: Option<RecordId>,
    /// Set when a callback claims the session for its code exchange.
    pub exchange_started_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for starting a new session. Sessions always start as `pending`.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub state: String,
    pub platform: Platform,
    pub shop_domain: Option<String>,
}

/// A guarded status change.
///
/// Applied only when the session's current status is one of
/// `to.predecessors()`. `shop_domain` and `merchant_id` overwrite the stored
/// values when present. Reaching a terminal status stamps `completed_at`.
#[derive(Debug, Clone)]
pub struct SessionTransition {
    pub to: SessionStatus,
    pub shop_domain: Option<String>,
    pub merchant_id: Option<RecordId>,
}

impl SessionTransition {
    pub fn to(status: SessionStatus) -> Self {
        Self {
            to: status,
            shop_domain: None,
            merchant_id: None,
        }
    }

    pub fn with_shop_domain(mut self, shop_domain: impl Into<String>) -> Self {
        self.shop_domain = Some(shop_domain.into());
        self
    }

    pub fn with_merchant(mut self, merchant_id: RecordId) -> Self {
        self.merchant_id = Some(merchant_id);
        self
    }
}
