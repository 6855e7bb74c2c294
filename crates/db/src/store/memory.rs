use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use storelink_core::onboarding::SessionStatus;
use storelink_core::types::{new_record_id, RecordId, Timestamp};

use super::{OnboardingStore, StoreError, StoreResult};
use crate::models::merchant::{Merchant, UpsertMerchant};
use crate::models::onboarding_session::{CreateSession, OnboardingSession, SessionTransition};

/// In-memory backend backed by concurrent hash maps.
///
/// Every mutation happens under the shard lock of the key it touches, which
/// gives the same per-key atomicity as the Postgres statements.
#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<RecordId, OnboardingSession>,
    /// State token -> session id.
    states: DashMap<String, RecordId>,
    /// Shop domain -> merchant.
    merchants: DashMap<String, Merchant>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn merchant_count(&self) -> usize {
        self.merchants.len()
    }
}

fn apply_transition(session: &mut OnboardingSession, change: &SessionTransition, now: Timestamp) {
    session.status = change.to;
    if let Some(domain) = &change.shop_domain {
        session.shop_domain = Some(domain.clone());
    }
    if let Some(merchant_id) = change.merchant_id {
        session.merchant_id = Some(merchant_id);
    }
    if change.to.is_terminal() {
        session.completed_at = Some(now);
    }
    session.updated_at = now;
}

#[async_trait]
impl OnboardingStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_session(&self, input: &CreateSession) -> StoreResult<OnboardingSession> {
        let now = Utc::now();
        let session = OnboardingSession {
            id: new_record_id(),
            state: input.state.clone(),
            platform: input.platform,
            shop_domain: input.shop_domain.clone(),
            status: SessionStatus::Pending,
            merchant_id: None,
            exchange_started_at: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        // Claim the state token first so two sessions can never share one.
        match self.states.entry(input.state.clone()) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateState),
            Entry::Vacant(slot) => {
                self.sessions.insert(session.id, session.clone());
                slot.insert(session.id);
            }
        }

        Ok(session)
    }

    async fn find_session_by_state(&self, state: &str) -> StoreResult<Option<OnboardingSession>> {
        let Some(id) = self.states.get(state).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.sessions.get(&id).map(|entry| entry.value().clone()))
    }

    async fn transition_session(
        &self,
        id: RecordId,
        change: &SessionTransition,
    ) -> StoreResult<Option<OnboardingSession>> {
        let Some(mut session) = self.sessions.get_mut(&id) else {
            return Ok(None);
        };
        if !session.status.can_transition_to(change.to) {
            return Ok(None);
        }

        apply_transition(&mut session, change, Utc::now());
        Ok(Some(session.clone()))
    }

    async fn claim_session_for_exchange(
        &self,
        id: RecordId,
    ) -> StoreResult<Option<OnboardingSession>> {
        let Some(mut session) = self.sessions.get_mut(&id) else {
            return Ok(None);
        };
        if session.status != SessionStatus::InProgress || session.exchange_started_at.is_some() {
            return Ok(None);
        }

        let now = Utc::now();
        session.exchange_started_at = Some(now);
        session.updated_at = now;
        Ok(Some(session.clone()))
    }

    async fn fail_stale_sessions(&self, cutoff: Timestamp) -> StoreResult<u64> {
        let now = Utc::now();
        let change = SessionTransition::to(SessionStatus::Failed);
        let mut expired = 0;

        for mut entry in self.sessions.iter_mut() {
            let session = entry.value_mut();
            if !session.status.is_terminal() && session.created_at < cutoff {
                apply_transition(session, &change, now);
                expired += 1;
            }
        }

        Ok(expired)
    }

    async fn upsert_merchant(&self, input: &UpsertMerchant) -> StoreResult<Merchant> {
        let now = Utc::now();
        let merchant = self
            .merchants
            .entry(input.shop_domain.clone())
            .and_modify(|existing| {
                existing.access_token = input.access_token.clone();
                existing.scope = input.scope.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| Merchant {
                id: new_record_id(),
                shop_domain: input.shop_domain.clone(),
                platform: input.platform,
                access_token: input.access_token.clone(),
                scope: input.scope.clone(),
                onboarding_completed: false,
                metadata: serde_json::json!({}),
                created_at: now,
                updated_at: now,
            })
            .value()
            .clone();

        Ok(merchant)
    }

    async fn find_merchant_by_domain(&self, shop_domain: &str) -> StoreResult<Option<Merchant>> {
        Ok(self
            .merchants
            .get(shop_domain)
            .map(|entry| entry.value().clone()))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
