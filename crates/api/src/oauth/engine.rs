use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use storelink_core::oauth::{
    generate_state_token, shopify_scope_param, verify_callback_hmac, HMAC_PARAM,
};
use storelink_core::onboarding::{Platform, SessionStatus};
use storelink_core::shop_domain::parse_shop_domain;
use storelink_core::types::RecordId;
use storelink_db::models::merchant::UpsertMerchant;
use storelink_db::models::onboarding_session::{
    CreateSession, OnboardingSession, SessionTransition,
};
use storelink_db::store::OnboardingStore;
use storelink_shopify::{authorize_url, AuthorizeParams, ShopifyClient};

use super::OAuthError;
use crate::config::ShopifyConfig;

/// Result of starting an authorization.
#[derive(Debug, Clone)]
pub struct AuthorizationStart {
    /// Where to send the merchant's browser.
    pub auth_url: String,
    pub state: String,
    pub shop_domain: String,
    pub session_id: RecordId,
}

/// Credentials obtained from a successful code exchange.
#[derive(Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub scope: String,
    pub shop_domain: String,
    pub merchant_id: RecordId,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .field("shop_domain", &self.shop_domain)
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}

/// Shopify authorization-code flow over an [`OnboardingStore`].
pub struct ShopifyOAuth {
    config: ShopifyConfig,
    store: Arc<dyn OnboardingStore>,
    client: ShopifyClient,
}

impl ShopifyOAuth {
    pub fn new(config: ShopifyConfig, store: Arc<dyn OnboardingStore>, client: ShopifyClient) -> Self {
        Self {
            config,
            store,
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    fn credentials(&self) -> Result<(&str, &str), OAuthError> {
        match (&self.config.client_id, &self.config.client_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(OAuthError::NotConfigured),
        }
    }

    /// Start an authorization for the store the merchant typed in.
    ///
    /// Creates a `pending` session under a fresh state token, attaches the
    /// normalized domain (moving it to `in_progress`) and returns the
    /// provider URL carrying that token. Fails with
    /// [`OAuthError::NotConfigured`] before touching the store when the
    /// client id is unset.
    pub async fn generate_auth_url(&self, raw_shop: &str) -> Result<AuthorizationStart, OAuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(OAuthError::NotConfigured)?;
        let shop_domain =
            parse_shop_domain(raw_shop).map_err(|e| OAuthError::InvalidDomain(e.to_string()))?;

        let state = generate_state_token();
        let session = self
            .store
            .create_session(&CreateSession {
                state: state.clone(),
                platform: Platform::Shopify,
                shop_domain: None,
            })
            .await?;

        let session = self
            .transition(
                &session,
                SessionTransition::to(SessionStatus::InProgress).with_shop_domain(&shop_domain),
            )
            .await?
            .ok_or(OAuthError::InvalidState)?;

        let scope = shopify_scope_param();
        let url = authorize_url(
            &shop_domain,
            &AuthorizeParams {
                client_id,
                scope: &scope,
                redirect_uri: &self.config.callback_url,
                state: &state,
            },
        )
        .map_err(|e| OAuthError::InvalidDomain(e.to_string()))?;

        tracing::info!(
            shop = %shop_domain,
            session_id = %session.id,
            "Started Shopify authorization"
        );

        Ok(AuthorizationStart {
            auth_url: url.into(),
            state,
            shop_domain,
            session_id: session.id,
        })
    }

    /// Check the callback signature.
    ///
    /// A present signature must verify. An absent one is accepted unless
    /// `require_hmac` is set.
    pub fn verify_callback(&self, params: &BTreeMap<String, String>) -> Result<(), OAuthError> {
        if !params.contains_key(HMAC_PARAM) {
            if self.config.require_hmac {
                tracing::warn!("Callback without hmac rejected: possible forged callback");
                return Err(OAuthError::InvalidHmac);
            }
            return Ok(());
        }

        let secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or(OAuthError::NotConfigured)?;

        if verify_callback_hmac(secret, params) {
            Ok(())
        } else {
            tracing::warn!(
                shop = params.get("shop").map(String::as_str).unwrap_or_default(),
                "Callback hmac mismatch: possible forged callback"
            );
            Err(OAuthError::InvalidHmac)
        }
    }

    /// Fail the session behind a callback whose signature did not verify.
    ///
    /// Unknown state tokens are left alone.
    pub async fn reject_callback(&self, state: &str) {
        match self.store.find_session_by_state(state).await {
            Ok(Some(session)) => self.fail(&session).await,
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Failed to look up rejected callback session"),
        }
    }

    /// Run [`exchange_code_for_token`](Self::exchange_code_for_token) on its
    /// own task so the session still resolves if the caller is dropped.
    pub async fn exchange_detached(
        self: Arc<Self>,
        shop: String,
        code: String,
        state: String,
    ) -> Result<TokenGrant, OAuthError> {
        let task = tokio::spawn(async move {
            self.exchange_code_for_token(&shop, &code, &state).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Token exchange task aborted");
                Err(OAuthError::ExchangeFailed)
            }
        }
    }

    /// Exchange an authorization code for a token and record the merchant.
    ///
    /// The state token must name an `in_progress` session for the same shop,
    /// and only the first callback to claim the session may exchange. An
    /// unknown token is rejected without any store mutation. Once the
    /// session is claimed, every failure resolves it to `failed`.
    pub async fn exchange_code_for_token(
        &self,
        raw_shop: &str,
        code: &str,
        state: &str,
    ) -> Result<TokenGrant, OAuthError> {
        let (client_id, client_secret) = self.credentials()?;

        let Some(session) = self.store.find_session_by_state(state).await? else {
            tracing::warn!(shop = raw_shop, "Unknown OAuth state: possible forged callback");
            return Err(OAuthError::InvalidState);
        };

        if session.status != SessionStatus::InProgress {
            tracing::warn!(
                session_id = %session.id,
                status = %session.status,
                "OAuth state reused"
            );
            return Err(OAuthError::InvalidState);
        }

        let shop_domain = match parse_shop_domain(raw_shop) {
            Ok(domain) if session.shop_domain.as_deref() == Some(domain.as_str()) => domain,
            _ => {
                tracing::warn!(
                    session_id = %session.id,
                    shop = raw_shop,
                    "Callback shop does not match the session"
                );
                self.fail(&session).await;
                return Err(OAuthError::InvalidState);
            }
        };

        let Some(session) = self.store.claim_session_for_exchange(session.id).await? else {
            // Another callback with this state is already exchanging.
            tracing::warn!(session_id = %session.id, "OAuth state reused");
            return Err(OAuthError::InvalidState);
        };

        let token = match self
            .client
            .exchange_code(&shop_domain, client_id, client_secret, code)
            .await
        {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(shop = %shop_domain, error = %e, "Token exchange failed");
                self.fail(&session).await;
                return Err(OAuthError::ExchangeFailed);
            }
        };

        let merchant = match self
            .store
            .upsert_merchant(&UpsertMerchant {
                shop_domain: shop_domain.clone(),
                platform: Platform::Shopify,
                access_token: token.access_token.clone(),
                scope: token.scope.clone(),
            })
            .await
        {
            Ok(merchant) => merchant,
            Err(e) => {
                self.fail(&session).await;
                return Err(e.into());
            }
        };

        let completed = self
            .transition(
                &session,
                SessionTransition::to(SessionStatus::Completed).with_merchant(merchant.id),
            )
            .await?;
        if completed.is_none() {
            // Expired while the exchange was in flight.
            tracing::warn!(session_id = %session.id, "Session resolved concurrently");
            return Err(OAuthError::InvalidState);
        }

        tracing::info!(
            shop = %shop_domain,
            merchant_id = %merchant.id,
            scope = %token.scope,
            "Shopify store connected"
        );

        Ok(TokenGrant {
            access_token: token.access_token,
            scope: token.scope,
            shop_domain,
            merchant_id: merchant.id,
        })
    }

    async fn transition(
        &self,
        session: &OnboardingSession,
        change: SessionTransition,
    ) -> Result<Option<OnboardingSession>, OAuthError> {
        Ok(self.store.transition_session(session.id, &change).await?)
    }

    /// Best-effort move to `failed`; the caller is already returning an error.
    async fn fail(&self, session: &OnboardingSession) {
        let change = SessionTransition::to(SessionStatus::Failed);
        if let Err(e) = self.store.transition_session(session.id, &change).await {
            tracing::error!(session_id = %session.id, error = %e, "Failed to mark session failed");
        }
    }
}
