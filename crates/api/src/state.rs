use std::sync::Arc;

use storelink_db::store::OnboardingStore;
use storelink_shopify::{ShopifyClient, ShopifyError};

use crate::config::ServerConfig;
use crate::oauth::ShopifyOAuth;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Session and merchant persistence, backend chosen at startup.
    pub store: Arc<dyn OnboardingStore>,
    pub oauth: Arc<ShopifyOAuth>,
    /// Admin API client shared by the verifier and the proxy endpoints.
    pub shopify: ShopifyClient,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
}

impl AppState {
    /// Wire the OAuth engine and Shopify client from `config` over `store`.
    pub fn new(config: ServerConfig, store: Arc<dyn OnboardingStore>) -> Result<Self, ShopifyError> {
        let mut shopify = ShopifyClient::new(config.shopify.api_version.clone())?;
        if let Some(origin) = &config.shopify.api_origin {
            shopify = shopify.with_api_origin(origin.clone());
        }

        let oauth = ShopifyOAuth::new(config.shopify.clone(), Arc::clone(&store), shopify.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            oauth: Arc::new(oauth),
            shopify,
            ws_manager: Arc::new(WsManager::new()),
        })
    }
}
