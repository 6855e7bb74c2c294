//! Per-connection onboarding state machine.
//!
//! The flow maps inbound [`ClientMessage`]s to the next [`Schedule`] to
//! play. It holds no socket and no timers, so every transition is testable
//! synchronously.

use super::protocol::ClientMessage;
use super::script::{self, Schedule, PLATFORM_FIELD};
use crate::onboarding::Platform;

/// Where a connection is in the scripted conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowStage {
    /// Opening shown, waiting for a platform choice.
    #[default]
    SelectingPlatform,
    /// Connection card shown, waiting for the OAuth round trip.
    ConnectingPlatform(Platform),
    /// Success summary shown.
    Connected,
}

#[derive(Debug, Default)]
pub struct OnboardingFlow {
    stage: FlowStage,
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    /// Schedule played as soon as a connection opens.
    pub fn start(&mut self) -> Schedule {
        self.stage = FlowStage::SelectingPlatform;
        script::opening()
    }

    /// Advance the flow for one inbound message.
    ///
    /// Messages that do not move the conversation forward yield an empty
    /// schedule and leave the stage unchanged.
    pub fn handle(&mut self, message: &ClientMessage) -> Schedule {
        match message {
            ClientMessage::UserSelect(field) if field.field_key == PLATFORM_FIELD => {
                match field.value_str().and_then(|v| v.parse::<Platform>().ok()) {
                    Some(Platform::Shopify) => {
                        self.stage = FlowStage::ConnectingPlatform(Platform::Shopify);
                        script::shopify_connect()
                    }
                    // Only Shopify has a scripted connect segment.
                    _ => Schedule::new(),
                }
            }
            // Accepted in any stage: the popup can finish after a reconnect.
            ClientMessage::OauthComplete(done) => {
                self.stage = FlowStage::Connected;
                script::connection_success(done.shop_domain.as_deref(), done.product_count)
            }
            _ => Schedule::new(),
        }
    }
}
