//! The scripted onboarding conversation.
//!
//! Each segment is a [`Schedule`]: an ordered list of messages paired with a
//! delay measured from the moment the schedule is dispatched. Nothing in
//! here touches a clock; the socket scheduler interprets the delays.

use std::time::Duration;

use super::content::{
    Animation, CanvasContent, CanvasItem, DetailRow, FocusSelectContent, MessageContent,
    PlatformCardContent, SelectOption, SuccessContent,
};
use super::protocol::{Celebration, ServerMessage};
use crate::onboarding::Platform;

/// Field key of the platform selection prompt.
pub const PLATFORM_FIELD: &str = "platform";

/// Action the success card's button triggers.
pub const CONTINUE_SETUP_ACTION: &str = "continue_setup";

/// A message and the offset at which it should be delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledMessage {
    pub delay: Duration,
    pub message: ServerMessage,
}

/// Ordered list of timed messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    items: Vec<ScheduledMessage>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message delivered `delay_ms` after dispatch.
    pub fn at(mut self, delay_ms: u64, message: ServerMessage) -> Self {
        self.items.push(ScheduledMessage {
            delay: Duration::from_millis(delay_ms),
            message,
        });
        self
    }

    /// Append an `add_content` message for a fresh item.
    pub fn add_at(self, delay_ms: u64, content: CanvasContent) -> Self {
        let item = CanvasItem::new(content).with_animation(Animation::SlideUp);
        self.at(delay_ms, ServerMessage::AddContent(item))
    }

    pub fn items(&self) -> &[ScheduledMessage] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Messages in delivery order. Ties keep their insertion order.
    pub fn into_delivery_order(self) -> Vec<ScheduledMessage> {
        let mut ordered = self.items;
        ordered.sort_by_key(|item| item.delay);
        ordered
    }
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// Greeting, explanation, then the platform selection prompt.
pub fn opening() -> Schedule {
    Schedule::new()
        .add_at(
            100,
            CanvasContent::Greeting(MessageContent::new("Welcome aboard! 🚀")),
        )
        .add_at(
            700,
            CanvasContent::Question(MessageContent::new(
                "Let's build you a lightning-fast storefront. We'll start by connecting your current store.",
            )),
        )
        .add_at(1400, CanvasContent::FocusSelect(platform_prompt()))
}

fn platform_prompt() -> FocusSelectContent {
    let option = |platform: Platform, icon: &str, description: &str| SelectOption {
        value: platform.as_str().to_string(),
        label: platform.display_name().to_string(),
        icon: Some(icon.to_string()),
        description: Some(description.to_string()),
    };

    FocusSelectContent {
        label: "Which e-commerce platform do you use?".to_string(),
        field_key: PLATFORM_FIELD.to_string(),
        options: vec![
            option(Platform::Shopify, "🛍️", "The most popular choice"),
            option(Platform::Woocommerce, "🛒", "WordPress based"),
            option(Platform::Custom, "⚙️", "Tell us more"),
        ],
    }
}

/// Acknowledgement followed by the Shopify connection card.
pub fn shopify_connect() -> Schedule {
    Schedule::new()
        .add_at(
            100,
            CanvasContent::Question(MessageContent::new(
                "Great choice! Shopify is our most popular platform. 🎯",
            )),
        )
        .add_at(
            600,
            CanvasContent::PlatformCard(PlatformCardContent {
                platform: Platform::Shopify,
                title: "Connect your Shopify store".to_string(),
                description: "We'll import your products, images and brand automatically."
                    .to_string(),
                features: vec![
                    "✓ Products and collections".to_string(),
                    "✓ Images and media".to_string(),
                    "✓ Orders and customers".to_string(),
                    "✓ Brand details".to_string(),
                ],
                button_text: "Connect Shopify".to_string(),
                connected: None,
                shop_url: None,
                product_count: None,
            }),
        )
}

/// Immediate celebration, then a greeting and the success summary.
pub fn connection_success(shop_domain: Option<&str>, product_count: Option<u64>) -> Schedule {
    let product_count = product_count.unwrap_or(0);
    let subtitle = shop_domain
        .map(str::to_string)
        .unwrap_or_else(|| "Connection established".to_string());

    Schedule::new()
        .at(
            0,
            ServerMessage::Celebrate(Celebration {
                message: Some("Store connected! 🎉".to_string()),
            }),
        )
        .add_at(
            300,
            CanvasContent::Greeting(MessageContent::new("Brilliant! ✨")),
        )
        .add_at(
            800,
            CanvasContent::Success(SuccessContent {
                title: "Store connected!".to_string(),
                subtitle: Some(subtitle),
                details: vec![
                    DetailRow {
                        label: "Status".to_string(),
                        value: "✓ Connected".to_string(),
                    },
                    DetailRow {
                        label: "Products".to_string(),
                        value: format!("{product_count} products"),
                    },
                ],
                next_label: Some("Continue →".to_string()),
                next_action: Some(CONTINUE_SETUP_ACTION.to_string()),
            }),
        )
}
