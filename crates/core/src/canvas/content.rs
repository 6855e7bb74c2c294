//! Content items the server asks the client to render.
//!
//! Every item is a [`CanvasItem`]: a unique `id`, optional presentation
//! hints, and a [`CanvasContent`] body tagged by `"type"`. On the wire the
//! body is flattened into the item:
//!
//! ```json
//! {"id": "…", "type": "focus_select", "label": "…", "fieldKey": "platform", "options": […]}
//! ```

use serde::{Deserialize, Serialize};

use crate::onboarding::Platform;

/// Entry animation hint for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Animation {
    FadeIn,
    SlideUp,
    SlideLeft,
    Scale,
    None,
}

/// A single renderable item with its identity and presentation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasItem {
    pub id: String,
    #[serde(flatten)]
    pub content: CanvasContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    /// Client-side render delay in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

impl CanvasItem {
    /// Wrap content in a new item with a freshly generated id.
    pub fn new(content: CanvasContent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            animation: None,
            delay: None,
        }
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// The wire `type` tag of this item.
    pub fn kind(&self) -> &'static str {
        self.content.kind()
    }
}

/// Tagged union of every content kind the client knows how to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasContent {
    // -- Canvas UI ------------------------------------------------------------
    Message(MessageContent),
    Greeting(MessageContent),
    Question(MessageContent),
    FocusInput(FocusInputContent),
    FocusSelect(FocusSelectContent),
    PlatformCard(PlatformCardContent),
    Success(SuccessContent),
    Progress(ProgressContent),
    Loading(LoadingContent),
    Celebration(CelebrationContent),

    // -- Chat-style UI --------------------------------------------------------
    ChatBubble(ChatBubble),
    ActionButton(ActionButton),
    OauthCard(OauthCard),
    FormField(FormField),
    SelectField(SelectField),
    ProgressIndicator(ProgressIndicator),
    InfoPanel(InfoPanel),
}

impl CanvasContent {
    pub fn kind(&self) -> &'static str {
        match self {
            CanvasContent::Message(_) => "message",
            CanvasContent::Greeting(_) => "greeting",
            CanvasContent::Question(_) => "question",
            CanvasContent::FocusInput(_) => "focus_input",
            CanvasContent::FocusSelect(_) => "focus_select",
            CanvasContent::PlatformCard(_) => "platform_card",
            CanvasContent::Success(_) => "success",
            CanvasContent::Progress(_) => "progress",
            CanvasContent::Loading(_) => "loading",
            CanvasContent::Celebration(_) => "celebration",
            CanvasContent::ChatBubble(_) => "chat_bubble",
            CanvasContent::ActionButton(_) => "action_button",
            CanvasContent::OauthCard(_) => "oauth_card",
            CanvasContent::FormField(_) => "form_field",
            CanvasContent::SelectField(_) => "select_field",
            CanvasContent::ProgressIndicator(_) => "progress_indicator",
            CanvasContent::InfoPanel(_) => "info_panel",
        }
    }
}

// ---------------------------------------------------------------------------
// Canvas UI payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    pub text: String,
}

impl MessageContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One text input, shown on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusInputContent {
    pub label: String,
    pub field_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
}

/// One single-choice question, shown on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSelectContent {
    pub label: String,
    pub field_key: String,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Card inviting the merchant to connect a specific platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCardContent {
    pub platform: Platform,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub button_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessContent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub details: Vec<DetailRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressContent {
    pub steps: Vec<String>,
    pub current_step: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_labels: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingContent {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelebrationContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confetti: Option<bool>,
    /// Overlay duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

// ---------------------------------------------------------------------------
// Chat-style UI payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBubble {
    pub message: String,
    pub is_agent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCard {
    pub platform: Platform,
    pub title: String,
    pub description: String,
    pub button_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub field_type: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectField {
    pub label: String,
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressIndicator {
    pub steps: Vec<String>,
    pub current_step: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoPanel {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_flattens_type_tag_and_camel_cases_fields() {
        let item = CanvasItem::new(CanvasContent::FocusSelect(FocusSelectContent {
            label: "Pick one".into(),
            field_key: "platform".into(),
            options: vec![SelectOption {
                value: "shopify".into(),
                label: "Shopify".into(),
                icon: None,
                description: None,
            }],
        }));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "focus_select");
        assert_eq!(json["fieldKey"], "platform");
        assert_eq!(json["options"][0]["value"], "shopify");
        assert_eq!(json["id"], item.id.as_str());
        assert!(json.get("animation").is_none());
    }

    #[test]
    fn item_deserializes_from_wire_shape() {
        let raw = r#"{"id":"abc","type":"greeting","text":"Hi","animation":"slideUp"}"#;
        let item: CanvasItem = serde_json::from_str(raw).unwrap();

        assert_eq!(item.id, "abc");
        assert_eq!(item.kind(), "greeting");
        assert_eq!(item.animation, Some(Animation::SlideUp));
        assert_eq!(item.content, CanvasContent::Greeting(MessageContent::new("Hi")));
    }

    #[test]
    fn fresh_items_get_distinct_ids() {
        let a = CanvasItem::new(CanvasContent::Message(MessageContent::new("a")));
        let b = CanvasItem::new(CanvasContent::Message(MessageContent::new("a")));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn chat_components_use_their_own_tags() {
        let item = CanvasItem::new(CanvasContent::ChatBubble(ChatBubble {
            message: "Hello".into(),
            is_agent: true,
            timestamp: None,
        }));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "chat_bubble");
        assert_eq!(json["isAgent"], true);
    }
}
