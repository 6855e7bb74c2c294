//! Socket message types.
//!
//! Both directions use JSON text frames shaped `{"type": "<kind>", "payload": …}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::CanvasItem;

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

/// Operations the server issues against the client's content list, plus the
/// celebration side channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Append an item to the content list.
    AddContent(CanvasItem),
    /// Remove every item.
    Clear,
    /// Replace the whole list with a single item.
    Replace(CanvasItem),
    /// Merge fields into the item with the given id.
    Update(ContentUpdate),
    /// Drop the item with the given id.
    Remove(ContentRef),
    /// Show the transient celebration overlay.
    Celebrate(Celebration),
}

impl ServerMessage {
    /// Serialize to the JSON text sent over the socket.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The wire `type` tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::AddContent(_) => "add_content",
            ServerMessage::Clear => "clear",
            ServerMessage::Replace(_) => "replace",
            ServerMessage::Update(_) => "update",
            ServerMessage::Remove(_) => "remove",
            ServerMessage::Celebrate(_) => "celebrate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUpdate {
    pub id: String,
    /// Partial object merged over the existing item's fields.
    pub updates: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Celebration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

/// Events a client may send.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    UserInput(FieldValue),
    UserSelect(FieldValue),
    PlatformConnect(PlatformConnect),
    Action(ActionPayload),
    OauthComplete(OauthComplete),
}

/// Value submitted for a named field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub field_key: String,
    #[serde(default)]
    pub value: Value,
}

impl FieldValue {
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PlatformConnect {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionPayload {
    pub action: String,
}

/// Sent by the client once the OAuth popup reports success.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthComplete {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub shop_domain: Option<String>,
    #[serde(default)]
    pub product_count: Option<u64>,
}

/// Why an inbound frame could not be turned into a [`ClientMessage`].
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Unknown message type '{0}'")]
    UnknownType(String),

    #[error("Invalid payload for '{kind}': {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl ClientMessage {
    /// Parse a JSON text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let Envelope { kind, payload } =
            serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

        // Clients send `oauth_complete` without a payload when the popup
        // could not read the shop details.
        let payload = if payload.is_null() && kind == "oauth_complete" {
            Value::Object(Default::default())
        } else {
            payload
        };

        let invalid = |source| ProtocolError::InvalidPayload {
            kind: kind.clone(),
            source,
        };

        let message = match kind.as_str() {
            "user_input" => ClientMessage::UserInput(from_payload(payload).map_err(invalid)?),
            "user_select" => ClientMessage::UserSelect(from_payload(payload).map_err(invalid)?),
            "platform_connect" => {
                ClientMessage::PlatformConnect(from_payload(payload).map_err(invalid)?)
            }
            "action" => ClientMessage::Action(from_payload(payload).map_err(invalid)?),
            "oauth_complete" => {
                ClientMessage::OauthComplete(from_payload(payload).map_err(invalid)?)
            }
            _ => return Err(ProtocolError::UnknownType(kind.clone())),
        };

        Ok(message)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::UserInput(_) => "user_input",
            ClientMessage::UserSelect(_) => "user_select",
            ClientMessage::PlatformConnect(_) => "platform_connect",
            ClientMessage::Action(_) => "action",
            ClientMessage::OauthComplete(_) => "oauth_complete",
        }
    }
}

fn from_payload<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(payload)
}
