//! Client-side view of the canvas.
//!
//! [`CanvasState::apply`] folds server messages into the displayed list the
//! way a client does. Tests and the socket test harness use it to check what
//! a user would actually see.

use serde_json::Value;

use super::content::CanvasItem;
use super::protocol::{Celebration, ServerMessage};

#[derive(Debug, Clone, Default)]
pub struct CanvasState {
    items: Vec<CanvasItem>,
    /// Last celebration trigger. Lives outside the content list.
    celebration: Option<Celebration>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    pub fn celebration(&self) -> Option<&Celebration> {
        self.celebration.as_ref()
    }

    /// Apply one server message. References to unknown ids are ignored.
    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::AddContent(item) => self.items.push(item.clone()),
            ServerMessage::Clear => self.items.clear(),
            ServerMessage::Replace(item) => self.items = vec![item.clone()],
            ServerMessage::Update(update) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == update.id) {
                    if let Some(merged) = merge_item(item, &update.updates) {
                        *item = merged;
                    }
                }
            }
            ServerMessage::Remove(target) => self.items.retain(|i| i.id != target.id),
            ServerMessage::Celebrate(celebration) => {
                self.celebration = Some(celebration.clone());
            }
        }
    }
}

/// Shallow-merge `updates` over the item's wire form. The id never changes.
/// Returns `None` when the merged object is no longer a valid item.
fn merge_item(item: &CanvasItem, updates: &Value) -> Option<CanvasItem> {
    let Value::Object(patch) = updates else {
        return None;
    };
    let Ok(Value::Object(mut fields)) = serde_json::to_value(item) else {
        return None;
    };

    for (key, value) in patch {
        if key != "id" {
            fields.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(Value::Object(fields)).ok()
}
