//! Server-driven canvas UI: content items, socket messages, the scripted
//! conversation and the per-connection flow.

pub mod content;
pub mod flow;
pub mod protocol;
pub mod script;
pub mod state;

pub use content::{Animation, CanvasContent, CanvasItem};
pub use flow::{FlowStage, OnboardingFlow};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use script::{Schedule, ScheduledMessage};
pub use state::CanvasState;
