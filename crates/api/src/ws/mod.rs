//! WebSocket side of the onboarding canvas.
//!
//! Provides connection management, heartbeat monitoring, the schedule
//! player and the HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;
pub mod scheduler;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{ConnectionHandle, WsManager, WsSender};
pub use scheduler::spawn_schedule;
