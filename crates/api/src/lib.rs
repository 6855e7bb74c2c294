//! Storelink API server library.
//!
//! Exposes the building blocks (config, state, error handling, OAuth flow,
//! routes, WebSocket driver) so integration tests and the binary entrypoint
//! can both access them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
