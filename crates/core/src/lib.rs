//! Domain logic for merchant store onboarding.
//!
//! Nothing in this crate performs I/O: it holds the shared error and id
//! types, the onboarding enums, shop domain normalization, OAuth primitives
//! and the canvas protocol.

pub mod canvas;
pub mod error;
pub mod oauth;
pub mod onboarding;
pub mod shop_domain;
pub mod types;
