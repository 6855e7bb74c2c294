//! Onboarding platforms and session lifecycle rules.
//!
//! A session moves `pending -> in_progress -> {completed | failed}`. The
//! terminal statuses have no outgoing transitions. Storage backends apply a
//! transition only when the current status is one of
//! [`SessionStatus::predecessors`] of the target, which keeps the progression
//! monotonic without a read-then-write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// E-commerce platforms a merchant can onboard from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Shopify,
    Woocommerce,
    Magento,
    Custom,
}

impl Platform {
    /// All platforms, in the order they are offered to the merchant.
    pub const ALL: [Platform; 4] = [
        Platform::Shopify,
        Platform::Woocommerce,
        Platform::Magento,
        Platform::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Shopify => "shopify",
            Platform::Woocommerce => "woocommerce",
            Platform::Magento => "magento",
            Platform::Custom => "custom",
        }
    }

    /// Human-readable platform name.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Shopify => "Shopify",
            Platform::Woocommerce => "WooCommerce",
            Platform::Magento => "Magento",
            Platform::Custom => "Other platform",
        }
    }

    /// Whether this platform has an OAuth authorization-code integration.
    pub fn supports_oauth(self) -> bool {
        matches!(self, Platform::Shopify)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown platform '{s}'")))
    }
}

impl TryFrom<String> for Platform {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an onboarding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    /// Completed and failed sessions never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    /// Statuses from which a session may move into `self`.
    ///
    /// `Failed` is reachable from `Pending` as well so that abandoned
    /// sessions can be expired before a domain was ever attached.
    pub fn predecessors(self) -> &'static [SessionStatus] {
        match self {
            SessionStatus::Pending => &[],
            SessionStatus::InProgress => &[SessionStatus::Pending],
            SessionStatus::Completed => &[SessionStatus::InProgress],
            SessionStatus::Failed => &[SessionStatus::Pending, SessionStatus::InProgress],
        }
    }

    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        next.predecessors().contains(&self)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown session status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for SessionStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_str() {
        for p in Platform::ALL {
            assert_eq!(p.as_str().parse::<Platform>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_platform_is_rejected() {
        assert!("bigcommerce".parse::<Platform>().is_err());
    }

    #[test]
    fn only_shopify_supports_oauth() {
        let oauth: Vec<_> = Platform::ALL
            .into_iter()
            .filter(|p| p.supports_oauth())
            .collect();
        assert_eq!(oauth, vec![Platform::Shopify]);
    }

    #[test]
    fn forward_transitions_are_allowed() {
        use SessionStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Failed));
        assert!(Pending.can_transition_to(Failed));
    }

    #[test]
    fn terminal_statuses_have_no_outgoing_transitions() {
        use SessionStatus::*;
        for terminal in [Completed, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, InProgress, Completed, Failed] {
                assert!(
                    !terminal.can_transition_to(next),
                    "{terminal} -> {next} must be rejected"
                );
            }
        }
    }

    #[test]
    fn backwards_and_skipping_transitions_are_rejected() {
        use SessionStatus::*;
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(InProgress));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(
            "in_progress".parse::<SessionStatus>().unwrap(),
            SessionStatus::InProgress
        );
    }
}
