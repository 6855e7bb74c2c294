//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod merchant_repo;
pub mod onboarding_session_repo;

pub use merchant_repo::MerchantRepo;
pub use onboarding_session_repo::OnboardingSessionRepo;
