pub mod merchant;
pub mod onboarding_session;
