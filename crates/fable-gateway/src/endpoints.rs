//! Shared endpoint constants for the relay surface.

pub(crate) const CHAT_ENDPOINT: &str = "/chat";
pub(crate) const SUMMARIZE_ENDPOINT: &str = "/summarize";
pub(crate) const HEALTH_ENDPOINT: &str = "/healthz";
