//! Upstream Gemini client for the Fable relay.
mod gemini;
mod retry;
mod types;

pub use gemini::{extract_outcome, to_gemini_contents, GeminiClient, GeminiConfig};
pub use retry::{
    is_retryable_http_error, should_retry_status, transient_backoff_ms, CORRECTION_RETRY_DELAY_MS,
    RETRY_CEILING,
};
pub use types::{
    ChatMessage, ChatRole, GenerateRequest, UpstreamClient, UpstreamError, UpstreamOutcome,
};
