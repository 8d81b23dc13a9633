use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::{is_retryable_http_error, should_retry_status};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Roles a conversation turn can carry on the caller side.
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// One turn of the caller's conversation. Order is chronological and
/// semantically meaningful; turns are never mutated once submitted.
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One upstream generateContent request, constructed fresh per attempt.
pub struct GenerateRequest {
    pub messages: Vec<ChatMessage>,
    pub system_instruction: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a 2xx upstream envelope resolved to, decided once at the boundary.
pub enum UpstreamOutcome {
    /// The first candidate carried text. `finish_reason` is passed through so
    /// callers can tell a natural stop from an output-length cutoff.
    Text {
        text: String,
        finish_reason: Option<String>,
    },
    /// The safety system suppressed generation. A content outcome, not an
    /// error.
    Blocked { reason: String },
    /// Structurally valid envelope with no usable text and no block reason.
    Empty,
}

#[derive(Debug, Error)]
/// Transport-level failures talking to the upstream model.
pub enum UpstreamError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },
}

impl UpstreamError {
    /// Whether waiting and repeating the same request may resolve the
    /// failure. Rate limits and server faults qualify; caller mistakes
    /// (4xx other than 429) never do.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::MissingApiKey => false,
            Self::Http(error) => is_retryable_http_error(error),
            Self::Status { status, .. } => should_retry_status(*status),
        }
    }

    /// Upstream HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(error) => error.status().map(|status| status.as_u16()),
            Self::MissingApiKey => None,
        }
    }
}

#[async_trait]
/// Seam between the reliability layer and the concrete Gemini client.
pub trait UpstreamClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<UpstreamOutcome, UpstreamError>;
}
