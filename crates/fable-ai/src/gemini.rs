use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ChatMessage, ChatRole, GenerateRequest, UpstreamClient, UpstreamError, UpstreamOutcome};

#[derive(Debug, Clone)]
/// Connection settings for the Gemini generateContent endpoint.
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
/// Thin HTTP client over the Gemini generateContent API. Issues exactly one
/// network call per [`UpstreamClient::generate`] invocation; retry policy
/// lives with the caller.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self { client, config })
    }

    fn generate_content_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}/models/{model}:generateContent", model = self.config.model)
    }
}

#[async_trait]
impl UpstreamClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<UpstreamOutcome, UpstreamError> {
        let url = self.generate_content_url();
        let body = build_generate_content_body(request);

        tracing::debug!(url = %url, turns = request.messages.len(), "dispatching generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = parse_upstream_error_message(&raw, status.as_u16());
            tracing::error!(status = status.as_u16(), %message, "generateContent request failed");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let raw = response.text().await?;
        tracing::debug!(bytes = raw.len(), "received generateContent response");
        let outcome = extract_outcome(&raw);
        match &outcome {
            UpstreamOutcome::Blocked { reason } => {
                tracing::warn!(%reason, "generateContent response blocked by safety filter");
            }
            UpstreamOutcome::Empty => {
                tracing::warn!("unexpected generateContent response shape, no usable text");
            }
            UpstreamOutcome::Text { .. } => {}
        }
        Ok(outcome)
    }
}

/// Maps the caller's conversation onto Gemini turns, one-to-one and in
/// order: `assistant` becomes `model`, everything else becomes `user`.
pub fn to_gemini_contents(messages: &[ChatMessage]) -> Value {
    Value::Array(
        messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    ChatRole::Assistant => "model",
                    ChatRole::User | ChatRole::System => "user",
                };
                json!({
                    "role": role,
                    "parts": [{ "text": message.content }],
                })
            })
            .collect(),
    )
}

fn build_generate_content_body(request: &GenerateRequest) -> Value {
    json!({
        "contents": to_gemini_contents(&request.messages),
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }],
        },
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_output_tokens,
        },
    })
}

fn parse_upstream_error_message(raw: &str, status: u16) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("AI service request failed (status {status})"))
}

/// Resolves a raw 2xx envelope to an [`UpstreamOutcome`]. Presence is
/// checked at every nesting level; anything unexpected fails closed to
/// [`UpstreamOutcome::Empty`] instead of erroring, since the envelope shape
/// is not contractually guaranteed.
pub fn extract_outcome(raw: &str) -> UpstreamOutcome {
    let Ok(parsed) = serde_json::from_str::<GenerateContentResponse>(raw) else {
        return UpstreamOutcome::Empty;
    };

    let first_candidate = parsed
        .candidates
        .as_ref()
        .and_then(|candidates| candidates.first());

    let text = first_candidate
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.as_ref())
        .and_then(|parts| parts.first())
        .and_then(|part| part.text.as_ref())
        .filter(|text| !text.is_empty());

    if let Some(text) = text {
        return UpstreamOutcome::Text {
            text: text.clone(),
            finish_reason: first_candidate.and_then(|candidate| candidate.finish_reason.clone()),
        };
    }

    if let Some(reason) = parsed
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return UpstreamOutcome::Blocked { reason };
    }

    UpstreamOutcome::Empty
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<GenerateContentCandidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GenerateContentPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentCandidate {
    content: Option<GenerateContentContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentContent {
    parts: Option<Vec<GenerateContentPart>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}
