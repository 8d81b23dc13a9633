//! Chat-path state machine: transient retry plus JSON self-correction.

use tokio::time::{sleep, Duration};

use fable_ai::{
    transient_backoff_ms, ChatMessage, GenerateRequest, UpstreamClient, UpstreamError,
    UpstreamOutcome, RETRY_CEILING,
};
use fable_core::{
    CORRECTION_INSTRUCTION, DUNGEON_MASTER_INSTRUCTION, MAX_OUTPUT_TOKENS, TEMPERATURE,
};

use crate::RelayError;

pub(crate) const CORRECTION_DELAY: Duration =
    Duration::from_millis(fable_ai::CORRECTION_RETRY_DELAY_MS);

/// Fixed reply when the safety filter suppressed generation.
pub(crate) fn blocked_reply(reason: &str) -> String {
    format!("My response was blocked. Reason: {reason}.")
}

/// Fixed reply when the upstream envelope carried nothing usable.
pub(crate) const EMPTY_REPLY: &str = "Sorry, I couldn't understand the AI's response.";

/// Fixed reply after the correction budget runs out. Content-shape
/// exhaustion degrades gracefully instead of erroring.
pub(crate) const FORMAT_APOLOGY_REPLY: &str =
    "Sorry, I'm having trouble formatting my response right now. Please try again in a moment.";

/// Independent retry counters. Transport retries and content-shape retries
/// have different remediation and different severity, so neither counter
/// ever consumes the other.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryBudget {
    pub(crate) transient_attempts_left: usize,
    pub(crate) correction_attempts_left: usize,
}

impl RetryBudget {
    pub(crate) fn new() -> Self {
        Self {
            transient_attempts_left: RETRY_CEILING,
            correction_attempts_left: RETRY_CEILING,
        }
    }
}

pub(crate) fn upstream_detail(error: &UpstreamError) -> (u16, String) {
    match error {
        UpstreamError::Status { status, message } => (*status, message.clone()),
        other => (other.status().unwrap_or(502), other.to_string()),
    }
}

/// Decides what to do with a transport failure: either the backoff delay to
/// wait before the next attempt, or the error to surface. Decrements the
/// transient counter when a retry is granted.
pub(crate) fn next_transport_step(
    error: &UpstreamError,
    budget: &mut RetryBudget,
) -> Result<Duration, RelayError> {
    let (status, message) = upstream_detail(error);
    if !error.is_transient() {
        return Err(RelayError::UpstreamRejected { status, message });
    }

    if budget.transient_attempts_left == 0 {
        return Err(RelayError::UpstreamUnavailable { status, message });
    }

    let delay_ms = transient_backoff_ms(RETRY_CEILING, budget.transient_attempts_left);
    tracing::warn!(
        status,
        delay_ms,
        attempts_left = budget.transient_attempts_left,
        "transient upstream failure, backing off"
    );
    budget.transient_attempts_left -= 1;
    Ok(Duration::from_millis(delay_ms))
}

/// Runs one caller conversation to a single assistant reply.
///
/// Explicit loop over `(conversation, budget, correction_pending)`; the
/// correction instruction is appended at most once per call chain, so the
/// model sees its rejected reply exactly once no matter how many correction
/// retries follow.
pub async fn run_chat(
    client: &dyn UpstreamClient,
    mut conversation: Vec<ChatMessage>,
) -> Result<ChatMessage, RelayError> {
    let mut budget = RetryBudget::new();
    let mut correction_pending = false;
    let mut correction_appended = false;

    loop {
        if correction_pending && !correction_appended {
            conversation.push(ChatMessage::user(CORRECTION_INSTRUCTION));
            correction_appended = true;
        }
        correction_pending = false;

        let request = GenerateRequest {
            messages: conversation.clone(),
            system_instruction: DUNGEON_MASTER_INSTRUCTION.to_string(),
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        let outcome = match client.generate(&request).await {
            Ok(outcome) => outcome,
            Err(error) => {
                let delay = next_transport_step(&error, &mut budget)?;
                sleep(delay).await;
                continue;
            }
        };

        match outcome {
            UpstreamOutcome::Blocked { reason } => {
                return Ok(ChatMessage::assistant(blocked_reply(&reason)));
            }
            UpstreamOutcome::Empty => {
                return Ok(ChatMessage::assistant(EMPTY_REPLY));
            }
            UpstreamOutcome::Text { text, .. } => {
                if serde_json::from_str::<serde_json::Value>(&text).is_ok() {
                    return Ok(ChatMessage::assistant(text));
                }

                if budget.correction_attempts_left == 0 {
                    tracing::error!("model never produced valid JSON, returning fallback reply");
                    return Ok(ChatMessage::assistant(FORMAT_APOLOGY_REPLY));
                }

                tracing::warn!(
                    attempts_left = budget.correction_attempts_left,
                    "model reply was not valid JSON, scheduling correction retry"
                );
                budget.correction_attempts_left -= 1;
                correction_pending = true;
                sleep(CORRECTION_DELAY).await;
            }
        }
    }
}
