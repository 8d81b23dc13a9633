//! Summarization orchestrator: the transient-retry half of the chat state
//! machine, specialized for free-text summaries.

use tokio::time::sleep;

use fable_ai::{ChatMessage, GenerateRequest, UpstreamClient, UpstreamOutcome};
use fable_core::{
    MAX_OUTPUT_TOKENS, NO_PREVIOUS_SUMMARY_PLACEHOLDER, SUMMARIZE_HISTORY_INSTRUCTION, TEMPERATURE,
};

use crate::reliability::{next_transport_step, RetryBudget};
use crate::RelayError;

pub(crate) fn blocked_summary(reason: &str) -> String {
    format!("[Summarization was blocked by the safety filter: {reason}]")
}

/// Compresses the recent message window into an updated summary.
///
/// The existing summary (or a placeholder) leads the upstream conversation
/// as a system-role turn. Content-shape problems never fail the caller: an
/// empty envelope degrades to returning the existing summary unchanged, and
/// a block degrades to a bracketed notice. Only transport conditions error.
pub async fn run_summarize(
    client: &dyn UpstreamClient,
    messages: &[ChatMessage],
    existing_summary: Option<&str>,
) -> Result<String, RelayError> {
    let seed = existing_summary
        .filter(|summary| !summary.is_empty())
        .unwrap_or(NO_PREVIOUS_SUMMARY_PLACEHOLDER);

    let mut conversation = Vec::with_capacity(messages.len() + 1);
    conversation.push(ChatMessage::system(seed));
    conversation.extend(messages.iter().cloned());

    let request = GenerateRequest {
        messages: conversation,
        system_instruction: SUMMARIZE_HISTORY_INSTRUCTION.to_string(),
        temperature: TEMPERATURE,
        max_output_tokens: MAX_OUTPUT_TOKENS,
    };

    let mut budget = RetryBudget::new();
    loop {
        let outcome = match client.generate(&request).await {
            Ok(outcome) => outcome,
            Err(error) => {
                let delay = next_transport_step(&error, &mut budget)?;
                sleep(delay).await;
                continue;
            }
        };

        return Ok(match outcome {
            UpstreamOutcome::Text {
                text,
                finish_reason,
            } => {
                if finish_reason.as_deref() == Some("MAX_TOKENS") {
                    tracing::warn!("summary generation stopped at the output-length ceiling");
                }
                text
            }
            UpstreamOutcome::Blocked { reason } => {
                tracing::warn!(%reason, "summarization blocked by safety filter");
                blocked_summary(&reason)
            }
            UpstreamOutcome::Empty => {
                tracing::warn!("empty summarization response, keeping the existing summary");
                existing_summary.unwrap_or_default().to_string()
            }
        });
    }
}
