//! Scripted upstream fake for exercising the orchestrators without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use fable_ai::{GenerateRequest, UpstreamClient, UpstreamError, UpstreamOutcome};

/// One scripted upstream interaction.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Text(String),
    TextWithFinish(String, String),
    Blocked(String),
    Empty,
    Status(u16, String),
}

pub(crate) struct ScriptedUpstream {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedUpstream {
    pub(crate) fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl UpstreamClient for ScriptedUpstream {
    async fn generate(&self, request: &GenerateRequest) -> Result<UpstreamOutcome, UpstreamError> {
        self.calls.lock().expect("calls lock").push(request.clone());
        let step = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .expect("script exhausted: unexpected upstream call");

        match step {
            Step::Text(text) => Ok(UpstreamOutcome::Text {
                text,
                finish_reason: Some("STOP".to_string()),
            }),
            Step::TextWithFinish(text, finish_reason) => Ok(UpstreamOutcome::Text {
                text,
                finish_reason: Some(finish_reason),
            }),
            Step::Blocked(reason) => Ok(UpstreamOutcome::Blocked { reason }),
            Step::Empty => Ok(UpstreamOutcome::Empty),
            Step::Status(status, message) => Err(UpstreamError::Status { status, message }),
        }
    }
}
