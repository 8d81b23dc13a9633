//! Response-reliability layer of the Fable relay.
//!
//! Two sibling orchestrators drive the upstream client: [`run_chat`] owns the
//! full state machine (transient retry plus the JSON self-correction loop),
//! [`run_summarize`] reuses the transient half for free-text summaries.
mod error;
mod reliability;
mod summarize;

#[cfg(test)]
mod test_support;

pub use error::RelayError;
pub use reliability::run_chat;
pub use summarize::run_summarize;
