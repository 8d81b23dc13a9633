use thiserror::Error;

#[derive(Debug, Error)]
/// Caller-visible relay failures. Only transport conditions land here;
/// content-quality conditions always resolve to an assistant reply.
pub enum RelayError {
    /// Transient upstream faults outlived the retry budget.
    #[error("the AI service is currently unavailable (upstream status {status}: {message})")]
    UpstreamUnavailable { status: u16, message: String },
    /// The upstream rejected the request outright; retrying cannot help.
    #[error("the AI service rejected the request (upstream status {status}: {message})")]
    UpstreamRejected { status: u16, message: String },
}

impl RelayError {
    /// HTTP status reported by the upstream, when one was seen.
    pub fn upstream_status(&self) -> u16 {
        match self {
            Self::UpstreamUnavailable { status, .. } | Self::UpstreamRejected { status, .. } => {
                *status
            }
        }
    }
}
