//! Retry classification and backoff math for the reliability layer.

/// Initial value of both retry budgets (transient and correction).
pub const RETRY_CEILING: usize = 3;

/// Fixed delay before re-prompting after a non-JSON reply.
pub const CORRECTION_RETRY_DELAY_MS: u64 = 1_000;

const TRANSIENT_BACKOFF_BASE_MS: u64 = 1_000;

/// Rate limiting and server-side faults are worth repeating; every other
/// non-2xx status is final.
pub fn should_retry_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Exponential backoff over the remaining transient budget: with a ceiling
/// of 3 the successive delays are 1s, 2s, 4s.
pub fn transient_backoff_ms(ceiling: usize, attempts_left: usize) -> u64 {
    let consumed = ceiling.saturating_sub(attempts_left).min(12);
    TRANSIENT_BACKOFF_BASE_MS.saturating_mul(1_u64 << consumed)
}

pub fn is_retryable_http_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}
