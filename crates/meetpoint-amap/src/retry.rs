//! Retry with exponential back-off and jitter for AMap requests.

use std::future::Future;
use std::time::Duration;

use crate::error::AmapError;

/// Network failures, 5xx responses and QPS-limit envelopes are retried;
/// everything else is returned immediately.
pub(crate) fn is_retriable(err: &AmapError) -> bool {
    match err {
        AmapError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        AmapError::Api { .. } => err.is_rate_limited(),
        AmapError::Deserialize { .. }
        | AmapError::Malformed { .. }
        | AmapError::NoRoute
        | AmapError::NotFound(_)
        | AmapError::Config(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts.
///
/// The delay before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 %
/// jitter, capped at 10 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AmapError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AmapError>>,
{
    const MAX_DELAY_MS: u64 = 10_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "AMap transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
