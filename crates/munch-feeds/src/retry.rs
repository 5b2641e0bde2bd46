//! Exponential backoff for transient fetch failures.

use std::future::Future;
use std::time::Duration;

use crate::error::FeedError;

/// Network failures, 429s, and 5xx responses are worth another attempt.
/// Everything else (bad URL, 4xx, a body that is not a feed) will fail the
/// same way again.
fn is_retriable(err: &FeedError) -> bool {
    match err {
        FeedError::Http(_) | FeedError::RateLimited { .. } => true,
        FeedError::UnexpectedStatus { status, .. } => *status >= 500,
        FeedError::InvalidUrl { .. }
        | FeedError::BodyTooLarge { .. }
        | FeedError::InvalidFeed { .. } => false,
    }
}

/// Run `operation`, retrying transient errors up to `max_retries` more times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds. With `max_retries = 2` the operation runs at most 3 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient feed fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
