use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{AppError, Result};

/// Re-invoke `call` until it produces anything other than `RateLimited`,
/// sleeping for `backoff` between attempts. There is deliberately no attempt
/// ceiling: upstream throttling is the only condition retried, and the caller
/// can only make progress by waiting it out. Every other outcome, success or
/// error, returns immediately.
pub async fn with_rate_limit_retry<T, F, Fut>(backoff: Duration, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    loop {
        match call().await {
            Err(AppError::RateLimited) => {
                warn!(backoff_secs = backoff.as_secs(), "rate limited, backing off");
                tokio::time::sleep(backoff).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn retries_through_rate_limits_then_returns_success() {
        let attempts = Cell::new(0u32);
        let backoff = Duration::from_secs(125);
        let start = tokio::time::Instant::now();

        let value = with_rate_limit_retry(backoff, || {
            let n = attempts.get() + 1;
            attempts.set(n);
            async move {
                if n <= 3 {
                    Err(AppError::RateLimited)
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 4);
        assert_eq!(attempts.get(), 4);
        // three rate-limited attempts, three full backoff waits
        assert_eq!(start.elapsed(), Duration::from_secs(3 * 125));
    }

    #[tokio::test(start_paused = true)]
    async fn remote_failure_propagates_without_waiting() {
        let attempts = Cell::new(0u32);
        let start = tokio::time::Instant::now();

        let err = with_rate_limit_retry(Duration::from_secs(125), || {
            attempts.set(attempts.get() + 1);
            async {
                Err::<(), _>(AppError::Remote {
                    status: 500,
                    reason: "Internal Server Error".to_string(),
                    url: "https://example.com/coins/list".to_string(),
                })
            }
        })
        .await
        .unwrap_err();

        assert_eq!(attempts.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        match err {
            AppError::Remote { status, .. } => assert_eq!(status, 500),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success_makes_one_attempt() {
        let attempts = Cell::new(0u32);
        let value = with_rate_limit_retry(Duration::from_secs(125), || {
            attempts.set(attempts.get() + 1);
            async { Ok(42) }
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(attempts.get(), 1);
    }
}
