//! Retry policy for AWDB requests.

use log::warn;
use snotel_core::client::{ClientError, FetchOutcome};
use std::future::Future;
use std::time::Duration;

/// Run `attempt` until it returns something other than a transient failure,
/// at most `retries + 1` times. The wait before retry `n` is `n * pause`.
/// The last transient failure is returned as-is once retries run out;
/// `NotFound` and errors are never retried.
pub async fn with_retries<T, F, Fut>(
    label: &str,
    retries: u32,
    pause: Duration,
    mut attempt: F,
) -> Result<FetchOutcome<T>, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<FetchOutcome<T>, ClientError>>,
{
    let mut retried = 0;
    loop {
        match attempt().await? {
            FetchOutcome::TransientFailure(reason) if retried < retries => {
                retried += 1;
                warn!(
                    "Transient failure for {}: {} (retry {}/{})",
                    label, reason, retried, retries
                );
                tokio::time::sleep(backoff(pause, retried)).await;
            }
            outcome => return Ok(outcome),
        }
    }
}

/// Wait before retry `retried`, saturating at `Duration::MAX`.
fn backoff(pause: Duration, retried: u32) -> Duration {
    pause.saturating_mul(retried)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let outcome = with_retries("335:CO:SNTL", 3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Ok(FetchOutcome::TransientFailure("HTTP 503".to_string()))
                } else {
                    Ok(FetchOutcome::Success(n))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(outcome, FetchOutcome::Success(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let calls = AtomicU32::new(0);
        let outcome: FetchOutcome<()> = with_retries("335:CO:SNTL", 2, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(FetchOutcome::TransientFailure("timed out".to_string())) }
        })
        .await
        .unwrap();
        assert!(outcome.is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_and_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let outcome: FetchOutcome<()> = with_retries("1:XX:SNTL", 5, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(FetchOutcome::NotFound) }
        })
        .await
        .unwrap();
        assert_eq!(outcome, FetchOutcome::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let calls = AtomicU32::new(0);
        let result: Result<FetchOutcome<()>, _> =
            with_retries("1:XX:SNTL", 5, Duration::ZERO, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ClientError::Rejected {
                        url: "http://localhost/data".to_string(),
                        status: 400,
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(ClientError::Rejected { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_is_linear_and_saturates() {
        assert_eq!(backoff(Duration::from_millis(500), 3), Duration::from_millis(1500));
        assert_eq!(backoff(Duration::MAX, 2), Duration::MAX);
        assert_eq!(backoff(Duration::from_secs(u64::MAX / 2 + 1), u32::MAX), Duration::MAX);
    }
}
