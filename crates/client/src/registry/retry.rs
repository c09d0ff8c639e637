//! Retry with exponential backoff for transient upstream failures.

use std::future::Future;
use std::time::Duration;

use crate::registry::RegistryError;

/// Maximum number of retries after the initial attempt.
const MAX_RETRIES: u32 = 3;

/// Backoff base; attempt n sleeps `base * 2^n` unless the upstream sent a
/// Retry-After hint.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Run `op`, retrying transient failures with exponential backoff.
///
/// A rate-limit response with a Retry-After hint sleeps for exactly that
/// long instead of the computed backoff. Non-retryable errors (not-found,
/// other 4xx, parse failures) propagate immediately.
pub async fn with_retry<T, F, Fut>(context: &str, mut op: F) -> Result<T, RegistryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RegistryError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_RETRIES && err.is_retryable() => {
                let delay = match &err {
                    RegistryError::RateLimited { retry_after: Some(secs) } => Duration::from_secs(*secs),
                    _ => BASE_DELAY * 2u32.pow(attempt),
                };
                tracing::warn!(
                    context,
                    %err,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                if attempt > 0 {
                    tracing::error!(context, %err, attempts = attempt + 1, "giving up after retries");
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_success_passes_through() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = with_retry("test", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, RegistryError>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<u32, _> = with_retry("test", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RegistryError::PackageNotFound("zlib".into()))
            }
        })
        .await;
        assert!(matches!(result, Err(RegistryError::PackageNotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_back_off_exponentially() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();
        let result: Result<u32, _> = with_retry("test", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RegistryError::ServiceUnavailable { status: 503 })
            }
        })
        .await;
        assert!(matches!(result, Err(RegistryError::ServiceUnavailable { status: 503 })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 1s + 2s + 4s of backoff.
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honours_retry_after() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();
        let result = with_retry("test", move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RegistryError::RateLimited { retry_after: Some(30) })
                } else {
                    Ok(1u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = with_retry("test", move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RegistryError::Timeout)
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
