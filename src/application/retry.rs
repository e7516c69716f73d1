//! # Transient Retry
//!
//! 一時的なネットワークエラーのみを固定間隔でリトライする

use log::warn;
use std::future::Future;
use tokio::time::sleep;

use crate::domain::errors::ConductorResult;
use crate::domain::services::retry_policy::RetryPolicy;

/// `op` を実行し、一時エラーの場合のみ `policy` に従って再試行する
///
/// バリデーションなどのビジネスエラーは即座に返す
pub async fn with_transient_retry<T, F, Fut>(
    step: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> ConductorResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ConductorResult<T>>,
{
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && policy.allows_another(attempt) => {
                warn!(
                    "{} failed (attempt {}/{}), retrying in {}ms: {}",
                    step,
                    attempt,
                    policy.max_attempts,
                    policy.delay.as_millis(),
                    e
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ConductorError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::fixed(3, 1);

        let result = with_transient_retry("step", &policy, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(ConductorError::connection("connection refused").retryable(true))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::fixed(2, 1);

        let result: ConductorResult<()> = with_transient_retry("step", &policy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ConductorError::connection("timed out").retryable(true))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_business_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::fixed(5, 1);

        let result: ConductorResult<()> = with_transient_retry("step", &policy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ConductorError::validation("analysis rejected"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
