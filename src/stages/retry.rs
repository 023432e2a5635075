use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::ModelError;
use crate::models::Stage;

/// Retry policy for one model stage
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure
    pub max_retries: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }
}

/// Run a model call, re-issuing it on failure up to `policy.max_retries` times
///
/// Returns the last error when every attempt fails.
pub async fn call_with_retries<F, Fut>(
    stage: Stage,
    policy: &RetryPolicy,
    mut call: F,
) -> Result<String, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ModelError>>,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            info!("{}: retry {} of {}", stage, attempt, policy.max_retries);
        }

        match call().await {
            Ok(text) => return Ok(text),
            Err(e) if attempt < policy.max_retries => {
                warn!("{} attempt {} failed: {}", stage, attempt + 1, e);
                attempt += 1;
                if !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_default_policy_does_not_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 0);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy {
            max_retries: 2,
            backoff: Duration::ZERO,
        };

        let counter = &calls;
        let result = call_with_retries(Stage::Summarize, &policy, move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(ModelError::Malformed("flaky".to_string()))
            } else {
                Ok("done".to_string())
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_with_last_error() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy {
            max_retries: 1,
            backoff: Duration::ZERO,
        };

        let counter = &calls;
        let result = call_with_retries(Stage::Sentiment, &policy, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ModelError::Empty { field: "sentiment" })
        })
        .await;

        assert!(matches!(result, Err(ModelError::Empty { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
