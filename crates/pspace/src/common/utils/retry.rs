use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Pause before the next attempt.
    pub delay: Duration,
    /// Number of retries after the first attempt, `None` retries forever.
    pub retries: Option<u32>,
}

impl RetryPolicy {
    pub fn new(delay: Duration, retries: Option<u32>) -> Self {
        Self { delay, retries }
    }

    pub fn forever(delay: Duration) -> Self {
        Self::new(delay, None)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Some(1))
    }
}

/// Calls `operation` until it succeeds or the retries of `policy` are exhausted.
/// The error of the last attempt is returned.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut tries = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if policy.retries.is_some_and(|retries| tries >= retries) {
                    return Err(error);
                }
                tries += 1;
                log::warn!(
                    "{error}; retrying in {:.1}s (attempt {})",
                    policy.delay.as_secs_f64(),
                    tries + 1
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RetryPolicy, retry};
    use std::cell::Cell;
    use std::time::Duration;

    fn policy(retries: Option<u32>) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), retries)
    }

    #[tokio::test]
    async fn test_retry_success_first() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = retry(policy(Some(1)), || {
            calls.set(calls.get() + 1);
            async { Ok(5) }
        })
        .await;
        assert_eq!(result, Ok(5));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = retry(policy(Some(2)), || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move { Err(format!("failure {attempt}")) }
        })
        .await;
        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_zero_retries() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = retry(policy(Some(0)), || {
            calls.set(calls.get() + 1);
            async { Err("x".to_string()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_retry_forever_until_success() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = retry(policy(None), || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 5 {
                    Err("not yet".to_string())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(5));
    }
}
