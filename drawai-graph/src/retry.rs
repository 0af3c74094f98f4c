//! Timeouts, retries and pacing for external calls.

use crate::config::CallPolicy;
use drawai_core::{DrawError, Result};
use drawai_telemetry::Instrument;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

fn next_retry_delay(current: Duration, policy: &CallPolicy) -> Duration {
    let max = policy.max_backoff();
    if current >= max {
        return max;
    }

    let multiplier = policy.backoff_multiplier.max(1.0) as f64;
    let scaled = Duration::from_secs_f64(current.as_secs_f64() * multiplier);
    scaled.min(max)
}

/// Run `operation` under the policy's timeout, retrying retryable failures
/// with exponential backoff.
pub async fn call_with_retry<T, Op, Fut>(
    policy: &CallPolicy,
    operation_name: &str,
    mut operation: Op,
) -> Result<T>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    let mut delay = policy.initial_backoff();

    loop {
        let span = drawai_telemetry::external_call_span(operation_name);
        let outcome = match tokio::time::timeout(policy.timeout(), operation().instrument(span)).await
        {
            Ok(result) => result,
            Err(_) => Err(DrawError::Timeout {
                operation: operation_name.to_string(),
                after_ms: policy.timeout_ms,
            }),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.max_retries && error.is_retryable() => {
                attempt += 1;
                drawai_telemetry::warn!(
                    operation = operation_name,
                    attempt = attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "external call failed with retryable error; retrying"
                );
                tokio::time::sleep(delay).await;
                delay = next_retry_delay(delay, policy);
            }
            Err(error) => return Err(error),
        }
    }
}

/// Spaces successive calls of one run at least `min_interval` apart.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last: Mutex::new(None) }
    }

    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    fn fast_policy(max_retries: u32) -> CallPolicy {
        CallPolicy::immediate().with_max_retries(max_retries)
    }

    #[tokio::test]
    async fn retries_retryable_errors_until_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = call_with_retry(&fast_policy(2), "classify", || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(DrawError::Reasoning("busy".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let error = call_with_retry(&fast_policy(3), "classify", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(DrawError::Config("bad key".into()))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(error, DrawError::Config(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = call_with_retry(&fast_policy(2), "execute", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(DrawError::Backend("canvas offline".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let policy = fast_policy(0).with_timeout(Duration::from_millis(50));
        let error = call_with_retry(&policy, "classify", || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(error, DrawError::Timeout { after_ms: 50, .. }));
    }

    #[test]
    fn backoff_is_capped() {
        let policy = CallPolicy::default();
        let mut delay = policy.initial_backoff();
        for _ in 0..10 {
            delay = next_retry_delay(delay, &policy);
        }
        assert_eq!(delay, policy.max_backoff());
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_spaces_calls() {
        let pacer = Pacer::new(Duration::from_millis(100));
        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
