//! Retry with capped exponential backoff for upstream calls

use std::future::Future;
use std::time::Duration;
use tracing::warn;
use crate::errors::{CacheError, CacheResult};

/// Share of each delay that is randomized, in both directions.
const JITTER_RATIO: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after a failure that followed a wait of `previous`.
    /// Grows by `exponential_base`, is capped at `max_delay_ms`, then jittered
    /// by up to ±5% so concurrent callers spread out.
    pub fn next_delay(&self, previous: Duration) -> Duration {
        let grown = previous.as_secs_f64() * 1000.0 * self.exponential_base;
        let capped = grown.min(self.max_delay_ms as f64);
        let jittered = capped * (1.0 + rand::random_range(-JITTER_RATIO..JITTER_RATIO));
        Duration::from_secs_f64(jittered.max(0.0) / 1000.0)
    }
}

/// Runs `operation` until it succeeds or `max_attempts` is reached. The final
/// failure becomes [`CacheError::Upstream`] carrying the attempt count.
pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
    context: &str,
) -> CacheResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = Duration::from_millis(config.initial_delay_ms);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if attempt >= max_attempts {
            return Err(CacheError::Upstream {
                message: format!("{} failed after {} attempts", context, attempt),
                source: Some(err),
                retry_count: attempt,
            });
        }

        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            "{} failed: {}. Retrying...",
            context,
            err
        );
        tokio::time::sleep(delay).await;
        delay = config.next_delay(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            exponential_base: 2.0,
        }
    }

    #[test]
    fn jitter_goes_both_ways_around_the_nominal_delay() {
        let config = RetryConfig::default();
        let nominal = 400.0;
        let samples: Vec<f64> = (0..200)
            .map(|_| config.next_delay(Duration::from_millis(200)).as_secs_f64() * 1000.0)
            .collect();

        assert!(samples.iter().all(|d| (nominal * 0.949..=nominal * 1.051).contains(d)));
        assert!(samples.iter().any(|d| *d < nominal));
        assert!(samples.iter().any(|d| *d > nominal));
    }

    #[test]
    fn delay_is_capped_before_jitter() {
        let config = RetryConfig::default();
        let delay = config.next_delay(Duration::from_secs(60));
        assert!(delay <= Duration::from_millis(5250));
        assert!(delay >= Duration::from_millis(4750));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(anyhow::anyhow!("flaky"))
                } else {
                    Ok(7)
                }
            },
            &fast(),
            "flaky op",
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_with_upstream_error() {
        let calls = AtomicU32::new(0);
        let result: CacheResult<()> = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("down"))
            },
            &fast(),
            "dead op",
        )
        .await;
        match result {
            Err(CacheError::Upstream { retry_count, message, .. }) => {
                assert_eq!(retry_count, 3);
                assert!(message.contains("dead op"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig { max_attempts: 0, ..fast() };
        let result: CacheResult<()> = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("down"))
            },
            &config,
            "once",
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
