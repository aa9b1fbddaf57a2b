//! Retrying remote writes under GitHub's abuse rate limit
//!
//! GitHub answers comment creation with HTTP 422 when comments are posted
//! too quickly. Those calls are retried with a steep quadratic backoff;
//! every other failure is returned at once.
//!
//! ```text
//! Attempting(0) ──ok──▶ Success
//!      │ 422            ▲
//!      ▼                │ ok
//! Attempting(i+1) ──────┘        any other error ──▶ Fatal
//!      │ 422 on the last attempt
//!      ▼
//!  Exhausted
//! ```

use gh_client::{status_of, STATUS_UNPROCESSABLE};
use gh_pr_config::RetryConfig;
use log::{error, warn};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Why a retried write gave up
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every attempt hit the rate limit
    #[error("rate limit still active after {attempts} attempts ({elapsed:?} elapsed)")]
    RateLimitExhausted {
        attempts: u32,
        elapsed: Duration,
        #[source]
        last: anyhow::Error,
    },

    /// A failure that is not worth retrying, returned as the callback produced it
    #[error(transparent)]
    Fatal(anyhow::Error),
}

/// Whether an error is GitHub's abuse rate limit signal
pub fn is_rate_limited(err: &anyhow::Error) -> bool {
    status_of(err) == Some(STATUS_UNPROCESSABLE)
}

/// Runs a remote write, backing off `i * i` units before attempt `i`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryScheduler {
    max_attempts: u32,
    backoff_unit: Duration,
}

impl Default for RetryScheduler {
    fn default() -> Self {
        Self::from(RetryConfig::default())
    }
}

impl From<RetryConfig> for RetryScheduler {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_unit())
    }
}

impl RetryScheduler {
    /// At least one attempt is always made
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the 0-indexed `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt.saturating_mul(attempt))
    }

    /// Delay before the attempt after `attempt`, or `None` when it was the last
    pub fn next_backoff(&self, attempt: u32) -> Option<Duration> {
        let next = attempt.checked_add(1)?;
        (next < self.max_attempts).then(|| self.backoff(next))
    }

    /// Run `op` until it succeeds, fails with a non rate limit error, or the
    /// attempts are used up
    ///
    /// # Arguments
    ///
    /// * `what` - Short description of the write, for log messages
    /// * `op` - Produces one attempt of the remote call
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let started = Instant::now();
        let mut last_rate_limit = None;

        for attempt in 0..self.max_attempts {
            let backoff = self.backoff(attempt);
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if is_rate_limited(&err) => {
                    match self.next_backoff(attempt) {
                        Some(next) => warn!(
                            "{}: rate limited on attempt {}/{}, retrying in {:?}",
                            what,
                            attempt + 1,
                            self.max_attempts,
                            next
                        ),
                        None => warn!(
                            "{}: rate limited on final attempt {}/{}",
                            what,
                            attempt + 1,
                            self.max_attempts
                        ),
                    }
                    last_rate_limit = Some(err);
                }
                Err(err) => return Err(RetryError::Fatal(err)),
            }
        }

        let elapsed = started.elapsed();
        error!(
            "{}: giving up after {} rate limited attempts ({:?})",
            what, self.max_attempts, elapsed
        );
        Err(RetryError::RateLimitExhausted {
            attempts: self.max_attempts,
            elapsed,
            last: last_rate_limit
                .unwrap_or_else(|| anyhow::anyhow!("{}: no attempt was made", what)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_client::ApiError;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn rate_limited() -> anyhow::Error {
        anyhow::Error::new(ApiError::with_status(
            422,
            "You have exceeded a secondary rate limit",
        ))
    }

    /// Records the virtual time of each attempt relative to `start`
    #[derive(Clone)]
    struct AttemptLog {
        start: Instant,
        attempts: Arc<Mutex<Vec<Duration>>>,
    }

    impl AttemptLog {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                attempts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn record(&self) -> usize {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(self.start.elapsed());
            attempts.len()
        }

        fn count(&self) -> usize {
            self.attempts.lock().unwrap().len()
        }

        /// Gaps between consecutive attempts, starting from `start`
        fn sleeps(&self) -> Vec<u64> {
            let attempts = self.attempts.lock().unwrap();
            let mut previous = Duration::ZERO;
            attempts
                .iter()
                .map(|at| {
                    let gap = *at - previous;
                    previous = *at;
                    gap.as_secs()
                })
                .collect()
        }
    }

    #[test]
    fn test_backoff_is_quadratic() {
        let scheduler = RetryScheduler::default();
        let backoffs: Vec<u64> = (0..6).map(|i| scheduler.backoff(i).as_secs()).collect();
        assert_eq!(backoffs, vec![0, 1, 4, 9, 16, 25]);
    }

    #[test]
    fn test_no_backoff_after_final_attempt() {
        let scheduler = RetryScheduler::default();
        assert_eq!(scheduler.next_backoff(0), Some(Duration::from_secs(1)));
        assert_eq!(scheduler.next_backoff(4), Some(Duration::from_secs(25)));
        assert_eq!(scheduler.next_backoff(5), None);

        let single = RetryScheduler::new(1, Duration::from_secs(1));
        assert_eq!(single.next_backoff(0), None);
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryScheduler::new(0, Duration::from_secs(1)).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_rate_limited_exhausts_all_attempts() {
        let log = AttemptLog::new();
        let scheduler = RetryScheduler::default();

        let result: Result<(), _> = scheduler
            .run("test write", || {
                let log = log.clone();
                async move {
                    log.record();
                    Err(rate_limited())
                }
            })
            .await;

        assert_eq!(log.count(), 6);
        assert_eq!(log.sleeps(), vec![0, 1, 4, 9, 16, 25]);
        match result {
            Err(RetryError::RateLimitExhausted {
                attempts,
                elapsed,
                last,
            }) => {
                assert_eq!(attempts, 6);
                assert_eq!(elapsed, Duration::from_secs(55));
                assert!(is_rate_limited(&last));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_two_rate_limits() {
        let log = AttemptLog::new();
        let scheduler = RetryScheduler::default();

        let result = scheduler
            .run("test write", || {
                let log = log.clone();
                async move {
                    if log.record() < 3 {
                        Err(rate_limited())
                    } else {
                        Ok(99u64)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 99);
        assert_eq!(log.count(), 3);
        assert_eq!(log.sleeps(), vec![0, 1, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_error_is_returned_unmodified() {
        let log = AttemptLog::new();
        let scheduler = RetryScheduler::default();

        let result: Result<(), _> = scheduler
            .run("test write", || {
                let log = log.clone();
                async move {
                    log.record();
                    let forbidden = ApiError::with_status(403, "Resource not accessible");
                    Err(anyhow::Error::new(forbidden))
                }
            })
            .await;

        assert_eq!(log.count(), 1);
        match result {
            Err(RetryError::Fatal(err)) => {
                assert_eq!(status_of(&err), Some(403));
                assert_eq!(
                    err.to_string(),
                    "GitHub API error (403): Resource not accessible"
                );
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_retried() {
        let log = AttemptLog::new();
        let scheduler = RetryScheduler::default();

        let result: Result<(), _> = scheduler
            .run("test write", || {
                let log = log.clone();
                async move {
                    log.record();
                    Err(anyhow::Error::new(ApiError::transport("connection reset")))
                }
            })
            .await;

        assert_eq!(log.count(), 1);
        assert!(matches!(result, Err(RetryError::Fatal(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_attempts_and_unit() {
        let log = AttemptLog::new();
        let scheduler = RetryScheduler::from(RetryConfig {
            max_attempts: 3,
            backoff_unit_secs: 2,
        });

        let result: Result<(), _> = scheduler
            .run("test write", || {
                let log = log.clone();
                async move {
                    log.record();
                    Err(rate_limited())
                }
            })
            .await;

        assert_eq!(log.sleeps(), vec![0, 2, 8]);
        assert!(matches!(
            result,
            Err(RetryError::RateLimitExhausted { attempts: 3, .. })
        ));
    }
}
