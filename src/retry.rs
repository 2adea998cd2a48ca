//! Bounded retry/poll primitive.
//!
//! Runs an async operation until its result satisfies a success predicate,
//! sleeping a fixed delay between attempts. Every call is bounded by both an
//! attempt count and a wall-clock deadline measured on the monotonic clock.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How long and how often to retry. Immutable; share freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub times: u32,
    /// Fixed sleep between attempts.
    pub delay: Duration,
    /// Wall-clock budget for the whole sequence.
    pub timeout: Duration,
    /// Propagate the first operation error instead of retrying it.
    pub stop_on_error: bool,
}

impl RetryPolicy {
    pub fn new(times: u32, delay: Duration, timeout: Duration) -> Self {
        Self {
            times,
            delay,
            timeout,
            stop_on_error: false,
        }
    }

    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(u32::MAX, Duration::from_secs(15), Duration::from_secs(14 * 60))
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error(transparent)]
    Aborted(E),

    #[error("Failure condition met on attempt {attempt}")]
    Rejected { attempt: u32 },

    #[error("Condition not met after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        last_error: Option<E>,
    },

    #[error("Condition not met within {timeout:?} ({attempts} attempts)")]
    TimedOut { timeout: Duration, attempts: u32 },
}

/// Retry `operation` until `is_success` accepts its result.
///
/// Each attempt checks `is_failure` first and fails fast when it matches.
/// Operation errors are logged and retried unless the policy says
/// `stop_on_error`. Fails once more than `policy.times` retries were made or
/// `policy.timeout` has elapsed, whichever comes first.
pub async fn retry<T, E, F, Fut, S, P>(
    mut operation: F,
    is_success: S,
    policy: &RetryPolicy,
    is_failure: Option<P>,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: Fn(&T) -> bool,
    P: Fn(&T) -> bool,
    E: Display,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;
    let mut last_error = None;

    loop {
        attempt = attempt.saturating_add(1);

        match operation().await {
            Ok(value) => {
                if let Some(is_failure) = &is_failure
                    && is_failure(&value)
                {
                    return Err(RetryError::Rejected { attempt });
                }
                if is_success(&value) {
                    return Ok(value);
                }
                debug!(attempt, "condition not met yet");
            }
            Err(err) => {
                if policy.stop_on_error {
                    return Err(RetryError::Aborted(err));
                }
                warn!(attempt, error = %err, "attempt failed, retrying");
                last_error = Some(err);
            }
        }

        if attempt > policy.times {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last_error,
            });
        }

        tokio::time::sleep(policy.delay).await;

        if started.elapsed() >= policy.timeout {
            return Err(RetryError::TimedOut {
                timeout: policy.timeout,
                attempts: attempt,
            });
        }
    }
}

/// [`retry`] with no failure predicate.
pub async fn retry_until<T, E, F, Fut, S>(
    operation: F,
    is_success: S,
    policy: &RetryPolicy,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: Fn(&T) -> bool,
    E: Display,
{
    retry(operation, is_success, policy, None::<fn(&T) -> bool>).await
}
