//! Bounded exponential backoff around fallible async operations.
//!
//! The wrapper is not tied to HTTP. Anything returning a future of
//! `Result<T, E>` can be retried. Its main user is the GitHub client, which
//! wraps every fetch in [`retry`].

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A `max_attempts` of zero is treated as one.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            base_delay,
        }
    }

    /// Returns the total number of invocations allowed.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the first retry.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay slept after the failed attempt with 0-based index `attempt`:
    /// `base_delay * 2^attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// The last error of an operation that failed on every attempt.
#[derive(Debug, Error)]
#[error("{label} failed after {attempts} attempt(s): {source}")]
pub struct RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Caller-supplied name of the operation.
    pub label: String,
    /// Number of invocations made.
    pub attempts: u32,
    /// Error returned by the final invocation.
    #[source]
    pub source: E,
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns the error of the final attempt.
    pub fn last_error(&self) -> &E {
        &self.source
    }
}

/// Invokes `operation` until it succeeds or `policy` runs out of attempts.
///
/// Waits are plain timed sleeps with no jitter. A wait always runs to
/// completion before the next attempt.
///
/// # Errors
///
/// Returns [`RetryError`] carrying the final error and the attempt count once
/// every attempt has failed.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let mut attempts = 0;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        attempts += 1;
        if attempts >= policy.max_attempts {
            warn!(label, attempts, error = %error, "Giving up after final attempt");
            return Err(RetryError {
                label: label.to_string(),
                attempts,
                source: error,
            });
        }

        let delay = policy.delay_for(attempts - 1);
        warn!(
            label,
            attempt = attempts,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Attempt failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
