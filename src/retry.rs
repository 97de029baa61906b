//! Retry policy and predicates for transient failures.
//!
//! A request is attempted up to [`RetryPolicy::max_attempts`] times. Between
//! attempts the client waits `initial_delay`, then `initial_delay *
//! multiplier`, and so on. Whether a failure is worth another attempt is
//! decided by a [`RetryPredicate`]; the default only accepts 503 Service
//! Unavailable.

use crate::Error;
use std::time::Duration;

/// Bounded exponential backoff.
///
/// # Examples
///
/// ```
/// use resync::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_secs(2)));
/// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_secs(4)));
/// assert_eq!(policy.delay_for_attempt(3), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: usize,
    /// Wait before the second attempt.
    pub initial_delay: Duration,
    /// Factor applied to the wait after each retried attempt.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes a single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Returns the wait after the given failed attempt, or `None` if that
    /// attempt was the last one.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt that just failed (1-indexed)
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }

        let exponent = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
        let factor = self.multiplier.saturating_pow(exponent);
        Some(self.initial_delay.saturating_mul(factor))
    }
}

/// Decides whether a failed attempt should be repeated.
///
/// # Examples
///
/// ```
/// use resync::{Error, RetryPredicate};
///
/// struct RetryOnGatewayTimeout;
///
/// impl RetryPredicate for RetryOnGatewayTimeout {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         matches!(
///             error,
///             Error::HttpError { status, .. } if status.as_u16() == 504
///         )
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the request should be attempted again.
    ///
    /// # Arguments
    ///
    /// * `error` - The error the attempt produced
    /// * `attempt` - The attempt number (1-indexed)
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry only when the server answered 503 Service Unavailable.
///
/// This is the client's default predicate.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnServiceUnavailable;

impl RetryPredicate for RetryOnServiceUnavailable {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Retry on 503 and on network-level failures (connection refused, resets,
/// timeouts).
///
/// Not enabled by default: a timed-out write may already have been applied
/// by the server.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnConnectionError;

impl RetryPredicate for RetryOnConnectionError {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable() || matches!(error, Error::Network(_))
    }
}
