//! Retry policy attached to each request.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;

/// Per-request retry bookkeeping.
///
/// The adapter only reads from a policy: the current attempt count is sent
/// as an ambient header and the current timeout bounds each attempt. The
/// request queue advances the policy between attempts via [`retry`].
///
/// [`retry`]: RetryPolicy::retry
pub trait RetryPolicy: Send + Sync {
    /// Timeout to apply to the next attempt.
    fn current_timeout(&self) -> Duration;

    /// Number of retries performed so far (0 on the first attempt).
    fn current_retry_count(&self) -> u32;

    /// Records a failed attempt and prepares the next one.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`] when no attempts remain.
    fn retry(&self) -> Result<(), RetryError>;
}

/// Error returned when a retry policy has no attempts left.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    /// Every allowed retry has been used.
    #[error("retries exhausted after {retries} retries")]
    Exhausted {
        /// Retries performed before giving up
        retries: u32,
    },
}

/// Configuration for [`DefaultRetryPolicy`].
///
/// # Defaults
///
/// - `initial_timeout`: 2500 ms
/// - `max_retries`: 1
/// - `backoff_multiplier`: 1.0
///
/// # Example
///
/// ```
/// use volley_stack::request::RetrySettings;
/// use std::time::Duration;
///
/// let settings = RetrySettings::new()
///     .with_initial_timeout(Duration::from_secs(5))
///     .with_max_retries(3)
///     .with_backoff_multiplier(2.0);
/// assert_eq!(settings.max_retries, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Timeout for the first attempt.
    pub initial_timeout: Duration,

    /// Retries allowed after the first attempt.
    ///
    /// A value of 0 means only the initial attempt is made.
    pub max_retries: u32,

    /// Fraction of the current timeout added on each retry.
    ///
    /// A value of 1.0 doubles the timeout each time.
    pub backoff_multiplier: f64,
}

impl RetrySettings {
    /// Default timeout for the first attempt (2500 ms).
    pub const DEFAULT_INITIAL_TIMEOUT: Duration = Duration::from_millis(2500);

    /// Default number of retries.
    pub const DEFAULT_MAX_RETRIES: u32 = 1;

    /// Default backoff multiplier.
    pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.0;

    /// Creates settings with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_timeout: Self::DEFAULT_INITIAL_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            backoff_multiplier: Self::DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Sets the timeout for the first attempt.
    #[must_use]
    pub const fn with_initial_timeout(mut self, timeout: Duration) -> Self {
        self.initial_timeout = timeout;
        self
    }

    /// Sets the number of retries allowed after the first attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is negative or not finite.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        assert!(
            multiplier >= 0.0 && multiplier.is_finite(),
            "backoff multiplier must be a non-negative finite number"
        );
        self.backoff_multiplier = multiplier;
        self
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Retry policy with a growing per-attempt timeout.
///
/// Each [`retry`](RetryPolicy::retry) increments the retry count and adds
/// `timeout * backoff_multiplier` to the timeout. Counters are atomic so a
/// policy can be shared between the queue (writer) and the adapter (reader).
#[derive(Debug)]
pub struct DefaultRetryPolicy {
    settings: RetrySettings,
    timeout_ms: AtomicU64,
    retry_count: AtomicU32,
}

impl DefaultRetryPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(RetrySettings::default())
    }

    /// Creates a policy from explicit settings.
    #[must_use]
    pub fn from_settings(settings: RetrySettings) -> Self {
        let timeout_ms = u64::try_from(settings.initial_timeout.as_millis()).unwrap_or(u64::MAX);
        Self {
            settings,
            timeout_ms: AtomicU64::new(timeout_ms),
            retry_count: AtomicU32::new(0),
        }
    }
}

impl Default for DefaultRetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn current_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.load(Ordering::Acquire))
    }

    fn current_retry_count(&self) -> u32 {
        self.retry_count.load(Ordering::Acquire)
    }

    fn retry(&self) -> Result<(), RetryError> {
        let retries = self.retry_count.fetch_add(1, Ordering::AcqRel) + 1;

        // Timeouts are whole milliseconds; truncation matches the integer timeout.
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let _ = self
            .timeout_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let growth = (current as f64 * self.settings.backoff_multiplier) as u64;
                Some(current.saturating_add(growth))
            });

        if retries <= self.settings.max_retries {
            Ok(())
        } else {
            Err(RetryError::Exhausted { retries })
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
