//! Retry policy types and configuration.

use std::num::NonZeroU32;
use std::time::Duration;

use super::error::PolicyError;

const DEFAULT_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);
const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// A retry policy describing how often and how patiently to retry.
///
/// Policies are pure data: they describe retry behavior but don't execute it.
/// Execution lives in [`retry`](crate::retry::retry) and friends, which only
/// ever consult [`RetryPolicy::delay_after`] to decide whether to go again.
///
/// # Bounds
///
/// `max_attempts` counts every try, including the first one, and is always at
/// least 1. A zero budget is rejected by [`RetryPolicy::new`] before anything
/// runs.
///
/// # Examples
///
/// ```rust
/// use steadfast::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
///
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.delay_after(1), Some(Duration::from_millis(10)));
/// assert_eq!(policy.delay_after(2), Some(Duration::from_millis(10)));
/// assert_eq!(policy.delay_after(3), None); // budget spent, no trailing delay
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    delay: Duration,
    backoff: Backoff,
    max_delay: Option<Duration>,
}

/// How the delay grows between consecutive retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// The same delay before every retry.
    #[default]
    Fixed,
    /// Delay grows linearly: `delay * n` after the n-th failed attempt.
    Linear,
    /// Delay doubles: `delay * 2^(n-1)` after the n-th failed attempt.
    Exponential,
}

impl Backoff {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backoff::Fixed => "fixed",
            Backoff::Linear => "linear",
            Backoff::Exponential => "exponential",
        }
    }

    /// Parse a configuration name back into a strategy.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fixed" => Some(Backoff::Fixed),
            "linear" => Some(Backoff::Linear),
            "exponential" => Some(Backoff::Exponential),
            _ => None,
        }
    }

    fn scale(&self, base: Duration, failed_attempt: u32) -> Duration {
        match self {
            Backoff::Fixed => base,
            Backoff::Linear => base.saturating_mul(failed_attempt),
            Backoff::Exponential => {
                base.saturating_mul(2u32.saturating_pow(failed_attempt.saturating_sub(1)))
            }
        }
    }
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, or `None` when the budget is spent.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}

impl<E> RetryEvent<'_, E> {
    /// Returns true if this failure exhausted the attempt budget.
    pub fn is_final(&self) -> bool {
        self.next_delay.is_none()
    }
}

impl RetryPolicy {
    /// Create a policy with `max_attempts` total tries and a fixed `delay`
    /// between them.
    ///
    /// Returns [`PolicyError::ZeroAttempts`] if `max_attempts` is 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::{PolicyError, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// assert!(RetryPolicy::new(1, Duration::ZERO).is_ok());
    /// assert_eq!(
    ///     RetryPolicy::new(0, Duration::ZERO),
    ///     Err(PolicyError::ZeroAttempts)
    /// );
    /// ```
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self, PolicyError> {
        let max_attempts = NonZeroU32::new(max_attempts).ok_or(PolicyError::ZeroAttempts)?;
        Ok(Self::with_attempts(max_attempts, delay))
    }

    /// Create a policy from an attempt budget that is already known to be
    /// non-zero.
    pub fn with_attempts(max_attempts: NonZeroU32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
            max_delay: None,
        }
    }

    /// A policy that never retries: the first failure is final.
    pub fn once() -> Self {
        Self::with_attempts(NonZeroU32::MIN, Duration::ZERO)
    }

    /// Change how the delay grows between retries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::{Backoff, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(5, Duration::from_millis(100))
    ///     .unwrap()
    ///     .with_backoff(Backoff::Exponential);
    ///
    /// // 100ms, 200ms, 400ms, 800ms, then the budget is spent
    /// assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_after(2), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.delay_after(4), Some(Duration::from_millis(800)));
    /// assert_eq!(policy.delay_after(5), None);
    /// ```
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Cap every computed delay at `cap`.
    pub fn with_max_delay(mut self, cap: Duration) -> Self {
        self.max_delay = Some(cap);
        self
    }

    /// Total number of tries, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// Base delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Backoff strategy.
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Delay cap, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Calculate the delay that follows failed attempt `attempt` (1-indexed).
    ///
    /// Returns `None` once `attempt` has reached `max_attempts`: the failure
    /// is final and no delay is inserted after it.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts.get() {
            return None;
        }

        let delay = self.backoff.scale(self.delay, attempt.max(1));

        Some(match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        })
    }

    /// Sum of every delay a fully exhausted run would sleep.
    pub fn total_delay(&self) -> Duration {
        (1..self.max_attempts.get())
            .filter_map(|attempt| self.delay_after(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    /// Three attempts, 500ms apart.
    fn default() -> Self {
        Self::with_attempts(DEFAULT_ATTEMPTS, DEFAULT_DELAY)
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn test_fixed_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();

        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(10)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(10)));
        assert_eq!(policy.delay_after(3), None);
        assert_eq!(policy.delay_after(4), None);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert_eq!(
            RetryPolicy::new(0, Duration::from_millis(10)),
            Err(PolicyError::ZeroAttempts)
        );
    }

    #[test]
    fn test_single_attempt_never_delays() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1)).unwrap();
        assert_eq!(policy.delay_after(1), None);
        assert_eq!(policy.total_delay(), Duration::ZERO);
        assert_eq!(RetryPolicy::once().max_attempts(), policy.max_attempts());
        assert_eq!(RetryPolicy::once().delay_after(1), None);
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100))
            .unwrap()
            .with_backoff(Backoff::Linear);

        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_after(3), Some(Duration::from_millis(300)));
        assert_eq!(policy.delay_after(4), Some(Duration::from_millis(400)));
        assert_eq!(policy.delay_after(5), None);
    }

    #[test]
    fn test_exponential_delay() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100))
            .unwrap()
            .with_backoff(Backoff::Exponential);

        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_after(3), Some(Duration::from_millis(400)));
        assert_eq!(policy.delay_after(4), Some(Duration::from_millis(800)));
    }

    #[test]
    fn test_exponential_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1))
            .unwrap()
            .with_backoff(Backoff::Exponential);

        assert!(policy.delay_after(200).is_some());
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100))
            .unwrap()
            .with_backoff(Backoff::Exponential)
            .with_max_delay(Duration::from_millis(500));

        assert_eq!(policy.delay_after(3), Some(Duration::from_millis(400)));
        assert_eq!(policy.delay_after(4), Some(Duration::from_millis(500))); // capped
        assert_eq!(policy.delay_after(9), Some(Duration::from_millis(500))); // capped
    }

    #[test]
    fn test_total_delay() {
        let policy = RetryPolicy::new(4, Duration::from_millis(10))
            .unwrap()
            .with_backoff(Backoff::Linear);

        // 10 + 20 + 30
        assert_eq!(policy.total_delay(), Duration::from_millis(60));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_millis(500));
        assert_eq!(policy.backoff(), Backoff::Fixed);
        assert_eq!(policy.max_delay(), None);
    }

    #[test]
    fn test_backoff_names() {
        for backoff in [Backoff::Fixed, Backoff::Linear, Backoff::Exponential] {
            assert_eq!(Backoff::from_name(backoff.as_str()), Some(backoff));
        }
        assert_eq!(Backoff::from_name("fibonacci"), None);
    }

    #[test]
    fn test_retry_event_is_final() {
        let error = "boom";
        let event = RetryEvent {
            attempt: 3,
            error: &error,
            next_delay: None,
            elapsed: Duration::ZERO,
        };
        assert!(event.is_final());
    }
}
