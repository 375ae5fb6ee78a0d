//! Error and report types for retry operations.

use std::time::Duration;

/// Error returned when a [`RetryPolicy`](super::RetryPolicy) cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// `max_attempts` was 0. A policy must try at least once.
    ZeroAttempts,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroAttempts => write!(f, "max_attempts must be at least 1"),
        }
    }
}

impl std::error::Error for PolicyError {}

/// The outcome of a retried operation together with how it was reached.
///
/// Returned on both sides of the `Result` by
/// [`retry_reported`](super::retry_reported): `Ok(Attempted<T>)` wraps the
/// value of the attempt that succeeded, `Err(Attempted<E>)` wraps the error
/// that ended the run. The wrapped value is never altered; use
/// [`into_inner`](Attempted::into_inner) to get it back.
///
/// # Examples
///
/// ```rust
/// use steadfast::{retry_reported, AnyFailure, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(2, Duration::from_millis(1)).unwrap();
///
/// match retry_reported(&policy, || Err::<(), _>("always fails"), AnyFailure) {
///     Err(exhausted) => {
///         assert_eq!(exhausted.value, "always fails");
///         assert_eq!(exhausted.attempts, 2);
///     }
///     Ok(_) => panic!("Expected failure"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<V> {
    /// The value or error produced by the last attempt.
    pub value: V,
    /// Total number of attempts made, including the first.
    pub attempts: u32,
    /// Wall-clock time from the first attempt to the outcome.
    pub elapsed: Duration,
}

impl<V> Attempted<V> {
    /// Create a new report.
    pub fn new(value: V, attempts: u32, elapsed: Duration) -> Self {
        Self {
            value,
            attempts,
            elapsed,
        }
    }

    /// Extract the value, discarding metadata.
    pub fn into_inner(self) -> V {
        self.value
    }

    /// Get a reference to the value.
    pub fn get(&self) -> &V {
        &self.value
    }

    /// Returns true if more than one attempt was needed.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }
}

impl<V: std::fmt::Display> std::fmt::Display for Attempted<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "after {} attempts ({:?}): {}",
            self.attempts, self.elapsed, self.value
        )
    }
}

impl<V: std::error::Error + 'static> std::error::Error for Attempted<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.value)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_policy_error_display() {
        assert_eq!(
            PolicyError::ZeroAttempts.to_string(),
            "max_attempts must be at least 1"
        );
    }

    #[test]
    fn test_attempted_display() {
        let report = Attempted::new("connection failed", 3, Duration::from_millis(500));
        let display = format!("{}", report);
        assert!(display.contains("3 attempts"));
        assert!(display.contains("connection failed"));
    }

    #[test]
    fn test_attempted_into_inner() {
        let report = Attempted::new("test error", 5, Duration::from_secs(1));
        assert!(report.was_retried());
        assert_eq!(report.get(), &"test error");
        assert_eq!(report.into_inner(), "test error");
    }

    #[test]
    fn test_attempted_source_is_original_error() {
        let report = Attempted::new(
            io::Error::new(io::ErrorKind::TimedOut, "slow peer"),
            2,
            Duration::ZERO,
        );
        let source = report.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("slow peer"));
    }
}
