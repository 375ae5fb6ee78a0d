//! Testing utilities for code that retries.
//!
//! Real retries wait on the clock and hit real services. The helpers here
//! replace both: [`RecordingSleep`] remembers every delay instead of waiting,
//! and [`Flaky`] is an operation that fails a scripted number of times.
//!
//! # Examples
//!
//! ```rust
//! use steadfast::RetryPolicy;
//! use steadfast::testing::{Flaky, RecordingSleep};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
//! let sleeper = RecordingSleep::new();
//! let op = Flaky::succeeds_after(2, 42, |n| format!("failure #{}", n));
//!
//! let result = policy.retrier().sleep_with(&sleeper).run(|| op.call());
//!
//! assert_eq!(result, Ok(42));
//! assert_eq!(op.calls(), 3);
//! assert_eq!(sleeper.total(), Duration::from_millis(20));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::future::{self, BoxFuture};

use crate::retry::sleep::{AsyncSleep, Sleep};

/// A sleeper that records requested delays and returns immediately.
///
/// Implements both [`Sleep`] and [`AsyncSleep`], so it can stand in for the
/// real clock in blocking and async executors alike.
#[derive(Debug, Default)]
pub struct RecordingSleep {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleep {
    /// Create a sleeper with no recorded delays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of delays requested so far.
    pub fn count(&self) -> usize {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sum of all delays requested so far.
    pub fn total(&self) -> Duration {
        self.delays()
            .into_iter()
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    fn record(&self, duration: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

impl Sleep for RecordingSleep {
    fn sleep(&self, duration: Duration) {
        self.record(duration);
    }
}

impl AsyncSleep for RecordingSleep {
    fn sleep_async(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.record(duration);
        Box::pin(future::ready(()))
    }
}

/// An operation that fails a fixed number of times before succeeding.
///
/// Each failure is built from the 1-indexed call number, so tests can tell
/// which attempt produced the error they got back.
pub struct Flaky<T, E> {
    failures: Option<u32>,
    value: Option<T>,
    make_error: Box<dyn Fn(u32) -> E + Send + Sync>,
    calls: AtomicU32,
}

impl<T, E> Flaky<T, E> {
    /// Fail on the first `failures` calls, then return `value` on every call.
    pub fn succeeds_after<F>(failures: u32, value: T, make_error: F) -> Self
    where
        F: Fn(u32) -> E + Send + Sync + 'static,
    {
        Self {
            failures: Some(failures),
            value: Some(value),
            make_error: Box::new(make_error),
            calls: AtomicU32::new(0),
        }
    }

    /// Fail on every call.
    pub fn always_fails<F>(make_error: F) -> Self
    where
        F: Fn(u32) -> E + Send + Sync + 'static,
    {
        Self {
            failures: None,
            value: None,
            make_error: Box::new(make_error),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of times [`call`](Flaky::call) has been invoked.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone, E> Flaky<T, E> {
    /// Invoke the operation once.
    pub fn call(&self) -> Result<T, E> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match (&self.value, self.failures) {
            (Some(value), Some(failures)) if n > failures => Ok(value.clone()),
            _ => Err((self.make_error)(n)),
        }
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Flaky<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flaky")
            .field("failures", &self.failures)
            .field("value", &self.value)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for crate::RetryPolicy {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use crate::{Backoff, RetryPolicy};
        use std::num::NonZeroU32;

        (
            1u32..=16,
            0u64..=1_000,
            prop_oneof![
                Just(Backoff::Fixed),
                Just(Backoff::Linear),
                Just(Backoff::Exponential),
            ],
            proptest::option::of(0u64..=5_000),
        )
            .prop_map(|(attempts, delay_ms, backoff, cap_ms)| {
                let attempts = NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN);
                let policy =
                    RetryPolicy::with_attempts(attempts, Duration::from_millis(delay_ms))
                        .with_backoff(backoff);
                match cap_ms {
                    Some(cap) => policy.with_max_delay(Duration::from_millis(cap)),
                    None => policy,
                }
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sleep_starts_empty() {
        let sleeper = RecordingSleep::new();
        assert_eq!(sleeper.count(), 0);
        assert_eq!(sleeper.total(), Duration::ZERO);
    }

    #[test]
    fn recording_sleep_records_in_order() {
        let sleeper = RecordingSleep::new();
        sleeper.sleep(Duration::from_millis(5));
        sleeper.sleep(Duration::from_millis(7));
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(5), Duration::from_millis(7)]
        );
        assert_eq!(sleeper.total(), Duration::from_millis(12));
    }

    #[test]
    fn recording_sleep_async_records() {
        let sleeper = RecordingSleep::new();
        futures::executor::block_on(sleeper.sleep_async(Duration::from_secs(60)));
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(60)]);
    }

    #[test]
    fn flaky_fails_then_succeeds() {
        let op = Flaky::succeeds_after(2, "ok", |n| n);
        assert_eq!(op.call(), Err(1));
        assert_eq!(op.call(), Err(2));
        assert_eq!(op.call(), Ok("ok"));
        assert_eq!(op.call(), Ok("ok"));
        assert_eq!(op.calls(), 4);
    }

    #[test]
    fn flaky_zero_failures_succeeds_immediately() {
        let op = Flaky::succeeds_after(0, 7, |_| "never");
        assert_eq!(op.call(), Ok(7));
    }

    #[test]
    fn flaky_always_fails() {
        let op: Flaky<(), String> = Flaky::always_fails(|n| format!("e{}", n));
        assert_eq!(op.call(), Err("e1".to_string()));
        assert_eq!(op.call(), Err("e2".to_string()));
        assert_eq!(op.calls(), 2);
    }

    #[test]
    fn flaky_is_debug() {
        let op = Flaky::succeeds_after(1, 3, |_| ());
        assert!(format!("{:?}", op).contains("Flaky"));
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use crate::RetryPolicy;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_policies_are_bounded(policy in any::<RetryPolicy>()) {
                prop_assert!(policy.max_attempts() >= 1);
                prop_assert!(policy.delay_after(policy.max_attempts()).is_none());
            }
        }
    }
}
