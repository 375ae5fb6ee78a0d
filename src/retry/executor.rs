//! Running an operation under a [`RetryPolicy`].
//!
//! All entry points share one loop, [`Retrier::run_reported`]:
//!
//! 1. Invoke the operation.
//! 2. On success, return its value. No delay, no further attempts.
//! 3. On a failure the classifier rejects, return it immediately.
//! 4. Otherwise ask the policy for the delay after this attempt. `None` means
//!    the budget is spent and the failure is returned as is; `Some(d)` means
//!    sleep `d` and go again.
//!
//! Errors are handed back exactly as the operation produced them.

use std::time::{Duration, Instant};

use super::classify::{AnyFailure, RetryOn};
use super::error::Attempted;
use super::policy::{RetryEvent, RetryPolicy};
use super::sleep::{Sleep, SystemSleep};

/// Observes failed attempts.
///
/// Called once per retryable failure, before the executor sleeps or gives up.
/// Implemented for every `Fn(&RetryEvent<'_, E>)` closure and for [`NoHook`].
pub trait RetryHook<E> {
    /// Inspect a failed attempt.
    fn on_retry(&self, event: &RetryEvent<'_, E>);
}

impl<E, F> RetryHook<E> for F
where
    F: Fn(&RetryEvent<'_, E>),
{
    fn on_retry(&self, event: &RetryEvent<'_, E>) {
        self(event)
    }
}

/// A hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl<E> RetryHook<E> for NoHook {
    fn on_retry(&self, _event: &RetryEvent<'_, E>) {}
}

/// A configured executor: policy, classifier, sleeper and hook.
///
/// Built with [`RetryPolicy::retrier`].
///
/// # Examples
///
/// ```rust
/// use steadfast::RetryPolicy;
/// use steadfast::testing::RecordingSleep;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
/// let sleeper = RecordingSleep::new();
/// let mut calls = 0;
///
/// let result = policy
///     .retrier()
///     .retry_on(|e: &&str| *e == "busy")
///     .sleep_with(&sleeper)
///     .run(|| {
///         calls += 1;
///         if calls < 3 { Err("busy") } else { Ok(42) }
///     });
///
/// assert_eq!(result, Ok(42));
/// assert_eq!(sleeper.delays(), vec![Duration::from_millis(10); 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Retrier<'p, R = AnyFailure, S = SystemSleep, H = NoHook> {
    pub(crate) policy: &'p RetryPolicy,
    pub(crate) retry_on: R,
    pub(crate) sleeper: S,
    pub(crate) hook: H,
}

impl RetryPolicy {
    /// Start building an executor for this policy.
    ///
    /// Defaults: every failure is retryable, the real clock, no hook.
    pub fn retrier(&self) -> Retrier<'_> {
        Retrier {
            policy: self,
            retry_on: AnyFailure,
            sleeper: SystemSleep,
            hook: NoHook,
        }
    }

    /// Run `operation`, retrying every failure. See [`retry`].
    pub fn execute<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.retrier().run(operation)
    }

    /// Run `operation`, retrying only failures `retry_on` accepts. See
    /// [`retry_if`].
    pub fn execute_if<T, E, F, R>(&self, operation: F, retry_on: R) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        R: RetryOn<E>,
    {
        self.retrier().retry_on(retry_on).run(operation)
    }
}

impl<'p, R, S, H> Retrier<'p, R, S, H> {
    /// Replace the classifier.
    pub fn retry_on<R2>(self, retry_on: R2) -> Retrier<'p, R2, S, H> {
        Retrier {
            policy: self.policy,
            retry_on,
            sleeper: self.sleeper,
            hook: self.hook,
        }
    }

    /// Replace the sleeper.
    pub fn sleep_with<S2>(self, sleeper: S2) -> Retrier<'p, R, S2, H> {
        Retrier {
            policy: self.policy,
            retry_on: self.retry_on,
            sleeper,
            hook: self.hook,
        }
    }

    /// Replace the hook.
    pub fn on_retry<H2>(self, hook: H2) -> Retrier<'p, R, S, H2> {
        Retrier {
            policy: self.policy,
            retry_on: self.retry_on,
            sleeper: self.sleeper,
            hook,
        }
    }

    /// The policy this executor follows.
    pub fn policy(&self) -> &'p RetryPolicy {
        self.policy
    }

    /// Decide what follows a failed attempt.
    ///
    /// Returns `None` if the failure must be returned, or the delay to wait
    /// before the next attempt. `elapsed` is measured on the sleeper's clock.
    pub(crate) fn next_step<E>(
        &self,
        attempt: u32,
        error: &E,
        elapsed: Duration,
    ) -> Option<Duration>
    where
        R: RetryOn<E>,
        H: RetryHook<E>,
    {
        if !self.retry_on.should_retry(error) {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, "failure is not retryable, giving up");
            return None;
        }

        let next_delay = self.policy.delay_after(attempt);

        self.hook.on_retry(&RetryEvent {
            attempt,
            error,
            next_delay,
            elapsed,
        });

        #[cfg(feature = "tracing")]
        match next_delay {
            Some(delay) => tracing::debug!(attempt, ?delay, "attempt failed, retrying"),
            None => tracing::warn!(attempts = attempt, "retry budget exhausted"),
        }

        next_delay
    }
}

impl<R, S, H> Retrier<'_, R, S, H> {
    /// Run `operation` and return its outcome unchanged.
    pub fn run<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        R: RetryOn<E>,
        S: Sleep,
        H: RetryHook<E>,
    {
        self.run_reported(operation)
            .map(Attempted::into_inner)
            .map_err(Attempted::into_inner)
    }

    /// Run `operation` and report how many attempts it took.
    pub fn run_reported<T, E, F>(&self, mut operation: F) -> Result<Attempted<T>, Attempted<E>>
    where
        F: FnMut() -> Result<T, E>,
        R: RetryOn<E>,
        S: Sleep,
        H: RetryHook<E>,
    {
        let start = Instant::now();
        let mut attempt = 1u32;

        loop {
            let delay = match operation() {
                Ok(value) => return Ok(Attempted::new(value, attempt, start.elapsed())),
                Err(error) => match self.next_step(attempt, &error, start.elapsed()) {
                    Some(delay) => delay,
                    None => return Err(Attempted::new(error, attempt, start.elapsed())),
                },
            };
            self.sleeper.sleep(delay);
            attempt += 1;
        }
    }
}

/// Run `operation` under `policy`, retrying every failure.
///
/// Returns the first success, or the failure of the last attempt once
/// `policy.max_attempts()` attempts have failed.
///
/// # Examples
///
/// ```rust
/// use steadfast::{retry, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(1)).unwrap();
/// let mut calls = 0;
///
/// let result: Result<u32, String> = retry(&policy, || {
///     calls += 1;
///     Err(format!("failure #{}", calls))
/// });
///
/// assert_eq!(result, Err("failure #3".to_string()));
/// assert_eq!(calls, 3);
/// ```
pub fn retry<T, E, F>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    policy.retrier().run(operation)
}

/// Retry only when `retry_on` accepts the error.
///
/// Non-retryable errors are returned on first occurrence, without waiting
/// and without using the rest of the budget.
///
/// # Examples
///
/// ```rust
/// use steadfast::{retry_if, RetryPolicy};
/// use std::time::Duration;
///
/// #[derive(Debug, PartialEq)]
/// enum AppError { Transient, Permanent }
///
/// let policy = RetryPolicy::new(5, Duration::from_millis(10)).unwrap();
/// let mut calls = 0;
///
/// let result: Result<(), AppError> = retry_if(
///     &policy,
///     || { calls += 1; Err(AppError::Permanent) },
///     |err: &AppError| matches!(err, AppError::Transient),
/// );
///
/// assert_eq!(result, Err(AppError::Permanent));
/// assert_eq!(calls, 1);
/// ```
pub fn retry_if<T, E, F, R>(policy: &RetryPolicy, operation: F, retry_on: R) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    R: RetryOn<E>,
{
    policy.retrier().retry_on(retry_on).run(operation)
}

/// Retry with a hook for observability.
///
/// `on_retry` runs once per retryable failure, before the sleep. On the
/// attempt that exhausts the budget it sees `next_delay == None`. It is
/// synchronous and should not block; use it for logging and metrics.
///
/// # Examples
///
/// ```rust
/// use steadfast::{retry_with_hooks, AnyFailure, RetryEvent, RetryPolicy};
/// use std::cell::RefCell;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(1)).unwrap();
/// let seen = RefCell::new(Vec::new());
///
/// let _ = retry_with_hooks(
///     &policy,
///     || Err::<(), _>("down"),
///     AnyFailure,
///     |event: &RetryEvent<'_, &str>| seen.borrow_mut().push(event.attempt),
/// );
///
/// assert_eq!(*seen.borrow(), vec![1, 2, 3]);
/// ```
pub fn retry_with_hooks<T, E, F, R, H>(
    policy: &RetryPolicy,
    operation: F,
    retry_on: R,
    on_retry: H,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    R: RetryOn<E>,
    H: RetryHook<E>,
{
    policy
        .retrier()
        .retry_on(retry_on)
        .on_retry(on_retry)
        .run(operation)
}

/// Retry and report the attempt count and elapsed time alongside the outcome.
pub fn retry_reported<T, E, F, R>(
    policy: &RetryPolicy,
    operation: F,
    retry_on: R,
) -> Result<Attempted<T>, Attempted<E>>
where
    F: FnMut() -> Result<T, E>,
    R: RetryOn<E>,
{
    policy.retrier().retry_on(retry_on).run_reported(operation)
}
