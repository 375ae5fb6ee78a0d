//! Async execution.
//!
//! Same loop as the blocking executor, but each attempt is a future and the
//! delay is awaited. Attempt N+1 is not created before the delay after
//! attempt N has completed. A failed attempt's error is dropped before the
//! delay starts, so the error type never lives across an `.await`.

use std::future::Future;

use super::classify::RetryOn;
use super::error::Attempted;
use super::executor::{RetryHook, Retrier};
use super::sleep::AsyncSleep;
#[cfg(feature = "async")]
use super::RetryPolicy;

impl<R, S, H> Retrier<'_, R, S, H> {
    /// Run the futures produced by `make_attempt` and return the outcome
    /// unchanged.
    ///
    /// `make_attempt` is called once per attempt: each retry starts the
    /// operation from scratch.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::RetryPolicy;
    /// use steadfast::testing::RecordingSleep;
    /// use std::time::Duration;
    ///
    /// # futures::executor::block_on(async {
    /// let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
    /// let sleeper = RecordingSleep::new();
    /// let mut calls = 0;
    ///
    /// let result = policy
    ///     .retrier()
    ///     .sleep_with(&sleeper)
    ///     .run_async(|| {
    ///         calls += 1;
    ///         let n = calls;
    ///         async move { if n < 3 { Err("busy") } else { Ok(n) } }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(result, Ok(3));
    /// assert_eq!(sleeper.count(), 2);
    /// # });
    /// ```
    pub async fn run_async<T, E, F, Fut>(&self, make_attempt: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: RetryOn<E>,
        S: AsyncSleep,
        H: RetryHook<E>,
    {
        self.run_reported_async(make_attempt)
            .await
            .map(Attempted::into_inner)
            .map_err(Attempted::into_inner)
    }

    /// Async counterpart of [`Retrier::run_reported`].
    pub async fn run_reported_async<T, E, F, Fut>(
        &self,
        mut make_attempt: F,
    ) -> Result<Attempted<T>, Attempted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: RetryOn<E>,
        S: AsyncSleep,
        H: RetryHook<E>,
    {
        let start = self.sleeper.now();
        let elapsed = || self.sleeper.now().saturating_duration_since(start);
        let mut attempt = 1u32;

        loop {
            let delay = match make_attempt().await {
                Ok(value) => return Ok(Attempted::new(value, attempt, elapsed())),
                Err(error) => match self.next_step(attempt, &error, elapsed()) {
                    Some(delay) => delay,
                    None => return Err(Attempted::new(error, attempt, elapsed())),
                },
            };
            self.sleeper.sleep_async(delay).await;
            attempt += 1;
        }
    }
}

/// Async [`retry`](super::retry): retry every failure, sleeping on the tokio
/// clock.
///
/// # Examples
///
/// ```rust
/// use steadfast::{retry_async, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(1)).unwrap();
/// let mut calls = 0;
///
/// let result = tokio_test::block_on(retry_async(&policy, || {
///     calls += 1;
///     let n = calls;
///     async move { if n < 2 { Err("cold start") } else { Ok(42) } }
/// }));
///
/// assert_eq!(result, Ok(42));
/// assert_eq!(calls, 2);
/// ```
#[cfg(feature = "async")]
pub async fn retry_async<T, E, F, Fut>(policy: &RetryPolicy, make_attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    policy.retrier().run_async(make_attempt).await
}

/// Async [`retry_if`](super::retry_if): retry only failures `retry_on`
/// accepts.
#[cfg(feature = "async")]
pub async fn retry_if_async<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    make_attempt: F,
    retry_on: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: RetryOn<E>,
{
    policy
        .retrier()
        .retry_on(retry_on)
        .run_async(make_attempt)
        .await
}
