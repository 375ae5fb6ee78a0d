//! The time-delay primitive used between attempts.
//!
//! Executors never call a clock directly; they ask a [`Sleep`] (blocking) or
//! [`AsyncSleep`] (cooperative) to wait. Production code uses
//! [`SystemSleep`]; tests swap in
//! [`RecordingSleep`](crate::testing::RecordingSleep) to observe the delays
//! without waiting for them.

use std::time::{Duration, Instant};

use futures::future::BoxFuture;

/// Blocks the calling thread for a duration.
pub trait Sleep {
    /// Wait for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Suspends the current task for a duration.
pub trait AsyncSleep {
    /// Returns a future that completes after `duration`.
    fn sleep_async(&self, duration: Duration) -> BoxFuture<'static, ()>;

    /// The current time on the clock this sleeper waits on.
    ///
    /// Async executors measure elapsed time with it, so a sleeper backed by
    /// a simulated clock reports simulated time.
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The real clock.
///
/// Blocking sleeps use [`std::thread::sleep`]. With the `async` feature,
/// async sleeps use `tokio::time::sleep` and so honor paused time in
/// `#[tokio::test(start_paused = true)]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSleep;

impl Sleep for SystemSleep {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(feature = "async")]
impl AsyncSleep for SystemSleep {
    fn sleep_async(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

impl<S: Sleep + ?Sized> Sleep for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<S: AsyncSleep + ?Sized> AsyncSleep for &S {
    fn sleep_async(&self, duration: Duration) -> BoxFuture<'static, ()> {
        (**self).sleep_async(duration)
    }

    fn now(&self) -> Instant {
        (**self).now()
    }
}
