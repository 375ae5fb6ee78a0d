//! # Steadfast
//!
//! > *"Try, wait, try again. Then let go."*
//!
//! A small Rust library for bounded retry of fallible operations.
//!
//! ## Philosophy
//!
//! **Steadfast** keeps the retry decision separate from the retry loop:
//! - **Policy** = Pure data (attempt budget, delay, backoff)
//! - **Executor** = The shell that runs the operation and waits
//!
//! Errors come back exactly as the operation produced them. The policy never
//! invents its own error type around yours.
//!
//! ## Quick Example
//!
//! ```rust
//! use steadfast::{retry_if, RetryPolicy};
//! use std::time::Duration;
//!
//! #[derive(Debug, PartialEq)]
//! enum FetchError {
//!     Timeout,
//!     NotFound,
//! }
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
//! let mut calls = 0;
//!
//! let result = retry_if(
//!     &policy,
//!     || {
//!         calls += 1;
//!         if calls < 3 { Err(FetchError::Timeout) } else { Ok("payload") }
//!     },
//!     |err: &FetchError| *err == FetchError::Timeout,
//! );
//!
//! assert_eq!(result, Ok("payload"));
//!
//! // Errors outside the retryable set fail fast.
//! let mut calls = 0;
//! let result: Result<(), _> = retry_if(
//!     &policy,
//!     || { calls += 1; Err(FetchError::NotFound) },
//!     |err: &FetchError| *err == FetchError::Timeout,
//! );
//! assert_eq!(result, Err(FetchError::NotFound));
//! assert_eq!(calls, 1);
//! ```
//!
//! ## Features
//!
//! - `async`: `retry_async` / `retry_if_async` on the tokio clock
//! - `tracing`: debug/warn events for retries and exhaustion
//! - `serde`: load a [`RetryPolicy`] from configuration
//! - `proptest`: `Arbitrary` for [`RetryPolicy`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod fallback;
pub mod retry;
pub mod testing;

// Re-exports
pub use retry::{
    retry, retry_if, retry_reported, retry_with_hooks, AnyFailure, Attempted, Backoff, HasKind,
    KindSet, Not, PolicyError, Retrier, RetryEvent, RetryOn, RetryPolicy,
};
#[cfg(feature = "async")]
pub use retry::{retry_async, retry_if_async};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::retry::{
        retry, retry_if, AnyFailure, KindSet, RetryOn, RetryPolicy, Sleep, SystemSleep,
    };
    #[cfg(feature = "async")]
    pub use crate::retry::{retry_async, retry_if_async};
}
