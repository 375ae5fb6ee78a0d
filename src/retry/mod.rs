//! Bounded retry for fallible operations.
//!
//! This module follows a "pure core, imperative shell" split:
//!
//! - **Pure Core**: [`RetryPolicy`] is just data: an attempt budget and a
//!   delay. It can be cloned, compared and asked what to do after a failure.
//! - **Classification**: a [`RetryOn`] decides which failures are transient.
//! - **Shell**: [`retry`], [`retry_if`], [`retry_with_hooks`] and the
//!   [`Retrier`] builder run the operation and do the waiting.
//!
//! # Quick Start
//!
//! ```rust
//! use steadfast::{retry, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
//! let mut calls = 0;
//!
//! let result = retry(&policy, || {
//!     calls += 1;
//!     if calls < 3 { Err("transient failure") } else { Ok(42) }
//! });
//!
//! assert_eq!(result, Ok(42));
//! assert_eq!(calls, 3);
//! ```
//!
//! # Contract
//!
//! - The operation runs at least once and at most `max_attempts` times.
//! - A success is returned immediately.
//! - A failure the classifier rejects is returned immediately.
//! - The failure of the last allowed attempt is returned as is. No delay
//!   follows it.
//! - Errors are never wrapped. [`retry_reported`] is the opt-in variant that
//!   adds attempt metadata around the untouched value.
//!
//! # Backoff
//!
//! - **Fixed**: the same delay before every retry (default)
//! - **Linear**: 100ms, 200ms, 300ms, ...
//! - **Exponential**: 100ms, 200ms, 400ms, ...
//!
//! # Logging
//!
//! Nothing is logged by default. Enable the `tracing` feature to get a
//! `debug` event per retry and a `warn` event when the budget runs out.

mod classify;
mod error;
mod executor;
mod future;
mod policy;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod sleep;

pub use classify::{AnyFailure, HasKind, KindSet, Not, RetryOn};
pub use error::{Attempted, PolicyError};
pub use executor::{retry, retry_if, retry_reported, retry_with_hooks, NoHook, Retrier, RetryHook};
#[cfg(feature = "async")]
pub use future::{retry_async, retry_if_async};
pub use policy::{Backoff, RetryEvent, RetryPolicy};
pub use sleep::{AsyncSleep, Sleep, SystemSleep};
