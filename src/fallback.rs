//! Run once, substitute a default on failure.
//!
//! The counterpart of retry for failures that are not worth another attempt:
//! the error is reported and a fallback value takes its place.
//!
//! ```rust
//! use steadfast::fallback::swallow;
//!
//! let port: u16 = swallow(|| "not a port".parse::<u16>(), 8080);
//! assert_eq!(port, 8080);
//! ```

use std::fmt::Debug;

/// Run `operation`; on failure report the error and return `default`.
pub fn swallow<T, E, F>(operation: F, default: T) -> T
where
    E: Debug,
    F: FnOnce() -> Result<T, E>,
{
    swallow_with(operation, |_| default)
}

/// Run `operation`; on failure report the error and return `T::default()`.
pub fn swallow_or_default<T, E, F>(operation: F) -> T
where
    T: Default,
    E: Debug,
    F: FnOnce() -> Result<T, E>,
{
    swallow_with(operation, |_| T::default())
}

/// Run `operation`; on failure report the error and compute a fallback from
/// it.
///
/// ```rust
/// use steadfast::fallback::swallow_with;
///
/// let len = swallow_with(
///     || Err::<usize, _>("unreadable"),
///     |err| err.len(),
/// );
/// assert_eq!(len, 10);
/// ```
pub fn swallow_with<T, E, F, D>(operation: F, fallback: D) -> T
where
    E: Debug,
    F: FnOnce() -> Result<T, E>,
    D: FnOnce(&E) -> T,
{
    match operation() {
        Ok(value) => value,
        Err(error) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(?error, "operation failed, using fallback value");
            #[cfg(not(feature = "tracing"))]
            eprintln!("operation failed, using fallback value: {:?}", error);
            fallback(&error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn success_passes_through() {
        assert_eq!(swallow(|| Ok::<_, String>(5), 0), 5);
    }

    #[test]
    fn failure_returns_default() {
        assert_eq!(swallow(|| Err::<i32, _>("boom"), -1), -1);
    }

    #[test]
    fn failure_returns_type_default() {
        let value: Vec<u8> = swallow_or_default(|| Err("boom"));
        assert!(value.is_empty());
    }

    #[test]
    fn fallback_sees_error() {
        let value = swallow_with(|| Err::<String, _>(404), |code| format!("status {}", code));
        assert_eq!(value, "status 404");
    }

    #[test]
    fn fallback_not_called_on_success() {
        let called = Cell::new(false);
        let value = swallow_with(
            || Ok::<_, ()>(1),
            |_| {
                called.set(true);
                0
            },
        );
        assert_eq!(value, 1);
        assert!(!called.get());
    }
}
