//! Deciding which failures are worth another attempt.
//!
//! Every executor takes a [`RetryOn`] classifier. Failures it accepts consume
//! the attempt budget and are retried; failures it rejects are returned to the
//! caller straight away, however much budget is left.
//!
//! ```rust
//! use steadfast::{KindSet, RetryOn};
//! use std::io;
//!
//! let transient: KindSet<io::ErrorKind> =
//!     [io::ErrorKind::TimedOut, io::ErrorKind::Interrupted].into_iter().collect();
//!
//! assert!(transient.should_retry(&io::Error::from(io::ErrorKind::TimedOut)));
//! assert!(!transient.should_retry(&io::Error::from(io::ErrorKind::NotFound)));
//! ```

use std::collections::HashSet;
use std::hash::Hash;
use std::io;

/// Classifies failures as retryable or not.
///
/// Implemented for [`AnyFailure`], [`KindSet`], [`Not`] and every
/// `Fn(&E) -> bool` closure.
pub trait RetryOn<E> {
    /// Returns true if `error` should be retried.
    fn should_retry(&self, error: &E) -> bool;
}

impl<E, F> RetryOn<E> for F
where
    F: Fn(&E) -> bool,
{
    fn should_retry(&self, error: &E) -> bool {
        self(error)
    }
}

/// Treat every failure as retryable. The default classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyFailure;

impl<E> RetryOn<E> for AnyFailure {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// Invert a classifier: retry everything it rejects.
///
/// ```rust
/// use steadfast::{AnyFailure, Not, RetryOn};
///
/// // Never retry anything.
/// assert!(!Not(AnyFailure).should_retry(&"boom"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Not<R>(pub R);

impl<E, R> RetryOn<E> for Not<R>
where
    R: RetryOn<E>,
{
    fn should_retry(&self, error: &E) -> bool {
        !self.0.should_retry(error)
    }
}

/// An error type that can report a coarse, comparable kind.
pub trait HasKind {
    /// The kind discriminant.
    type Kind: Eq + Hash;

    /// The kind of this error.
    fn kind(&self) -> Self::Kind;
}

impl HasKind for io::Error {
    type Kind = io::ErrorKind;

    fn kind(&self) -> io::ErrorKind {
        io::Error::kind(self)
    }
}

/// A set of error kinds that should be retried.
///
/// Works with any error implementing [`HasKind`].
#[derive(Debug, Clone)]
pub struct KindSet<K> {
    kinds: HashSet<K>,
}

impl<K: Eq + Hash> KindSet<K> {
    /// An empty set: nothing is retried.
    pub fn new() -> Self {
        Self {
            kinds: HashSet::new(),
        }
    }

    /// Add a kind to the set.
    pub fn with(mut self, kind: K) -> Self {
        self.kinds.insert(kind);
        self
    }

    /// Returns true if `kind` is in the set.
    pub fn contains(&self, kind: &K) -> bool {
        self.kinds.contains(kind)
    }

    /// Number of kinds in the set.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if no kind is retried.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl<K: Eq + Hash> PartialEq for KindSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.kinds == other.kinds
    }
}

impl<K: Eq + Hash> Eq for KindSet<K> {}

impl<K: Eq + Hash> Default for KindSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> FromIterator<K> for KindSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

impl<E> RetryOn<E> for KindSet<E::Kind>
where
    E: HasKind,
{
    fn should_retry(&self, error: &E) -> bool {
        self.kinds.contains(&error.kind())
    }
}
