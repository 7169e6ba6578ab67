//! Accumulating counter that resets on every snapshot.
//!
//! This module provides [`Counter`], the simplest discrete instrument: every
//! increment is a single lock-free atomic add, and a snapshot swaps the total
//! back to zero.

use std::fmt::{self, Debug};

use crate::instruments::cell::AtomicCell;
use crate::instruments::Discrete;

/// A counter that reports the sum of its increments since the last snapshot.
///
/// Increments may be negative, so the counter can also be decremented. Each
/// [`snapshot`](Discrete::snapshot) returns the accumulated total and starts
/// again from zero.
///
/// # Concurrent snapshots
///
/// An increment racing with a snapshot is counted in exactly one interval,
/// either the one being harvested or the next one. Two concurrent snapshots
/// split the total between them; nothing is lost or counted twice.
///
/// # Const Initialization
///
/// ```rust
/// use woodpecker::Counter;
///
/// static REQUESTS: Counter = Counter::new();
/// REQUESTS.increment();
/// ```
///
/// # Examples
///
/// ```rust
/// use woodpecker::{Counter, Discrete};
///
/// let counter = Counter::new();
/// for i in 1..=10 {
///     counter.increment_by(i);
/// }
/// assert_eq!(counter.snapshot(), 55);
/// assert_eq!(counter.snapshot(), 0);
/// ```
pub struct Counter {
    count: AtomicCell,
}

impl Counter {
    /// Creates a new counter starting at zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a new counter starting at `value`.
    ///
    /// The starting value is included in the first snapshot.
    ///
    /// ```rust
    /// use woodpecker::{Counter, Discrete};
    ///
    /// let counter = Counter::starting_at(100);
    /// counter.increment();
    /// assert_eq!(counter.snapshot(), 101);
    /// ```
    pub const fn starting_at(value: i64) -> Self {
        Counter {
            count: AtomicCell::new(value),
        }
    }

    /// Increments the counter by one.
    #[inline]
    pub fn increment(&self) {
        self.count.increment();
    }

    /// Increments the counter by `delta`, which may be negative.
    #[inline]
    pub fn increment_by(&self, delta: i64) {
        self.count.add(delta);
    }

    /// Returns the total accumulated so far without resetting it.
    #[inline]
    pub fn value(&self) -> i64 {
        self.count.load()
    }
}

impl Discrete for Counter {
    /// Returns the accumulated total and resets the counter to zero.
    #[inline]
    fn snapshot(&self) -> i64 {
        self.count.swap(0)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counter{{ count:{:?} }}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new() {
        let counter = Counter::new();
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.snapshot(), 0);
    }

    #[test]
    fn test_starting_at() {
        let counter = Counter::starting_at(-5);
        assert_eq!(counter.value(), -5);
        assert_eq!(counter.snapshot(), -5);
        assert_eq!(counter.snapshot(), 0);
    }

    #[test]
    fn test_increment() {
        let counter = Counter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_sum_then_reset() {
        let counter = Counter::new();
        for i in 1..=10 {
            counter.increment_by(i);
        }
        assert_eq!(counter.snapshot(), 55);
        assert_eq!(counter.snapshot(), 0);
    }

    #[test]
    fn test_decrement() {
        let counter = Counter::new();
        counter.increment_by(10);
        counter.increment_by(-15);
        assert_eq!(counter.snapshot(), -5);
    }

    #[test]
    fn test_value_does_not_reset() {
        let counter = Counter::new();
        counter.increment_by(3);
        assert_eq!(counter.value(), 3);
        assert_eq!(counter.value(), 3);
        assert_eq!(counter.snapshot(), 3);
    }

    #[test]
    fn test_multiple_threads() {
        let counter = Arc::new(Counter::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let c = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    c.increment();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(counter.snapshot(), 4000);
    }

    #[test]
    fn test_concurrent_snapshots_lose_nothing() {
        let counter = Arc::new(Counter::new());
        let mut writers = vec![];

        for _ in 0..4 {
            let c = Arc::clone(&counter);
            writers.push(thread::spawn(move || {
                for _ in 0..10_000 {
                    c.increment();
                }
            }));
        }

        let harvester = {
            let c = Arc::clone(&counter);
            thread::spawn(move || {
                let mut harvested = 0;
                for _ in 0..100 {
                    harvested += c.snapshot();
                    thread::yield_now();
                }
                harvested
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        let harvested = harvester.join().unwrap();

        assert_eq!(harvested + counter.snapshot(), 40_000);
    }

    #[test]
    fn test_debug() {
        let counter = Counter::starting_at(42);
        let debug_str = format!("{:?}", counter);
        assert!(debug_str.starts_with("Counter{"));
        assert!(debug_str.contains("42"));
    }

    #[test]
    fn test_default() {
        assert_eq!(Counter::default().value(), 0);
    }
}
