//! The atomic integer cell every discrete instrument is built on.
//!
//! [`AtomicCell`] is a cache-line padded `AtomicI64` whose operations all use
//! [`Ordering::SeqCst`]. Every mutation is one atomic primitive: instruments
//! never read-modify-write the cell with a separate load and store, which
//! would lose concurrent updates.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicI64, Ordering};

use crossbeam_utils::CachePadded;

/// A lock-free, sequentially consistent `i64` cell.
///
/// The value sits on its own cache line so that instruments allocated next to
/// each other do not invalidate each other's lines when updated from
/// different cores.
///
/// # Examples
///
/// ```rust
/// use woodpecker::instruments::cell::AtomicCell;
///
/// let cell = AtomicCell::new(10);
/// cell.increment();
/// cell.add(-4);
/// assert_eq!(cell.swap(0), 7);
/// assert_eq!(cell.load(), 0);
/// ```
pub struct AtomicCell {
    value: CachePadded<AtomicI64>,
}

impl AtomicCell {
    /// Creates a cell holding `value`.
    pub const fn new(value: i64) -> Self {
        AtomicCell {
            value: CachePadded::new(AtomicI64::new(value)),
        }
    }

    /// Reads the current value.
    #[inline]
    pub fn load(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Overwrites the current value.
    #[inline]
    pub fn store(&self, value: i64) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Replaces the current value, returning the previous one.
    #[inline]
    pub fn swap(&self, value: i64) -> i64 {
        self.value.swap(value, Ordering::SeqCst)
    }

    /// Adds `delta` (which may be negative), wrapping on overflow.
    #[inline]
    pub fn add(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::SeqCst);
    }

    /// Adds `delta` and returns the value the cell held before the addition.
    #[inline]
    pub fn fetch_add(&self, delta: i64) -> i64 {
        self.value.fetch_add(delta, Ordering::SeqCst)
    }

    /// Adds one.
    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }
}

impl Default for AtomicCell {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Debug for AtomicCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new() {
        assert_eq!(AtomicCell::new(-3).load(), -3);
        assert_eq!(AtomicCell::default().load(), 0);
    }

    #[test]
    fn test_const_new() {
        static CELL: AtomicCell = AtomicCell::new(0);
        CELL.increment();
        assert!(CELL.load() >= 1);
    }

    #[test]
    fn test_store_and_swap() {
        let cell = AtomicCell::new(1);
        cell.store(5);
        assert_eq!(cell.swap(9), 5);
        assert_eq!(cell.load(), 9);
    }

    #[test]
    fn test_add_wraps() {
        let cell = AtomicCell::new(i64::MAX);
        cell.increment();
        assert_eq!(cell.load(), i64::MIN);
    }

    #[test]
    fn test_fetch_add() {
        let cell = AtomicCell::new(0);
        assert_eq!(cell.fetch_add(1), 0);
        assert_eq!(cell.fetch_add(1), 1);
        assert_eq!(cell.load(), 2);
    }

    #[test]
    fn test_multiple_threads() {
        let cell = Arc::new(AtomicCell::new(0));
        let mut handles = vec![];

        for _ in 0..8 {
            let c = Arc::clone(&cell);
            handles.push(thread::spawn(move || {
                for _ in 0..10_000 {
                    c.increment();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cell.load(), 80_000);
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", AtomicCell::new(42)), "42");
    }
}
