//! Rate of change of an absolute value.
//!
//! [`Derive`] is for values the application only knows as running totals,
//! such as bytes read from a socket or an OS counter. Each record feeds the
//! difference from the previous total into an embedded [`Rate`], so a snapshot
//! reports how fast the total is moving per second.

use std::fmt::{self, Debug};
use std::time::Instant;

use crate::error::Result;
use crate::instruments::cell::AtomicCell;
use crate::instruments::rate::Rate;
use crate::instruments::Discrete;

/// A meter reporting the per-second rate of change of a tracked total.
///
/// # Examples
///
/// ```rust
/// use std::thread;
/// use std::time::Duration;
/// use woodpecker::{Derive, Discrete};
///
/// let bytes_read = Derive::new(1_000);
/// thread::sleep(Duration::from_millis(50));
/// bytes_read.record(1_500);
///
/// assert_eq!(bytes_read.value(), 1_500);
/// assert!(bytes_read.snapshot() > 0);
/// ```
pub struct Derive {
    value: AtomicCell,
    rate: Rate,
}

impl Derive {
    /// Creates a new meter tracking a total that currently equals `value`.
    pub fn new(value: i64) -> Self {
        Derive {
            value: AtomicCell::new(value),
            rate: Rate::new(),
        }
    }

    /// Creates a new meter tracking a total that equalled `value` at `start`.
    ///
    /// Fails like [`Rate::since`] when `start` is in the future.
    pub fn since(value: i64, start: Instant) -> Result<Self> {
        Ok(Derive {
            value: AtomicCell::new(value),
            rate: Rate::since(start)?,
        })
    }

    /// Records the current total, counting the change since the previous one.
    #[inline]
    pub fn record(&self, value: i64) {
        let previous = self.value.swap(value);
        self.rate.record(value.wrapping_sub(previous));
    }

    /// Returns the last recorded total.
    #[inline]
    pub fn value(&self) -> i64 {
        self.value.load()
    }
}

impl Discrete for Derive {
    /// Returns the per-second change of the total since the previous snapshot.
    #[inline]
    fn snapshot(&self) -> i64 {
        self.rate.snapshot()
    }
}

impl Debug for Derive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Derive{{ value:{:?} rate:{:?} }}", self.value, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_record_tracks_value() {
        let derive = Derive::new(10);
        thread::sleep(Duration::from_millis(50));
        derive.record(15);
        assert_eq!(derive.value(), 15);
        assert_eq!(derive.rate.pending(), 5);
    }

    #[test]
    fn test_deltas_accumulate() {
        let derive = Derive::new(0);
        derive.record(10);
        derive.record(25);
        derive.record(20);
        assert_eq!(derive.rate.pending(), 20);
    }

    #[test]
    fn test_since_future_rejected() {
        let start = Instant::now() + Duration::from_secs(3600);
        assert!(Derive::since(0, start).is_err());
    }

    #[test]
    fn test_steady_rate() {
        let start = Instant::now();
        let derive = Derive::since(0, start).unwrap();
        derive.record(500);
        thread::sleep(Duration::from_millis(100));
        derive.record(1_000);

        let measured = derive.snapshot();
        let elapsed = start.elapsed();

        let lower = 1_000 * 1_000_000_000 / i64::try_from(elapsed.as_nanos()).unwrap();
        assert!(
            measured >= lower && measured <= 10_000,
            "rate {measured} outside [{lower}, 10000]"
        );
        assert_eq!(derive.snapshot(), 0);
    }

    #[test]
    fn test_concurrent_records_keep_deltas_consistent() {
        let derive = Arc::new(Derive::new(0));
        let mut handles = vec![];

        for t in 0..4 {
            let d = Arc::clone(&derive);
            handles.push(thread::spawn(move || {
                for i in 0..1000 {
                    d.record(t * 1000 + i);
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        // Deltas telescope to the final total minus the initial one.
        assert_eq!(derive.rate.pending(), derive.value());
    }

    #[test]
    fn test_debug() {
        let derive = Derive::new(7);
        let debug_str = format!("{:?}", derive);
        assert!(debug_str.starts_with("Derive{"));
        assert!(debug_str.contains("value:7"));
    }
}
