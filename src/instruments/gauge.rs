//! Last-value gauge.
//!
//! This module provides [`Gauge`], a discrete instrument holding the most
//! recently recorded value. Unlike [`Counter`](super::counter::Counter), a
//! snapshot does not reset it.

use std::fmt::{self, Debug};

use crate::instruments::cell::AtomicCell;
use crate::instruments::Discrete;

/// A gauge reporting the last value written to it.
///
/// # Examples
///
/// ```rust
/// use woodpecker::{Discrete, Gauge};
///
/// let queue_depth = Gauge::starting_at(1);
/// queue_depth.record(2);
///
/// assert_eq!(queue_depth.snapshot(), 2);
/// assert_eq!(queue_depth.snapshot(), 2);
/// ```
pub struct Gauge {
    value: AtomicCell,
}

impl Gauge {
    /// Creates a new gauge holding zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a new gauge holding `value` until the first record.
    pub const fn starting_at(value: i64) -> Self {
        Gauge {
            value: AtomicCell::new(value),
        }
    }

    /// Replaces the gauge value.
    #[inline]
    pub fn record(&self, value: i64) {
        self.value.store(value);
    }
}

impl Discrete for Gauge {
    /// Returns the last recorded value. Gauges are never reset.
    #[inline]
    fn snapshot(&self) -> i64 {
        self.value.load()
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gauge{{ value:{:?} }}", self.value)
    }
}
