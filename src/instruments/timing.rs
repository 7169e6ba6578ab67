//! Reservoir of elapsed durations.
//!
//! [`Timing`] samples how long things take, in nanoseconds. It dereferences to
//! the [`Reservoir`] it wraps, so raw durations can also be recorded directly.

use std::fmt::{self, Debug};
use std::ops::Deref;
use std::time::Instant;

use crate::error::Result;
use crate::instruments::reservoir::Reservoir;
use crate::instruments::Sample;

/// A reservoir of elapsed times in nanoseconds.
///
/// # Examples
///
/// ```rust
/// use std::time::Instant;
/// use woodpecker::{Sample, Timing};
///
/// let handler = Timing::new();
///
/// let answer = handler.time(|| 6 * 7);
/// assert_eq!(answer, 42);
///
/// let start = Instant::now();
/// handler.since(start);
///
/// assert_eq!(handler.snapshot().len(), 2);
/// ```
pub struct Timing {
    reservoir: Reservoir,
}

impl Timing {
    /// Creates a timing reservoir with the default capacity.
    pub fn new() -> Self {
        Timing {
            reservoir: Reservoir::new(),
        }
    }

    /// Creates a timing reservoir holding at most `capacity` durations.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Timing {
            reservoir: Reservoir::with_capacity(capacity)?,
        })
    }

    /// Records the time elapsed since `start`.
    #[inline]
    pub fn since(&self, start: Instant) {
        let nanos = start.elapsed().as_nanos();
        self.reservoir.record(i64::try_from(nanos).unwrap_or(i64::MAX));
    }

    /// Runs `body` on the current thread and records how long it took.
    ///
    /// Nothing is recorded if `body` panics; the panic propagates to the
    /// caller.
    #[inline]
    pub fn time<F, R>(&self, body: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = body();
        self.since(start);
        result
    }
}

impl Deref for Timing {
    type Target = Reservoir;

    fn deref(&self) -> &Reservoir {
        &self.reservoir
    }
}

impl Sample for Timing {
    /// Returns the sampled durations in ascending order and empties the sample.
    #[inline]
    fn snapshot(&self) -> Vec<i64> {
        self.reservoir.snapshot()
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timing{{ capacity:{} observed:{} }}",
            self.capacity(),
            self.observed()
        )
    }
}
