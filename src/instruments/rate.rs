//! Events-per-second rate meter.
//!
//! This module provides [`Rate`], a discrete instrument that counts events and
//! reports how many arrived per second since the previous snapshot.
//!
//! # Design
//!
//! The `Rate` meter uses:
//! - a [`Counter`] for the events of the current window (lock-free records)
//! - an [`AtomicCell`] holding the window start as nanoseconds past a fixed
//!   origin instant, so the start can be swapped atomically
//! - a `Mutex<()>` serializing snapshots, so the timestamp swap and the
//!   counter reset are observed as one step by concurrent snapshots
//!
//! Recording never takes the lock.
//!
//! # Examples
//!
//! ```rust
//! use std::thread;
//! use std::time::Duration;
//! use woodpecker::{Discrete, Rate};
//!
//! let requests = Rate::new();
//! requests.record(100);
//!
//! thread::sleep(Duration::from_millis(100));
//!
//! // At most 100 / 0.1s = 1000 per second.
//! let per_second = requests.snapshot();
//! assert!(per_second > 0 && per_second <= 1000);
//! ```

use std::fmt::{self, Debug};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::instruments::cell::AtomicCell;
use crate::instruments::counter::Counter;
use crate::instruments::Discrete;

/// Nanoseconds per second, the scale between the clock and reported rates.
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A meter reporting events per second since the previous snapshot.
///
/// # Rate Calculation
///
/// ```text
/// rate = events_since_last_snapshot * NANOS_PER_SEC / elapsed_nanoseconds
/// ```
///
/// using truncating integer division. The elapsed interval is clamped to at
/// least one nanosecond, so back-to-back snapshots never divide by zero.
///
/// # Examples
///
/// Multi-threaded usage:
///
/// ```rust
/// use woodpecker::Rate;
/// use std::sync::Arc;
/// use std::thread;
///
/// let rate = Arc::new(Rate::new());
/// let mut handles = vec![];
///
/// for _ in 0..4 {
///     let r = Arc::clone(&rate);
///     handles.push(thread::spawn(move || {
///         for _ in 0..1000 {
///             r.record(1);
///         }
///     }));
/// }
///
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(rate.pending(), 4000);
/// ```
pub struct Rate {
    origin: Instant,
    /// Start of the current window, in nanoseconds past `origin`.
    time: AtomicCell,
    /// Events of the current window.
    count: Counter,
    lock: Mutex<()>,
}

impl Rate {
    /// Creates a new rate meter whose first window starts now.
    pub fn new() -> Self {
        Self::starting(Instant::now())
    }

    /// Creates a new rate meter whose first window started at `start`.
    ///
    /// Fails with [`Error::StartInFuture`] if `start` has not happened yet.
    ///
    /// ```rust
    /// use std::time::{Duration, Instant};
    /// use woodpecker::Rate;
    ///
    /// let earlier = Instant::now();
    /// assert!(Rate::since(earlier).is_ok());
    /// assert!(Rate::since(Instant::now() + Duration::from_secs(60)).is_err());
    /// ```
    pub fn since(start: Instant) -> Result<Self> {
        let now = Instant::now();
        if start > now {
            let ahead = start.duration_since(now);
            warn!("rejecting rate window starting {ahead:?} in the future");
            return Err(Error::StartInFuture { ahead });
        }
        Ok(Self::starting(start))
    }

    fn starting(start: Instant) -> Self {
        Rate {
            origin: start,
            time: AtomicCell::new(0),
            count: Counter::new(),
            lock: Mutex::new(()),
        }
    }

    /// Adds `events` to the current window.
    #[inline]
    pub fn record(&self, events: i64) {
        self.count.increment_by(events);
    }

    /// Returns the number of events recorded in the current window.
    #[inline]
    pub fn pending(&self) -> i64 {
        self.count.value()
    }

    /// Returns the start of the current window.
    pub fn window_start(&self) -> Instant {
        let offset = u64::try_from(self.time.load()).unwrap_or(0);
        self.origin + Duration::from_nanos(offset)
    }

    /// Closes the current window and opens the next one at the current
    /// instant, returning the closed window with the events it counted.
    fn take_window(&self) -> Window {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let end = self.offset_of(Instant::now());
        let start = self.time.swap(end);
        let count = self.count.snapshot();
        Window { start, end, count }
    }

    fn offset_of(&self, instant: Instant) -> i64 {
        let nanos = instant.saturating_duration_since(self.origin).as_nanos();
        i64::try_from(nanos).unwrap_or(i64::MAX)
    }
}

/// A closed measurement window, bounds in nanoseconds past the rate's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: i64,
    end: i64,
    count: i64,
}

impl Window {
    fn elapsed(&self) -> Duration {
        let nanos = self.end.saturating_sub(self.start).max(0);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(0))
    }
}

/// Converts `count` events over `elapsed` into events per second.
fn per_second(count: i64, elapsed: Duration) -> i64 {
    let mut nanos = elapsed.as_nanos();
    if nanos == 0 {
        debug!("rate snapshot with no clock advance, clamping interval to 1ns");
        nanos = 1;
    }
    let nanos = i128::try_from(nanos).unwrap_or(i128::MAX);
    let rate = i128::from(count) * i128::from(NANOS_PER_SEC) / nanos;
    i64::try_from(rate).unwrap_or(if rate < 0 { i64::MIN } else { i64::MAX })
}

impl Discrete for Rate {
    /// Returns the events per second since the previous snapshot and starts a
    /// new window.
    fn snapshot(&self) -> i64 {
        let window = self.take_window();
        per_second(window.count, window.elapsed())
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rate{{ pending:{} window:{:?} }}",
            self.pending(),
            self.window_start().elapsed()
        )
    }
}
