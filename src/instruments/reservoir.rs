//! Fixed-size uniform sample of observed values.
//!
//! This module provides [`Reservoir`], a sample instrument implementing classic
//! reservoir sampling: however many values are recorded between two snapshots,
//! the reservoir holds a uniform random sample of at most `capacity` of them.
//!
//! # Algorithm
//!
//! ```text
//! k = 1-based index of this observation since the last snapshot
//!
//! k <= capacity   store at slot k - 1            (still filling)
//! k >  capacity   j = uniform in [0, k)
//!                 j <  capacity  overwrite slot j
//!                 j >= capacity  discard
//! ```
//!
//! so the k-th observation ends up in the sample with probability
//! `capacity / k`, and every observation seen so far is equally likely to be
//! in it. A snapshot resets only the observation count; stale slot contents
//! are never read again and get overwritten as the reservoir refills.

use std::fmt::{self, Debug};
use std::sync::{Mutex, MutexGuard};

use log::warn;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::instruments::cell::AtomicCell;
use crate::instruments::Sample;

/// Number of slots in a reservoir created with [`Reservoir::new`].
pub const DEFAULT_RESERVOIR_CAPACITY: usize = 1024;

/// Slot storage and the generator that picks replacement slots.
struct Slots {
    values: Box<[i64]>,
    rng: SmallRng,
}

/// A bounded uniform random sample of recorded values.
///
/// # Examples
///
/// ```rust
/// use woodpecker::{Reservoir, Sample};
///
/// let latencies = Reservoir::with_capacity(3).unwrap();
/// latencies.record(1);
/// latencies.record(-10);
/// latencies.record(23);
/// assert_eq!(latencies.snapshot(), vec![-10, 1, 23]);
///
/// // Past capacity, the sample stays at three values.
/// for v in 0..100 {
///     latencies.record(v);
/// }
/// assert_eq!(latencies.snapshot().len(), 3);
/// ```
pub struct Reservoir {
    /// Observations since the last snapshot.
    count: AtomicCell,
    slots: Mutex<Slots>,
    capacity: usize,
}

impl Reservoir {
    /// Creates a reservoir with [`DEFAULT_RESERVOIR_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::build(
            vec![0; DEFAULT_RESERVOIR_CAPACITY].into_boxed_slice(),
            SmallRng::from_rng(&mut rand::rng()),
        )
    }

    /// Creates a reservoir holding at most `capacity` values per snapshot.
    ///
    /// Fails with [`Error::InvalidCapacity`] if `capacity` is zero or too
    /// large for its slots to be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let values = Self::allocate(capacity)?;
        Ok(Self::build(values, SmallRng::from_rng(&mut rand::rng())))
    }

    /// Creates a reservoir whose slot choices are driven by a fixed seed.
    ///
    /// Two reservoirs with the same capacity and seed that see the same
    /// values produce the same snapshots.
    pub fn seeded(capacity: usize, seed: u64) -> Result<Self> {
        let values = Self::allocate(capacity)?;
        Ok(Self::build(values, SmallRng::seed_from_u64(seed)))
    }

    fn allocate(capacity: usize) -> Result<Box<[i64]>> {
        if capacity == 0 {
            warn!("rejecting reservoir with zero capacity");
            return Err(Error::InvalidCapacity { capacity });
        }
        let mut values = Vec::new();
        if let Err(err) = values.try_reserve_exact(capacity) {
            warn!("rejecting reservoir with capacity {capacity}: {err}");
            return Err(Error::InvalidCapacity { capacity });
        }
        values.resize(capacity, 0);
        Ok(values.into_boxed_slice())
    }

    fn build(values: Box<[i64]>, rng: SmallRng) -> Self {
        Reservoir {
            count: AtomicCell::new(0),
            capacity: values.len(),
            slots: Mutex::new(Slots { values, rng }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Offers `value` to the sample.
    pub fn record(&self, value: i64) {
        let mut slots = self.lock();
        let seen = self.count.fetch_add(1).wrapping_add(1);
        let k = usize::try_from(seen).unwrap_or(usize::MAX);
        if k <= self.capacity {
            slots.values[k - 1] = value;
        } else {
            let j = slots.rng.random_range(0..k);
            if j < self.capacity {
                slots.values[j] = value;
            }
        }
    }

    /// Returns the maximum number of values a snapshot can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns how many values have been recorded since the last snapshot.
    #[inline]
    pub fn observed(&self) -> usize {
        usize::try_from(self.count.load()).unwrap_or(0)
    }

    /// Returns how many values the next snapshot would hold.
    #[inline]
    pub fn len(&self) -> usize {
        self.observed().min(self.capacity)
    }

    /// Returns `true` if nothing has been recorded since the last snapshot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sample for Reservoir {
    /// Returns the sampled values in ascending order and empties the sample.
    fn snapshot(&self) -> Vec<i64> {
        let mut values = {
            let slots = self.lock();
            let seen = usize::try_from(self.count.swap(0)).unwrap_or(0);
            slots.values[..seen.min(self.capacity)].to_vec()
        };
        values.sort_unstable();
        values
    }
}

impl Default for Reservoir {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Reservoir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reservoir{{ capacity:{} observed:{} }}",
            self.capacity,
            self.observed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new() {
        let reservoir = Reservoir::new();
        assert_eq!(reservoir.capacity(), DEFAULT_RESERVOIR_CAPACITY);
        assert!(reservoir.is_empty());
        assert!(reservoir.snapshot().is_empty());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            Reservoir::with_capacity(0).unwrap_err(),
            Error::InvalidCapacity { capacity: 0 }
        );
        assert!(Reservoir::seeded(0, 7).is_err());
    }

    #[test]
    fn test_unallocatable_capacity_rejected() {
        assert_eq!(
            Reservoir::with_capacity(usize::MAX).unwrap_err(),
            Error::InvalidCapacity {
                capacity: usize::MAX
            }
        );
        assert!(Reservoir::seeded(usize::MAX / 2, 7).is_err());
    }

    #[test]
    fn test_single_value() {
        let reservoir = Reservoir::with_capacity(3).unwrap();
        reservoir.record(1);
        assert_eq!(reservoir.snapshot(), vec![1]);
    }

    #[test]
    fn test_full() {
        let reservoir = Reservoir::with_capacity(3).unwrap();
        reservoir.record(1);
        reservoir.record(-10);
        reservoir.record(23);
        assert_eq!(reservoir.len(), 3);
        assert_eq!(reservoir.snapshot(), vec![-10, 1, 23]);
    }

    #[test]
    fn test_overflow() {
        let reservoir = Reservoir::with_capacity(3).unwrap();
        let recorded = [1, -10, 23, 18];
        for v in recorded {
            reservoir.record(v);
        }
        assert_eq!(reservoir.observed(), 4);
        assert_eq!(reservoir.len(), 3);

        let snapshot = reservoir.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|v| recorded.contains(v)));
        assert!(snapshot.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_snapshot_resets() {
        let reservoir = Reservoir::with_capacity(3).unwrap();
        for v in [5, 6, 7, 8] {
            reservoir.record(v);
        }
        assert_eq!(reservoir.snapshot().len(), 3);
        assert!(reservoir.is_empty());
        assert!(reservoir.snapshot().is_empty());

        // Stale slots are not reported after a reset.
        reservoir.record(1);
        assert_eq!(reservoir.snapshot(), vec![1]);
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let a = Reservoir::seeded(4, 42).unwrap();
        let b = Reservoir::seeded(4, 42).unwrap();
        for v in 0..1000 {
            a.record(v);
            b.record(v);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_uniformity() {
        const CAPACITY: usize = 10;
        const OBSERVATIONS: usize = 100;
        const TRIALS: u64 = 20_000;

        let mut hits = [0u64; OBSERVATIONS];
        for seed in 0..TRIALS {
            let reservoir = Reservoir::seeded(CAPACITY, seed).unwrap();
            for v in 0..OBSERVATIONS {
                reservoir.record(v as i64);
            }
            for v in reservoir.snapshot() {
                hits[v as usize] += 1;
            }
        }

        // Each observation should be kept with probability C/N.
        let expected = TRIALS as f64 * CAPACITY as f64 / OBSERVATIONS as f64;
        for (value, &count) in hits.iter().enumerate() {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(
                deviation < 0.15,
                "value {value} kept {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_multiple_threads() {
        let reservoir = Arc::new(Reservoir::with_capacity(64).unwrap());
        let mut handles = vec![];

        for t in 0..4 {
            let r = Arc::clone(&reservoir);
            handles.push(thread::spawn(move || {
                for i in 0..1000 {
                    r.record(t * 1000 + i);
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(reservoir.observed(), 4000);
        let snapshot = reservoir.snapshot();
        assert_eq!(snapshot.len(), 64);
        assert!(snapshot.iter().all(|v| (0..4000).contains(v)));
    }

    #[test]
    fn test_debug() {
        let reservoir = Reservoir::with_capacity(8).unwrap();
        reservoir.record(1);
        assert_eq!(
            format!("{:?}", reservoir),
            "Reservoir{ capacity:8 observed:1 }"
        );
    }
}
