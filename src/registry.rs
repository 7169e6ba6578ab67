//! Named collection of instruments, harvested and cleared in one step.
//!
//! A [`Registry`] is a set-and-forget map from names to [`Instrument`]
//! handles. Application code registers instruments once per reporting
//! interval; the collector calls [`Registry::snapshot`] to detach everything
//! registered so far, leaving the registry empty for the next interval.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use woodpecker::{Counter, Measurement, Registry, Timing};
//!
//! let registry = Registry::new();
//! let requests = Arc::new(Counter::new());
//! registry.register("requests", Arc::clone(&requests));
//! registry.register("latency", Timing::new());
//!
//! requests.increment_by(3);
//!
//! let harvested = registry.harvest();
//! assert_eq!(harvested.len(), 2);
//! assert_eq!(harvested[1], ("requests".to_string(), Measurement::Value(3)));
//! assert_eq!(registry.count(), 0);
//! ```

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::{Mutex, MutexGuard};

use log::{debug, trace};

use crate::instruments::{Instrument, Measurement};

/// A concurrency-safe map from names to instruments.
///
/// Registering a name that is already present replaces the previous
/// instrument. Every handle returned by [`snapshot`](Registry::snapshot) is
/// returned exactly once; instruments registered afterwards under the same
/// names belong to the next snapshot.
#[derive(Default)]
pub struct Registry {
    instruments: Mutex<HashMap<String, Instrument>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instrument>> {
        self.instruments.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers `instrument` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, instrument: impl Into<Instrument>) {
        let name = name.into();
        let instrument = instrument.into();
        trace!("registering {:?} instrument {name:?}", instrument.kind());
        if self.lock().insert(name.clone(), instrument).is_some() {
            debug!("instrument {name:?} replaced an earlier registration");
        }
    }

    /// Detaches and returns every registered instrument, leaving the registry
    /// empty.
    ///
    /// The instruments themselves are not snapshotted; the caller does that
    /// after the registry lock has been released.
    pub fn snapshot(&self) -> HashMap<String, Instrument> {
        let instruments = std::mem::take(&mut *self.lock());
        trace!("detached {} instruments from registry", instruments.len());
        instruments
    }

    /// Detaches every instrument and snapshots each one, sorted by name.
    pub fn harvest(&self) -> Vec<(String, Measurement)> {
        let mut measurements: Vec<_> = self
            .snapshot()
            .into_iter()
            .map(|(name, instrument)| {
                let measurement = instrument.snapshot();
                (name, measurement)
            })
            .collect();
        measurements.sort_by(|a, b| a.0.cmp(&b.0));
        measurements
    }

    /// Returns the number of registered names.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instruments = self.lock();
        let mut names: Vec<&str> = instruments.keys().map(String::as_str).collect();
        names.sort_unstable();
        write!(f, "Registry{{")?;
        for name in names {
            write!(f, " {name}")?;
        }
        write!(f, " }}")
    }
}
