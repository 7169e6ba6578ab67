//! Instrument implementations and the traits they share.
//!
//! Every instrument is updated from the hot path by many threads at once and
//! harvested from time to time by a single collector. Harvesting goes through
//! one of two capability traits:
//!
//! - [`Discrete`] instruments produce a single `i64` per snapshot
//!   ([`Counter`](counter::Counter), [`Gauge`](gauge::Gauge),
//!   [`Rate`](rate::Rate), [`Derive`](derive::Derive)).
//! - [`Sample`] instruments produce a sorted `Vec<i64>` per snapshot
//!   ([`Reservoir`](reservoir::Reservoir), [`Timing`](timing::Timing)).
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────┐
//!   record() ─────►  │ AtomicCell   │  lock-free, SeqCst
//!                    └──────┬───────┘
//!          ┌────────────────┼──────────────────┐
//!          ▼                ▼                  ▼
//!      Counter           Gauge         Rate = Counter + AtomicInstant + Mutex
//!                                          ▲
//!                                      Derive = AtomicCell + Rate
//!
//!      Reservoir = AtomicCell (count) + Mutex<slots, rng>
//!      Timing    = Reservoir of elapsed nanoseconds
//! ```
//!
//! No instrument holds its own lock while calling into another instrument's
//! locked method, so instruments can be freely composed.
//!
//! Type-erased handles to either kind are carried around as [`Instrument`],
//! which is what the [`Registry`](crate::registry::Registry) stores.

pub mod cell;
pub mod counter;
pub mod derive;
pub mod gauge;
pub mod rate;
pub mod reservoir;
pub mod timing;

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use counter::Counter;
use derive::Derive;
use gauge::Gauge;
use rate::Rate;
use reservoir::Reservoir;
use timing::Timing;

/// An instrument whose snapshot is a single integer.
///
/// What "reset" means depends on the instrument: a [`Counter`] goes back to
/// zero, a [`Gauge`] keeps its value, a [`Rate`] starts a new time window.
///
/// # Examples
///
/// ```rust
/// use woodpecker::{Counter, Discrete};
///
/// let counter = Counter::new();
/// counter.increment_by(5);
///
/// let discrete: &dyn Discrete = &counter;
/// assert_eq!(discrete.snapshot(), 5);
/// assert_eq!(discrete.snapshot(), 0);
/// ```
pub trait Discrete: Debug + Send + Sync {
    /// Returns the value observed for the current interval and starts a new one.
    fn snapshot(&self) -> i64;
}

/// An instrument whose snapshot is a sample of values.
pub trait Sample: Debug + Send + Sync {
    /// Returns the values observed for the current interval, sorted in
    /// ascending order, and starts a new interval.
    fn snapshot(&self) -> Vec<i64>;
}

/// The capability shape of an [`Instrument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// Snapshots to a single integer.
    Discrete,
    /// Snapshots to a sorted sequence of integers.
    Sample,
}

/// A shared, type-erased handle to any instrument.
///
/// Cloning an `Instrument` clones the handle, not the instrument: the
/// application keeps updating the same object the collector later harvests.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use woodpecker::{Counter, Instrument, InstrumentKind, Measurement};
///
/// let requests = Arc::new(Counter::new());
/// let handle = Instrument::from(Arc::clone(&requests));
///
/// requests.increment();
/// assert_eq!(handle.kind(), InstrumentKind::Discrete);
/// assert_eq!(handle.snapshot(), Measurement::Value(1));
/// ```
#[derive(Debug, Clone)]
pub enum Instrument {
    /// A handle to a [`Discrete`] instrument.
    Discrete(Arc<dyn Discrete>),
    /// A handle to a [`Sample`] instrument.
    Sample(Arc<dyn Sample>),
}

impl Instrument {
    /// Returns the capability shape of the instrument behind this handle.
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Instrument::Discrete(_) => InstrumentKind::Discrete,
            Instrument::Sample(_) => InstrumentKind::Sample,
        }
    }

    /// Snapshots the underlying instrument, resetting it as its kind dictates.
    pub fn snapshot(&self) -> Measurement {
        match self {
            Instrument::Discrete(d) => Measurement::Value(d.snapshot()),
            Instrument::Sample(s) => Measurement::Values(s.snapshot()),
        }
    }

    /// Returns `true` if both handles point at the same instrument.
    pub fn ptr_eq(&self, other: &Instrument) -> bool {
        match (self, other) {
            (Instrument::Discrete(a), Instrument::Discrete(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Instrument::Sample(a), Instrument::Sample(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

macro_rules! impl_from_arc {
    ($variant:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl From<Arc<$ty>> for Instrument {
                fn from(instrument: Arc<$ty>) -> Self {
                    Instrument::$variant(instrument)
                }
            }

            impl From<$ty> for Instrument {
                fn from(instrument: $ty) -> Self {
                    Instrument::$variant(Arc::new(instrument))
                }
            }
        )+
    };
}

impl_from_arc!(Discrete => Counter, Gauge, Rate, Derive);
impl_from_arc!(Sample => Reservoir, Timing);

/// The harvested value of a single instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Measurement {
    /// The snapshot of a [`Discrete`] instrument.
    Value(i64),
    /// The sorted snapshot of a [`Sample`] instrument.
    Values(Vec<i64>),
}

impl Measurement {
    /// Returns the single value, if this is a discrete measurement.
    pub fn as_value(&self) -> Option<i64> {
        match self {
            Measurement::Value(v) => Some(*v),
            Measurement::Values(_) => None,
        }
    }

    /// Returns the sampled values, if this is a sample measurement.
    pub fn as_values(&self) -> Option<&[i64]> {
        match self {
            Measurement::Value(_) => None,
            Measurement::Values(v) => Some(v),
        }
    }

    /// Returns `true` if this is a sample measurement holding no values.
    ///
    /// A discrete measurement always carries a value, zero included, so it
    /// is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Measurement::Value(_) => false,
            Measurement::Values(v) => v.is_empty(),
        }
    }

    /// Returns `true` if this is a discrete measurement equal to zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Measurement::Value(0))
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Value(v) => write!(f, "{v}"),
            Measurement::Values(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}
