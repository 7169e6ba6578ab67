//! # Woodpecker - In-Process Metrics Instruments
//!
//! A Rust library of thread-safe instruments that applications update on the
//! hot path, plus a [`Registry`] that a collector periodically harvests and
//! clears for export.
//!
//! ## The Model
//!
//! Application threads record into instruments as events happen. Every so
//! often a collector (an HTTP endpoint, a file sink, a push loop: whatever the
//! host application uses) harvests the registry:
//!
//! ```text
//!   hot path                        collector
//!   ────────                        ─────────
//!   counter.increment()   ─┐
//!   gauge.record(v)        │        registry.snapshot()   detach + clear map
//!   rate.record(n)         ├──►          │
//!   reservoir.record(v)    │             ▼
//!   timing.time(|| ..)    ─┘        instrument.snapshot() value + reset
//! ```
//!
//! ### Design Principles
//!
//! 1. **Single-op atomics**: every discrete update is one sequentially
//!    consistent atomic operation on an [`AtomicCell`](instruments::cell::AtomicCell),
//!    so concurrent updates are never lost.
//!
//! 2. **Short critical sections**: rates, reservoirs and the registry use a
//!    mutex held for a handful of memory operations. No instrument holds its
//!    lock while calling into another locked instrument.
//!
//! 3. **Reset on harvest**: a snapshot returns the value for the interval
//!    that just ended and starts a new one.
//!
//! ## Available Instruments
//!
//! | Type | Snapshot | Reset on snapshot | Use Case |
//! |------|----------|-------------------|----------|
//! | [`Counter`] | sum of increments | back to zero | request totals, errors |
//! | [`Gauge`] | last recorded value | never | queue depth, pool size |
//! | [`Rate`] | events per second | new window | throughput |
//! | [`Derive`] | change per second of a total | new window | bytes read from an OS counter |
//! | [`Reservoir`] | sorted uniform sample | emptied | value distributions |
//! | [`Timing`] | sorted sample of nanoseconds | emptied | latencies |
//!
//! The first four implement [`Discrete`], the last two [`Sample`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use woodpecker::{Counter, Measurement, Registry, Timing};
//!
//! let registry = Registry::new();
//!
//! // Create instruments and share them with the threads that update them.
//! let requests = Arc::new(Counter::new());
//! let latency = Arc::new(Timing::new());
//! registry.register("requests", Arc::clone(&requests));
//! registry.register("latency", Arc::clone(&latency));
//!
//! // Hot path.
//! latency.time(|| requests.increment());
//!
//! // Collector: detach everything and snapshot it.
//! for (name, measurement) in registry.harvest() {
//!     println!("{name} = {measurement}");
//! }
//! assert_eq!(registry.count(), 0);
//! ```
//!
//! ## Thread Safety
//!
//! All instruments are `Send + Sync` and are meant to be shared through
//! `Arc`. The registry stores [`Instrument`] handles, which are `Arc`s too, so
//! the application keeps updating the very objects the collector harvests.
//!
//! ## Errors
//!
//! Recording and harvesting are infallible. Only constructors taking an
//! argument that would make an instrument meaningless return a
//! [`Result`], failing with an [`Error`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.
//! Registrations and harvests are logged at `trace`, replaced registrations and
//! clamped rate windows at `debug`, rejected constructor arguments at `warn`.
//!
//! ## Feature Flags
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `serde` | [`snapshot`] | Serializable harvest results for exporters |

pub mod error;
pub mod instruments;
pub mod registry;

#[cfg(feature = "serde")]
pub mod snapshot;

pub use error::{Error, Result};
pub use instruments::counter::Counter;
pub use instruments::derive::Derive;
pub use instruments::gauge::Gauge;
pub use instruments::rate::Rate;
pub use instruments::reservoir::{Reservoir, DEFAULT_RESERVOIR_CAPACITY};
pub use instruments::timing::Timing;
pub use instruments::{Discrete, Instrument, InstrumentKind, Measurement, Sample};
pub use registry::Registry;
