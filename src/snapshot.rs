//! Serializable harvest results for exporters.
//!
//! This module provides serde-compatible snapshot types that an exporter can
//! hand to whatever format it writes. The crate itself never serializes
//! anything.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! woodpecker = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use woodpecker::{Counter, Registry};
//! use woodpecker::snapshot::MetricsSnapshot;
//!
//! let registry = Registry::new();
//! registry.register("requests", Counter::starting_at(42));
//!
//! let snapshot = MetricsSnapshot::harvest(&registry);
//! let json = serde_json::to_string(&snapshot).unwrap();
//! // {"metrics":[{"name":"requests","value":42}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::instruments::Measurement;
use crate::registry::Registry;

/// The harvested value of one named instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricSnapshot {
    /// The name the instrument was registered under.
    pub name: String,
    /// The instrument's snapshot.
    pub value: Measurement,
}

impl MetricSnapshot {
    /// Creates a new metric snapshot.
    pub fn new(name: impl Into<String>, value: Measurement) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Everything harvested from a registry at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// The metric snapshots, sorted by name.
    pub metrics: Vec<MetricSnapshot>,
}

impl MetricsSnapshot {
    /// Creates a new metrics snapshot from already harvested metrics.
    pub fn new(metrics: Vec<MetricSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            metrics,
        }
    }

    /// Creates a new metrics snapshot stamped with `timestamp_ms`.
    pub fn with_timestamp(metrics: Vec<MetricSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            metrics,
        }
    }

    /// Builds a snapshot from the output of [`Registry::harvest`].
    pub fn from_harvest(harvested: Vec<(String, Measurement)>) -> Self {
        Self::new(
            harvested
                .into_iter()
                .map(|(name, value)| MetricSnapshot { name, value })
                .collect(),
        )
    }

    /// Harvests `registry`, detaching and resetting every instrument in it.
    pub fn harvest(registry: &Registry) -> Self {
        Self::from_harvest(registry.harvest())
    }

    /// Finds a metric by name.
    pub fn get(&self, name: &str) -> Option<&MetricSnapshot> {
        self.metrics.iter().find(|m| m.name == name)
    }
}
