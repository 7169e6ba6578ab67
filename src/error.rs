//! Error type for instrument construction.
//!
//! Recording and harvesting never fail. The only fallible operations are the
//! constructors that take an argument which could leave an instrument in a
//! meaningless state, and those fail fast with an [`Error`] instead.
//!
//! # Example
//!
//! ```rust
//! use woodpecker::{Error, Reservoir};
//!
//! let err = Reservoir::with_capacity(0).unwrap_err();
//! assert!(matches!(err, Error::InvalidCapacity { capacity: 0 }));
//! ```

use std::time::Duration;

use thiserror::Error;

/// Error returned by fallible instrument constructors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A reservoir was asked to hold no samples at all, or more than its
    /// slots can be allocated for.
    #[error("invalid reservoir capacity {capacity}: must be at least 1 and allocatable")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// A rate window was asked to start at an instant that has not happened yet.
    #[error("rate window cannot start {ahead:?} in the future")]
    StartInFuture {
        /// How far ahead of the current instant the start was.
        ahead: Duration,
    },
}

/// Result type for fallible instrument constructors.
pub type Result<T> = std::result::Result<T, Error>;
