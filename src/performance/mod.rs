//! Lifecycle tracking and aggregate statistics for emitted signals.

pub mod stats;
pub mod tracker;

pub use stats::{calculate_return, compute_metrics};
pub use tracker::{PerformanceTracker, TrackerConfig};
