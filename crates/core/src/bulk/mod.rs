//! Bulk operation lifecycle tracking

pub mod ports;
pub mod tracker;

pub use tracker::{BulkTracker, BulkTrackerConfig};
