//! # Priceloom Common
//!
//! Foundation utilities with no domain knowledge.
//!
//! Currently this is the resilience layer: the backoff policy object injected
//! into the HTTP executor and anything else that needs a retry cadence.

pub mod resilience;

pub use resilience::{BackoffPolicy, RetryDecision};
