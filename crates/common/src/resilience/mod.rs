//! Retry and backoff primitives

pub mod backoff;

pub use backoff::{BackoffPolicy, RetryDecision};
