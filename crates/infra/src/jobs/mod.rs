//! Background job queue and output streaming

pub mod registry;

pub use registry::JobRegistry;
