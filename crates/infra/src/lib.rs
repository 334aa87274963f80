//! # Priceloom Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The rate-limited HTTP executor (reqwest)
//! - Pagination cursor decoding for both remote encodings
//! - The Shopify Admin API adapter (catalog, mutations, bulk operations,
//!   metafields, webhooks)
//! - The job queue & stream multiplexer
//! - The file-backed snapshot store
//!
//! ## Architecture
//! - Implements traits defined in `priceloom-core`
//! - Depends on `priceloom-common`, `priceloom-domain` and `priceloom-core`
//! - Contains all "impure" code (network, processes, filesystem)

pub mod errors;
pub mod http;
pub mod integrations;
pub mod jobs;
pub mod snapshot;

pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use jobs::JobRegistry;
pub use snapshot::FileSnapshotStore;
