//! # Priceloom Core
//!
//! Pure orchestration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the remote catalog and mutations
//! - The paginated catalog walker
//! - The batch mutation dispatcher
//! - The bulk operation lifecycle tracker
//! - The concurrent worker pool
//!
//! ## Architecture Principles
//! - Only depends on `priceloom-domain`
//! - No HTTP, process, or filesystem code
//! - All external dependencies via traits
//! - Pure, testable orchestration logic

pub mod bulk;
pub mod catalog;
pub mod dispatch;
pub mod pool;
pub mod snapshot;

// Re-export specific items to avoid ambiguity
pub use bulk::ports::BulkOperationsApi;
pub use bulk::{BulkTracker, BulkTrackerConfig};
pub use catalog::ports::CatalogPageSource;
pub use catalog::walk;
pub use dispatch::ports::BatchMutator;
pub use dispatch::BatchDispatcher;
pub use pool::{run_chunked, ChunkHandler, PoolConfig, PoolReport, ProgressCounter};
pub use snapshot::ensure_snapshot;
pub use snapshot::ports::SnapshotStore;
