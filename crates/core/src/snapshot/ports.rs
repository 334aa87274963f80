//! Port interface for snapshot persistence

use async_trait::async_trait;
use priceloom_domain::{Result, SnapshotRecord};

/// Persistence for the pre-run price snapshot.
///
/// Implementations must keep record order stable: restoration replays the
/// sequence in the order it was captured.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Whether a snapshot has already been written.
    async fn exists(&self) -> Result<bool>;

    /// Load the snapshot; `NotFound` when absent.
    async fn load(&self) -> Result<Vec<SnapshotRecord>>;

    /// Persist the snapshot. Implementations refuse to overwrite an existing
    /// one.
    async fn save(&self, records: &[SnapshotRecord]) -> Result<()>;
}
