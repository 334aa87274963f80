//! Backup-before-mutate snapshot handling

pub mod ports;

use std::future::Future;

use priceloom_domain::{Result, SnapshotRecord};
use tracing::info;

use self::ports::SnapshotStore;

/// Load the existing snapshot, or capture and persist one if none exists.
///
/// The snapshot is written at most once per store location; a destructive run
/// that crashes and restarts reuses the original capture rather than
/// overwriting it with already-mutated prices.
pub async fn ensure_snapshot<S, F, Fut>(store: &S, capture: F) -> Result<Vec<SnapshotRecord>>
where
    S: SnapshotStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<SnapshotRecord>>>,
{
    if store.exists().await? {
        info!("snapshot already present, reusing it");
        return store.load().await;
    }

    let records = capture().await?;
    store.save(&records).await?;
    info!(records = records.len(), "snapshot captured");
    Ok(records)
}
