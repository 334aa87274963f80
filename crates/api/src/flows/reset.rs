//! Price restoration from the snapshot
//!
//! Replays the backup through scoped batches, product by product, in the
//! order the snapshot recorded them. Missing snapshot is fatal: there is
//! nothing to restore from.

use std::path::Path;
use std::sync::Arc;

use priceloom_core::{BatchDispatcher, SnapshotStore};
use priceloom_domain::{constants, DispatchReport, Result, ShopConfig};
use priceloom_infra::integrations::shopify::{ScopedVariantMutator, ShopifyClient};
use priceloom_infra::FileSnapshotStore;
use tracing::{info, warn};

use super::group_restores_by_product;

pub async fn run(config: ShopConfig, snapshot_path: &Path) -> Result<()> {
    let store = FileSnapshotStore::new(snapshot_path);
    let records = store.load().await.inspect_err(|_| {
        warn!(path = %snapshot_path.display(), "no backup found, cannot reset");
    })?;
    info!(records = records.len(), "restoring prices from snapshot");

    let client = Arc::new(ShopifyClient::new(config)?);
    let mutator = ScopedVariantMutator::new(client);
    let dispatcher = BatchDispatcher::new(constants::MAX_BATCH_SIZE)?;

    let mut totals = DispatchReport::default();
    for (product_id, updates) in group_restores_by_product(records) {
        let report = dispatcher.apply(&mutator, updates, Some(&product_id)).await;
        totals.submitted += report.submitted;
        totals.batches += report.batches;
        totals.item_errors.extend(report.item_errors);
        totals.failed_batches.extend(report.failed_batches);
    }

    info!(
        restored = totals.submitted,
        item_errors = totals.item_errors.len(),
        failed_batches = totals.failed_batches.len(),
        "reset finished"
    );
    if !totals.failed_batches.is_empty() {
        warn!(
            "some batches were rejected wholesale; their contents were logged for manual retry"
        );
    }
    Ok(())
}
