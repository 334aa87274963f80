//! Percentage price adjustment
//!
//! Backs up current prices once, scales every variant by the requested
//! percentage with tidy rounding, and applies the result as one asynchronous
//! bulk mutation tracked to a terminal state.

use std::path::Path;
use std::sync::Arc;

use futures::TryStreamExt;
use priceloom_core::{ensure_snapshot, walk, BulkTracker, BulkTrackerConfig};
use priceloom_domain::{
    constants, BulkOperationStatus, PriceUpdate, PriceloomError, Result, ShopConfig,
    SnapshotRecord,
};
use priceloom_infra::integrations::shopify::{
    build_aliased_mutation, RestCatalogSource, ShopifyBulkApi, ShopifyClient,
};
use priceloom_infra::FileSnapshotStore;
use tracing::{info, warn};

use crate::policy;

pub async fn run(config: ShopConfig, percent: f64, snapshot_path: &Path) -> Result<()> {
    let client = Arc::new(ShopifyClient::new(config)?);
    let store = FileSnapshotStore::new(snapshot_path);

    info!(percent, "fetching current variant prices");
    let capture_client = Arc::clone(&client);
    let records = ensure_snapshot(&store, || capture_prices(capture_client)).await?;
    info!(records = records.len(), "working set ready");

    let updates = records
        .iter()
        .map(|record| {
            Ok(PriceUpdate::new(
                record.variant_id.clone(),
                policy::apply_percentage(&record.original_price, percent)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    if updates.is_empty() {
        info!("nothing to update");
        return Ok(());
    }

    let document = build_aliased_mutation(&updates);
    let tracker = BulkTracker::new(ShopifyBulkApi::new(client), BulkTrackerConfig::default());
    let outcome = tracker
        .submit_and_track(&document, |operation| {
            info!(status = %operation.status, objects = operation.object_count, "bulk status");
        })
        .await?;

    match outcome.status {
        BulkOperationStatus::Completed => {
            info!(objects = outcome.object_count, "percentage update finished");
            Ok(())
        }
        status => {
            warn!(
                %status,
                error_code = outcome.error_code.as_deref().unwrap_or("-"),
                "bulk operation did not complete"
            );
            Err(PriceloomError::Remote(format!("bulk operation ended {status}")))
        }
    }
}

/// Walk the whole catalog and record every variant's current price.
pub async fn capture_prices(client: Arc<ShopifyClient>) -> Result<Vec<SnapshotRecord>> {
    let source = RestCatalogSource::new(client);
    walk(source, constants::DEFAULT_PAGE_SIZE)
        .map_ok(|item| {
            let product_id = item.id;
            futures::stream::iter(item.variants.into_iter().map(move |variant| {
                Ok(SnapshotRecord {
                    product_id: product_id.clone(),
                    variant_id: variant.id,
                    original_price: variant.price,
                })
            }))
        })
        .try_flatten()
        .try_collect()
        .await
}
