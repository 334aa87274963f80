//! Base-price flows
//!
//! `sync` propagates each product's `custom.base_price` metafield to all of
//! its variants (price and compare-at), fanning products out across the
//! worker pool with one API client per worker. `init` seeds the metafield
//! from the first variant's price for products that do not carry one yet.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use priceloom_core::{
    run_chunked, walk, BatchDispatcher, ChunkHandler, PoolConfig, ProgressCounter,
};
use priceloom_domain::{constants, CatalogItem, PriceUpdate, Result, ShopConfig};
use priceloom_infra::integrations::shopify::{
    RestCatalogSource, ScopedVariantMutator, ShopifyClient,
};
use tracing::{info, warn};

/// Propagate base prices to variant prices across the catalog.
pub async fn sync(config: ShopConfig, worker_count: usize) -> Result<()> {
    let walk_client = Arc::new(ShopifyClient::new(config.clone())?);
    let source = RestCatalogSource::new(walk_client);
    let products: Vec<CatalogItem> =
        walk(source, constants::DEFAULT_PAGE_SIZE).try_collect().await?;
    info!(products = products.len(), worker_count, "catalog walked, fanning out");

    let pool_config = PoolConfig { worker_count, ..PoolConfig::default() };
    let report = run_chunked(products, &pool_config, |worker| {
        // Each worker gets its own connection context.
        let client = Arc::new(ShopifyClient::new(config.clone())?);
        info!(worker, "worker context ready");
        Ok(BaseSyncWorker { client })
    })
    .await?;

    info!(
        submitted = report.submitted,
        processed = report.processed,
        chunks = report.chunks,
        "base-price sync finished"
    );
    Ok(())
}

struct BaseSyncWorker {
    client: Arc<ShopifyClient>,
}

impl BaseSyncWorker {
    async fn sync_product(&self, product: &CatalogItem) -> Result<()> {
        let Some(base_price) = self.client.product_base_price(&product.id).await? else {
            return Ok(());
        };

        let updates: Vec<PriceUpdate> = product
            .variants
            .iter()
            .map(|variant| PriceUpdate::new(variant.id.clone(), base_price.clone()))
            .collect();
        if updates.is_empty() {
            return Ok(());
        }

        let mutator = ScopedVariantMutator::with_compare_at(Arc::clone(&self.client));
        let dispatcher = BatchDispatcher::new(constants::MAX_BATCH_SIZE)?;
        let report = dispatcher.apply(&mutator, updates, Some(&product.id)).await;

        if report.is_clean() {
            info!(product_id = %product.id, price = %base_price, "base price propagated");
        } else {
            warn!(
                product_id = %product.id,
                item_errors = report.item_errors.len(),
                failed_batches = report.failed_batches.len(),
                "base price propagation had failures"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl ChunkHandler for BaseSyncWorker {
    type Item = CatalogItem;

    async fn handle(&self, chunk: Vec<CatalogItem>, progress: &ProgressCounter) {
        let size = chunk.len();
        for product in &chunk {
            if let Err(err) = self.sync_product(product).await {
                warn!(product_id = %product.id, error = %err, "skipping product");
            }
        }
        progress.record(size);
    }
}

/// Seed `custom.base_price` metafields from first-variant prices.
pub async fn init(config: ShopConfig) -> Result<()> {
    let client = Arc::new(ShopifyClient::new(config)?);
    let source = RestCatalogSource::new(Arc::clone(&client));
    let products: Vec<CatalogItem> =
        walk(source, constants::DEFAULT_PAGE_SIZE).try_collect().await?;

    let mut created = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for product in &products {
        if base_price_exists(&client, product).await? {
            skipped += 1;
            continue;
        }

        let Some(first_variant) = product.variants.first() else {
            warn!(product_id = %product.id, "no variants found");
            failed += 1;
            continue;
        };

        let user_errors = client.set_base_price(&product.id, &first_variant.price).await?;
        if user_errors.is_empty() {
            info!(product_id = %product.id, price = %first_variant.price, "base price set");
            created += 1;
        } else {
            for user_error in &user_errors {
                warn!(product_id = %product.id, message = %user_error.message, "rejected");
            }
            failed += 1;
        }
    }

    info!(
        processed = products.len(),
        created, skipped, failed, "base price initialization finished"
    );
    Ok(())
}

async fn base_price_exists(client: &ShopifyClient, product: &CatalogItem) -> Result<bool> {
    Ok(client.product_base_price(&product.id).await?.is_some())
}
