//! Ensemble pricing
//!
//! Walks products tagged `ensemble` through the GraphQL cursor source.
//! Each product's first variant carries the base price; every variant's
//! target is base plus the option surcharges, tidy-rounded, applied through
//! scoped batches.

use std::path::Path;
use std::sync::Arc;

use futures::TryStreamExt;
use priceloom_core::{walk, BatchDispatcher};
use priceloom_domain::{
    constants, PriceUpdate, PriceloomError, Result, ShopConfig, SurchargeTable,
};
use priceloom_infra::integrations::shopify::{
    GraphqlCatalogSource, ScopedVariantMutator, ShopifyClient,
};
use tracing::{info, warn};

use crate::policy;

const ENSEMBLE_FILTER: &str = "tag:ensemble";

pub async fn run(config: ShopConfig, surcharge_path: &Path) -> Result<()> {
    let surcharges = load_surcharges(surcharge_path)?;

    let client = Arc::new(ShopifyClient::new(config)?);
    let source = GraphqlCatalogSource::with_filter(Arc::clone(&client), ENSEMBLE_FILTER);
    let mutator = ScopedVariantMutator::new(Arc::clone(&client));
    let dispatcher = BatchDispatcher::new(constants::MAX_BATCH_SIZE)?;

    let products: Vec<_> = walk(source, constants::DEFAULT_PAGE_SIZE).try_collect().await?;
    info!(products = products.len(), "ensemble products fetched");

    let mut total = 0usize;
    for product in products {
        let Some(first_variant) = product.variants.first() else {
            warn!(product_id = %product.id, "ensemble product without variants");
            continue;
        };
        let base = policy::parse_numeric(&first_variant.price)?;

        let updates: Vec<PriceUpdate> = product
            .variants
            .iter()
            .map(|variant| {
                let option1 = variant.options.first().and_then(Option::as_deref);
                let option2 = variant.options.get(1).and_then(Option::as_deref);
                PriceUpdate::new(
                    variant.id.clone(),
                    policy::ensemble_price(base, &surcharges, option1, option2),
                )
            })
            .collect();

        let count = updates.len();
        let report = dispatcher.apply(&mutator, updates, Some(&product.id)).await;
        if !report.is_clean() {
            warn!(
                product_id = %product.id,
                item_errors = report.item_errors.len(),
                failed_batches = report.failed_batches.len(),
                "ensemble update had failures"
            );
        }
        total += count;
    }

    info!(updated = total, "ensemble update finished");
    Ok(())
}

fn load_surcharges(path: &Path) -> Result<SurchargeTable> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        PriceloomError::Config(format!("cannot read surcharge file {}: {err}", path.display()))
    })?;
    Ok(serde_json::from_str(&raw)?)
}
