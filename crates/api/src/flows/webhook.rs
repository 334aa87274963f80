//! Reaction to a base-price change notification
//!
//! Re-fetches the owning product's variants and sets every variant's price
//! and compare-at price to the new value through scoped batches.

use std::sync::Arc;

use priceloom_core::BatchDispatcher;
use priceloom_domain::{constants, Price, PriceUpdate, PriceloomError, Result, ShopConfig};
use priceloom_infra::integrations::shopify::{ScopedVariantMutator, ShopifyClient};
use tracing::info;

pub async fn apply_base_price(config: ShopConfig, product_id: &str, value: &str) -> Result<()> {
    let price = Price::parse(value)?;
    let client = Arc::new(ShopifyClient::new(config)?);

    let product = client.product(product_id).await?;
    let updates: Vec<PriceUpdate> = product
        .variants
        .iter()
        .map(|variant| PriceUpdate::new(variant.id.clone(), price.clone()))
        .collect();
    if updates.is_empty() {
        info!(product_id, "product has no variants, nothing to do");
        return Ok(());
    }

    let mutator = ScopedVariantMutator::with_compare_at(client);
    let dispatcher = BatchDispatcher::new(constants::MAX_BATCH_SIZE)?;
    let report = dispatcher.apply(&mutator, updates, Some(product_id)).await;

    if !report.is_clean() {
        return Err(PriceloomError::Remote(format!(
            "base price update for product {product_id} had {} item errors and {} failed batches",
            report.item_errors.len(),
            report.failed_batches.len(),
        )));
    }

    info!(product_id, price = %price, "variant prices updated from webhook");
    Ok(())
}

pub async fn register(config: ShopConfig, app_base_url: &str) -> Result<()> {
    use priceloom_infra::integrations::shopify::WebhookRegistration;

    let address = format!("{}/webhook/metafield", app_base_url.trim_end_matches('/'));
    let client = ShopifyClient::new(config)?;

    match client.register_metafield_webhook(&address).await? {
        WebhookRegistration::Existing(id) => {
            info!(webhook_id = id, %address, "webhook already registered");
        }
        WebhookRegistration::Created(id) => {
            info!(webhook_id = id, %address, "webhook registered");
        }
    }
    Ok(())
}
