//! Synchronous price mutations
//!
//! The scoped mutator submits one `productVariantsBulkUpdate` call per batch
//! (cap 50 per call). The aliased document builder produces the one-shot
//! mutation text handed to the asynchronous bulk runner, correlating user
//! errors back to updates through the `v{i}` alias index.

use std::sync::Arc;

use async_trait::async_trait;
use priceloom_core::BatchMutator;
use priceloom_domain::{Batch, BatchOutcome, PriceUpdate, PriceloomError, Result};

use super::client::ShopifyClient;
use super::types::{GraphqlUserError, VariantsBulkUpdateData};
use super::{product_gid, variant_gid};

const BULK_UPDATE_MUTATION: &str = r#"
mutation BulkUpdate($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
  productVariantsBulkUpdate(productId: $productId, variants: $variants) {
    userErrors { field message }
  }
}
"#;

/// [`BatchMutator`] applying product-scoped variant updates.
pub struct ScopedVariantMutator {
    client: Arc<ShopifyClient>,
    set_compare_at: bool,
}

impl ScopedVariantMutator {
    pub fn new(client: Arc<ShopifyClient>) -> Self {
        Self { client, set_compare_at: false }
    }

    /// Also mirror each price into `compareAtPrice` (base-price flows do
    /// this so discounts render against the base).
    pub fn with_compare_at(client: Arc<ShopifyClient>) -> Self {
        Self { client, set_compare_at: true }
    }

    fn variant_payload(&self, update: &PriceUpdate) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "id": variant_gid(&update.variant_id),
            "price": update.new_price.as_str(),
        });
        if self.set_compare_at {
            payload["compareAtPrice"] = serde_json::Value::String(
                update.new_price.as_str().to_string(),
            );
        }
        payload
    }
}

#[async_trait]
impl BatchMutator for ScopedVariantMutator {
    async fn submit_batch(&self, batch: &Batch) -> Result<BatchOutcome> {
        let product_id = batch.product_id.as_deref().ok_or_else(|| {
            PriceloomError::InvalidInput("scoped mutation requires a product id".into())
        })?;

        let variants: Vec<_> = batch.updates.iter().map(|u| self.variant_payload(u)).collect();
        let variables = serde_json::json!({
            "productId": product_gid(product_id),
            "variants": variants,
        });

        let data: VariantsBulkUpdateData =
            self.client.graphql(BULK_UPDATE_MUTATION, variables).await?;

        Ok(BatchOutcome {
            user_errors: data
                .product_variants_bulk_update
                .user_errors
                .into_iter()
                .map(GraphqlUserError::into_domain)
                .collect(),
        })
    }
}

/// Build the aliased one-shot mutation document submitted through the bulk
/// operation runner: one `v{i}: productVariantUpdate(...)` per update.
pub fn build_aliased_mutation(updates: &[PriceUpdate]) -> String {
    let mut parts = Vec::with_capacity(updates.len());
    for (i, update) in updates.iter().enumerate() {
        parts.push(format!(
            "v{i}: productVariantUpdate(input: {{id: \"{}\", price: \"{}\"}}) {{ userErrors {{ field message }} }}",
            variant_gid(&update.variant_id),
            update.new_price.as_str(),
        ));
    }
    format!("mutation {{\n{}\n}}", parts.join("\n"))
}
