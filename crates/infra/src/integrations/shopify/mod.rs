//! Shopify Admin API adapter
//!
//! Implements the core's catalog, mutation, and bulk operation ports against
//! the Shopify Admin API (REST + GraphQL). GID formatting, wire payload
//! shapes, and cursor decoding are confined to this module; the rest of the
//! system only sees domain types.

pub mod bulk;
pub mod catalog;
pub mod client;
pub mod mutations;
pub mod types;
pub mod webhook;

pub use bulk::ShopifyBulkApi;
pub use catalog::{GraphqlCatalogSource, RestCatalogSource};
pub use client::{ShopifyClient, WebhookRegistration};
pub use mutations::{build_aliased_mutation, ScopedVariantMutator};
pub use webhook::{verify_webhook_signature, MetafieldNotification};

/// Prefix an opaque numeric id into a product GID, passing existing GIDs
/// through untouched.
pub fn product_gid(id: &str) -> String {
    if id.starts_with("gid://") {
        id.to_string()
    } else {
        format!("gid://shopify/Product/{id}")
    }
}

/// Prefix an opaque numeric id into a variant GID, passing existing GIDs
/// through untouched.
pub fn variant_gid(id: &str) -> String {
    if id.starts_with("gid://") {
        id.to_string()
    } else {
        format!("gid://shopify/ProductVariant/{id}")
    }
}
