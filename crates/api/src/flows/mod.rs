//! Operation flows wiring policies to the orchestration core
//!
//! Each flow is runnable directly as a CLI subcommand and indirectly as a
//! background job whose log lines are relayed over the job stream.

pub mod base;
pub mod bulk_file;
pub mod ensemble;
pub mod percentage;
pub mod reset;
pub mod webhook;

use priceloom_domain::{PriceUpdate, SnapshotRecord};

/// Group snapshot records into per-product update lists, preserving the
/// order products first appear and the order of records within a product.
pub fn group_restores_by_product(
    records: Vec<SnapshotRecord>,
) -> Vec<(String, Vec<PriceUpdate>)> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: std::collections::HashMap<String, Vec<PriceUpdate>> =
        std::collections::HashMap::new();

    for record in records {
        let entry = grouped.entry(record.product_id.clone()).or_insert_with(|| {
            order.push(record.product_id.clone());
            Vec::new()
        });
        entry.push(PriceUpdate::new(record.variant_id, record.original_price));
    }

    order
        .into_iter()
        .filter_map(|product_id| {
            let updates = grouped.remove(&product_id)?;
            Some((product_id, updates))
        })
        .collect()
}
