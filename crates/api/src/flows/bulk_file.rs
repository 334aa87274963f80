//! One-shot bulk update from a prepared payload file
//!
//! Reads a JSON array of `{id, price}` pairs, folds them into one aliased
//! mutation document, and tracks the resulting bulk operation to a terminal
//! state.

use std::path::Path;
use std::sync::Arc;

use priceloom_core::{BulkTracker, BulkTrackerConfig};
use priceloom_domain::{
    BulkOperationStatus, Price, PriceUpdate, PriceloomError, Result, ShopConfig,
};
use priceloom_infra::integrations::shopify::{build_aliased_mutation, ShopifyBulkApi, ShopifyClient};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct PayloadEntry {
    id: serde_json::Value,
    price: String,
}

pub async fn run(config: ShopConfig, payload_path: &Path) -> Result<()> {
    let updates = load_payload(payload_path)?;
    if updates.is_empty() {
        info!("nothing to update");
        return Ok(());
    }
    info!(updates = updates.len(), "starting bulk operation");

    let client = Arc::new(ShopifyClient::new(config)?);
    let tracker = BulkTracker::new(ShopifyBulkApi::new(client), BulkTrackerConfig::default());

    let document = build_aliased_mutation(&updates);
    let outcome = tracker
        .submit_and_track(&document, |operation| {
            info!(status = %operation.status, objects = operation.object_count, "bulk status");
        })
        .await?;

    match outcome.status {
        BulkOperationStatus::Completed => {
            info!(objects = outcome.object_count, "bulk update finished");
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

fn load_payload(path: &Path) -> Result<Vec<PriceUpdate>> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        PriceloomError::Config(format!("cannot read payload file {}: {err}", path.display()))
    })?;
    let entries: Vec<PayloadEntry> = serde_json::from_str(&raw)?;

    entries
        .into_iter()
        .map(|entry| {
            let id = match entry.id {
                serde_json::Value::String(raw) => raw,
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(PriceloomError::InvalidInput(format!(
                        "payload entry has a non-scalar id: {other}"
                    )));
                }
            };
            Ok(PriceUpdate::new(id, Price::parse(&entry.price)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_string_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(
            &path,
            r#"[{"id": 123, "price": "10.00"}, {"id": "456", "price": "20.90"}]"#,
        )
        .unwrap();

        let updates = load_payload(&path).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].variant_id, "123");
        assert_eq!(updates[1].new_price.as_str(), "20.90");
    }

    #[test]
    fn invalid_prices_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"[{"id": 1, "price": "free"}]"#).unwrap();
        assert!(load_payload(&path).is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = load_payload(Path::new("/nonexistent/payload.json"));
        assert!(matches!(result, Err(PriceloomError::Config(_))));
    }
}
