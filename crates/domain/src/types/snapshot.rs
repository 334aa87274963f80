//! Snapshot records for backup-before-mutate runs

use serde::{Deserialize, Serialize};

use super::pricing::Price;

/// One variant's pre-run price, persisted before a destructive update so the
/// prior state can be restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub product_id: String,
    pub variant_id: String,
    pub original_price: Price,
}
