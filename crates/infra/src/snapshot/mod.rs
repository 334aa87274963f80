//! File-backed snapshot store
//!
//! The snapshot is a flat, ordered JSON array of
//! `{product_id, variant_id, original_price}` records. It is written once
//! before a destructive run and read thereafter to drive restoration; an
//! existing file is never overwritten.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use priceloom_core::SnapshotStore;
use priceloom_domain::{PriceloomError, Result, SnapshotRecord};
use tracing::info;

/// [`SnapshotStore`] persisting to a single JSON file.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn exists(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    async fn load(&self) -> Result<Vec<SnapshotRecord>> {
        if !self.exists().await? {
            return Err(PriceloomError::NotFound(format!(
                "no snapshot at {}",
                self.path.display()
            )));
        }
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, records: &[SnapshotRecord]) -> Result<()> {
        if self.exists().await? {
            return Err(PriceloomError::InvalidInput(format!(
                "snapshot at {} already exists and will not be overwritten",
                self.path.display()
            )));
        }
        let body = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, body).await?;
        info!(path = %self.path.display(), records = records.len(), "snapshot written");
        Ok(())
    }
}
