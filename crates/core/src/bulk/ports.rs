//! Port interfaces for asynchronous bulk mutations

use async_trait::async_trait;
use priceloom_domain::{BulkOperation, Result};

/// Interface to the platform's asynchronous mutation API.
#[async_trait]
pub trait BulkOperationsApi: Send + Sync {
    /// Submit one opaque mutation document; returns the acknowledgment with
    /// the operation identifier and initial status.
    async fn submit(&self, mutation_document: &str) -> Result<BulkOperation>;

    /// Query the current state of a previously submitted operation.
    async fn fetch_status(&self, operation_id: &str) -> Result<BulkOperation>;
}
