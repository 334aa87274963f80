//! Port interfaces for batch mutation submission

use async_trait::async_trait;
use priceloom_domain::{Batch, BatchOutcome, Result};

/// Interface for submitting one size-bounded batch of price updates to the
/// remote mutation endpoint.
///
/// A returned `Ok(outcome)` means the call itself was accepted (2xx); item
/// rejections ride along as user errors inside the outcome. `Err` means the
/// whole batch failed at the transport level.
#[async_trait]
pub trait BatchMutator: Send + Sync {
    async fn submit_batch(&self, batch: &Batch) -> Result<BatchOutcome>;
}
