//! Batch mutation dispatcher
//!
//! Groups an unbounded sequence of price updates into batches no larger than
//! the remote's per-call cap, submits each batch, and reconciles per-item
//! errors into a final report. Partial failure within a batch never aborts
//! sibling items or later batches; a whole-batch transport failure is kept in
//! the report with its contents intact for manual retry.
//!
//! Updates carry absolute target prices, so resubmitting a batch after an
//! ambiguous transport failure converges on the same remote state. The
//! dispatcher never recomputes a price.

use priceloom_domain::{
    Batch, DispatchReport, FailedBatch, PriceUpdate, PriceloomError, Result,
};
use tracing::{debug, info, warn};

use super::ports::BatchMutator;

/// Order-preserving batcher over a [`BatchMutator`].
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    cap: usize,
}

impl BatchDispatcher {
    /// Create a dispatcher with the remote-imposed batch size cap.
    pub fn new(cap: usize) -> Result<Self> {
        if cap == 0 {
            return Err(PriceloomError::InvalidInput("batch cap must be positive".into()));
        }
        Ok(Self { cap })
    }

    /// Group updates into batches of at most `cap`, preserving input order.
    pub fn plan(&self, updates: Vec<PriceUpdate>, product_id: Option<&str>) -> Vec<Batch> {
        let mut batches = Vec::with_capacity(updates.len().div_ceil(self.cap));
        let mut current = Vec::with_capacity(self.cap.min(updates.len()));

        for update in updates {
            current.push(update);
            if current.len() == self.cap {
                batches.push(Batch {
                    product_id: product_id.map(str::to_string),
                    updates: std::mem::take(&mut current),
                });
            }
        }
        if !current.is_empty() {
            batches.push(Batch { product_id: product_id.map(str::to_string), updates: current });
        }
        batches
    }

    /// Submit every update through `mutator`, batch by batch, and aggregate
    /// the outcome. Progress is logged per batch as it completes.
    pub async fn apply<M>(
        &self,
        mutator: &M,
        updates: Vec<PriceUpdate>,
        product_id: Option<&str>,
    ) -> DispatchReport
    where
        M: BatchMutator + ?Sized,
    {
        let total = updates.len();
        let batches = self.plan(updates, product_id);
        let mut report = DispatchReport { batches: batches.len(), ..DispatchReport::default() };

        if batches.is_empty() {
            debug!("nothing to dispatch");
            return report;
        }

        for (index, batch) in batches.into_iter().enumerate() {
            match mutator.submit_batch(&batch).await {
                Ok(outcome) => {
                    report.submitted += batch.len();
                    for user_error in &outcome.user_errors {
                        warn!(
                            batch = index,
                            field = user_error.field.as_deref().unwrap_or("-"),
                            message = %user_error.message,
                            "remote rejected an update"
                        );
                    }
                    report.item_errors.extend(outcome.user_errors);
                    info!(
                        batch = index,
                        size = batch.len(),
                        submitted = report.submitted,
                        total,
                        "batch applied"
                    );
                }
                Err(err) => {
                    warn!(batch = index, size = batch.len(), error = %err, "batch submission failed");
                    report.failed_batches.push(FailedBatch { batch, error: err.to_string() });
                }
            }
        }

        report
    }
}
