//! Bulk operation lifecycle tracker
//!
//! Submits a single large mutation as an asynchronous platform job and polls
//! its status until a terminal state is reached. `Failed` and `Canceled` are
//! valid outcomes returned to the caller, never raised as errors. The tracker
//! imposes no timeout of its own; callers needing a deadline wrap the call in
//! their own cancellation.

use std::time::Duration;

use priceloom_domain::{BulkOperation, PriceloomError, Result};
use tracing::{debug, info};

use super::ports::BulkOperationsApi;

/// Tunables for the polling loop.
#[derive(Debug, Clone)]
pub struct BulkTrackerConfig {
    /// Interval between status polls.
    pub poll_interval: Duration,
}

impl Default for BulkTrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(
                priceloom_domain::constants::BULK_POLL_INTERVAL_SECS,
            ),
        }
    }
}

/// Poll-until-terminal state machine over a [`BulkOperationsApi`].
pub struct BulkTracker<A> {
    api: A,
    config: BulkTrackerConfig,
}

impl<A> BulkTracker<A>
where
    A: BulkOperationsApi,
{
    pub fn new(api: A, config: BulkTrackerConfig) -> Self {
        Self { api, config }
    }

    /// Submit `document` and track the resulting operation to completion.
    ///
    /// Every observed state, the acknowledgment included, is passed to
    /// `observer` before the loop decides whether to continue. An
    /// acknowledgment without an operation id is fatal and unretryable.
    pub async fn submit_and_track<F>(
        &self,
        document: &str,
        mut observer: F,
    ) -> Result<BulkOperation>
    where
        F: FnMut(&BulkOperation),
    {
        let ack = self.api.submit(document).await?;
        if ack.id.is_empty() {
            return Err(PriceloomError::InvalidInput(
                "bulk submission acknowledgment is missing the operation id".into(),
            ));
        }

        info!(operation_id = %ack.id, status = %ack.status, "bulk operation submitted");
        observer(&ack);
        if ack.status.is_terminal() {
            return Ok(ack);
        }

        let id = ack.id.clone();
        self.track(&id, observer).await
    }

    /// Poll an already submitted operation until its status is terminal.
    pub async fn track<F>(&self, operation_id: &str, mut observer: F) -> Result<BulkOperation>
    where
        F: FnMut(&BulkOperation),
    {
        loop {
            let operation = self.api.fetch_status(operation_id).await?;
            debug!(operation_id, status = %operation.status, "bulk operation polled");
            observer(&operation);

            if operation.status.is_terminal() {
                info!(
                    operation_id,
                    status = %operation.status,
                    objects = operation.object_count,
                    "bulk operation reached terminal state"
                );
                return Ok(operation);
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
