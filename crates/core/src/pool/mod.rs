//! Concurrent worker pool
//!
//! Distributes independent chunks of work across a bounded number of
//! concurrent workers. Each worker owns an isolated context built by a
//! factory (so no connection is shared between workers) and pulls chunks from
//! a shared queue until it is empty. Chunk size respects a downstream
//! per-call cardinality cap and is independent of the worker count.
//!
//! Handlers record each finished chunk's size on the shared
//! [`ProgressCounter`]; the counter is progress reporting only and never
//! feeds correctness decisions. After all workers are joined, the pool
//! compares the counter with the number of items submitted and warns on a
//! mismatch (a chunk whose handler never reported).

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use priceloom_domain::{PriceloomError, Result};
use tracing::{debug, warn};

/// Shared processed-items counter, updated under a mutual-exclusion lock.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter {
    processed: Arc<Mutex<usize>>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished chunk's size to the counter.
    pub fn record(&self, count: usize) {
        let mut processed = self.processed.lock();
        *processed += count;
    }

    pub fn value(&self) -> usize {
        *self.processed.lock()
    }
}

/// Per-worker chunk processor.
///
/// Implementations must call `progress.record(chunk_len)` once the chunk
/// finishes, whether it succeeded or failed; chunk-level failures are the
/// handler's to absorb and log.
#[async_trait]
pub trait ChunkHandler: Send + Sync {
    type Item: Send;

    async fn handle(&self, chunk: Vec<Self::Item>, progress: &ProgressCounter);
}

/// Pool sizing parameters.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Items per chunk (bounded by the downstream per-call cap).
    pub chunk_size: usize,
    /// Number of concurrent workers, each with its own context.
    pub worker_count: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_size: priceloom_domain::constants::MAX_BATCH_SIZE,
            worker_count: priceloom_domain::constants::DEFAULT_WORKER_COUNT,
        }
    }
}

/// Result of a pool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReport {
    /// Total items submitted across all chunks.
    pub submitted: usize,
    /// Final processed-counter value.
    pub processed: usize,
    /// Number of chunks dispatched.
    pub chunks: usize,
}

impl PoolReport {
    /// True when every submitted item was reported processed.
    pub fn is_conserved(&self) -> bool {
        self.submitted == self.processed
    }
}

/// Run `items` through `worker_count` concurrent workers in chunks of
/// `chunk_size`, building one handler per worker via `make_worker`.
///
/// Waits for every chunk to finish before returning. No ordering is
/// guaranteed between chunks handled by different workers.
pub async fn run_chunked<T, H, F>(
    items: Vec<T>,
    config: &PoolConfig,
    make_worker: F,
) -> Result<PoolReport>
where
    T: Send + 'static,
    H: ChunkHandler<Item = T> + 'static,
    F: Fn(usize) -> Result<H>,
{
    if config.chunk_size == 0 || config.worker_count == 0 {
        return Err(PriceloomError::InvalidInput(
            "chunk_size and worker_count must be positive".into(),
        ));
    }

    let submitted = items.len();
    let mut chunks: VecDeque<Vec<T>> = VecDeque::new();
    let mut items = items.into_iter();
    loop {
        let chunk: Vec<T> = items.by_ref().take(config.chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push_back(chunk);
    }
    let chunk_count = chunks.len();

    let queue = Arc::new(Mutex::new(chunks));
    let progress = ProgressCounter::new();

    let mut handles = Vec::with_capacity(config.worker_count);
    for worker_index in 0..config.worker_count {
        let worker = make_worker(worker_index)?;
        let queue = Arc::clone(&queue);
        let progress = progress.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let chunk = { queue.lock().pop_front() };
                let Some(chunk) = chunk else { break };
                debug!(worker = worker_index, size = chunk.len(), "worker picked up chunk");
                worker.handle(chunk, &progress).await;
            }
        }));
    }

    for handle in handles {
        if let Err(err) = handle.await {
            warn!(error = %err, "pool worker terminated abnormally");
        }
    }

    let report = PoolReport { submitted, processed: progress.value(), chunks: chunk_count };
    if !report.is_conserved() {
        warn!(
            submitted = report.submitted,
            processed = report.processed,
            "processed count does not match submitted items; a chunk failed to report completion"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Handler that records which items it saw and which worker handled them.
    struct CollectingWorker {
        index: usize,
        seen: Arc<Mutex<Vec<(usize, u32)>>>,
    }

    #[async_trait]
    impl ChunkHandler for CollectingWorker {
        type Item = u32;

        async fn handle(&self, chunk: Vec<u32>, progress: &ProgressCounter) {
            let len = chunk.len();
            {
                let mut seen = self.seen.lock();
                seen.extend(chunk.into_iter().map(|item| (self.index, item)));
            }
            tokio::task::yield_now().await;
            progress.record(len);
        }
    }

    #[tokio::test]
    async fn processes_every_item_exactly_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let factories = Arc::new(AtomicUsize::new(0));

        let items: Vec<u32> = (0..103).collect();
        let config = PoolConfig { chunk_size: 10, worker_count: 4 };

        let seen_ref = seen.clone();
        let factories_ref = factories.clone();
        let report = run_chunked(items, &config, move |index| {
            factories_ref.fetch_add(1, Ordering::SeqCst);
            Ok(CollectingWorker { index, seen: seen_ref.clone() })
        })
        .await
        .unwrap();

        assert_eq!(report.submitted, 103);
        assert_eq!(report.processed, 103);
        assert_eq!(report.chunks, 11);
        assert!(report.is_conserved());
        assert_eq!(factories.load(Ordering::SeqCst), 4, "one isolated context per worker");

        let seen = seen.lock();
        let unique: HashSet<u32> = seen.iter().map(|(_, item)| *item).collect();
        assert_eq!(unique.len(), 103, "no item lost or duplicated");
    }

    #[tokio::test]
    async fn silent_handler_produces_detectable_mismatch() {
        struct SilentWorker;

        #[async_trait]
        impl ChunkHandler for SilentWorker {
            type Item = u32;

            async fn handle(&self, _chunk: Vec<u32>, _progress: &ProgressCounter) {
                // Deliberately never records progress.
            }
        }

        let items: Vec<u32> = (0..20).collect();
        let config = PoolConfig { chunk_size: 5, worker_count: 2 };
        let report = run_chunked(items, &config, |_| Ok(SilentWorker)).await.unwrap();

        assert_eq!(report.submitted, 20);
        assert_eq!(report.processed, 0);
        assert!(!report.is_conserved());
    }

    #[tokio::test]
    async fn more_workers_than_chunks_is_fine() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let items: Vec<u32> = vec![1, 2, 3];
        let config = PoolConfig { chunk_size: 50, worker_count: 8 };

        let seen_ref = seen.clone();
        let report = run_chunked(items, &config, move |index| {
            Ok(CollectingWorker { index, seen: seen_ref.clone() })
        })
        .await
        .unwrap();

        assert_eq!(report.chunks, 1);
        assert!(report.is_conserved());
    }

    #[tokio::test]
    async fn empty_input_completes_immediately() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_ref = seen.clone();
        let report = run_chunked(
            Vec::<u32>::new(),
            &PoolConfig::default(),
            move |index| Ok(CollectingWorker { index, seen: seen_ref.clone() }),
        )
        .await
        .unwrap();

        assert_eq!(report.submitted, 0);
        assert_eq!(report.chunks, 0);
        assert!(report.is_conserved());
    }

    #[tokio::test]
    async fn worker_factory_failure_aborts_the_run() {
        let result = run_chunked(vec![1u32], &PoolConfig::default(), |_| {
            Err::<SilentFactoryWorker, _>(PriceloomError::Config("no credentials".into()))
        })
        .await;
        assert!(matches!(result, Err(PriceloomError::Config(_))));
    }

    struct SilentFactoryWorker;

    #[async_trait]
    impl ChunkHandler for SilentFactoryWorker {
        type Item = u32;

        async fn handle(&self, _chunk: Vec<u32>, _progress: &ProgressCounter) {}
    }
}
