//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Remote API limits
/// Maximum number of variant updates accepted per scoped mutation call.
pub const MAX_BATCH_SIZE: usize = 50;
/// Page size requested from the paginated catalog endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 250;

// Retry / polling cadence
/// Delay before retrying a throttled (429) or transiently failed request.
pub const THROTTLE_RETRY_DELAY_SECS: u64 = 2;
/// Interval between bulk operation status polls.
pub const BULK_POLL_INTERVAL_SECS: u64 = 5;

// Worker pool defaults
pub const DEFAULT_WORKER_COUNT: usize = 4;

// Metafield identifying a product's base price
pub const BASE_PRICE_NAMESPACE: &str = "custom";
pub const BASE_PRICE_KEY: &str = "base_price";

// Job stream sentinel forwarded to SSE subscribers
pub const JOB_DONE_SENTINEL: &str = "--done--";

// Default snapshot file name
pub const SNAPSHOT_FILE_NAME: &str = "price_snapshot.json";
