//! Domain data types

pub mod bulk;
pub mod catalog;
pub mod job;
pub mod pricing;
pub mod snapshot;
pub mod surcharge;

pub use bulk::{BulkOperation, BulkOperationStatus};
pub use catalog::{CatalogItem, CatalogPage, PageCursor, Variant};
pub use job::{JobCommand, JobEvent, JobId};
pub use pricing::{
    Batch, BatchOutcome, DispatchReport, FailedBatch, Price, PriceUpdate, RemoteUserError,
};
pub use snapshot::SnapshotRecord;
pub use surcharge::SurchargeTable;
