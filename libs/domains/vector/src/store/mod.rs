//! Record store boundary.
//!
//! The engine never caches records between requests; every search goes
//! through [`RecordStore::scan`].

mod clickhouse;
mod memory;

use async_trait::async_trait;

use crate::error::{VectorError, VectorResult};
use crate::models::VectorRecord;

pub use clickhouse::ClickHouseStore;
pub use memory::InMemoryStore;

/// Storage for one collection of fixed-dimension vectors
///
/// Implementations return records in *collection order*: the order in which
/// each id was first inserted. Re-inserting an id keeps its position.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Lightweight reachability probe
    async fn ping(&self) -> VectorResult<()>;

    /// Create whatever backing structures are missing
    async fn ensure_schema(&self) -> VectorResult<()>;

    /// Dimension shared by all stored records; `None` when empty
    async fn dimension(&self) -> VectorResult<Option<usize>>;

    /// One batched write, upsert by id.
    ///
    /// Rejects the whole batch with [`VectorError::Validation`] when its
    /// dimension differs from the stored one at write time.
    async fn upsert(&self, records: Vec<VectorRecord>) -> VectorResult<()>;

    /// One batched delete; returns how many records were actually removed
    async fn delete(&self, ids: Vec<String>) -> VectorResult<u64>;

    /// Every record, in collection order
    async fn scan(&self) -> VectorResult<Vec<VectorRecord>>;

    /// Remove everything; returns how many records were removed
    async fn truncate(&self) -> VectorResult<u64>;
}

/// Fails when `records` would mix dimensions with what is already stored.
pub(crate) fn check_dimension(stored: Option<usize>, records: &[VectorRecord]) -> VectorResult<()> {
    let Some(batch_dim) = records.first().map(VectorRecord::dimension) else {
        return Ok(());
    };
    if let Some(record) = records.iter().find(|r| r.dimension() != batch_dim) {
        return Err(VectorError::Validation(format!(
            "record '{}' has dimension {}, expected {}",
            record.id,
            record.dimension(),
            batch_dim
        )));
    }
    match stored {
        Some(dim) if dim != batch_dim => Err(VectorError::Validation(format!(
            "batch dimension {batch_dim} does not match collection dimension {dim}"
        ))),
        _ => Ok(()),
    }
}
