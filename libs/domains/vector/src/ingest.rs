//! Batch ingestion: validate the whole batch, then write it in one call.

use std::collections::HashSet;
use tracing::debug;

use crate::error::{VectorError, VectorResult};
use crate::models::VectorRecord;
use crate::store::RecordStore;

/// Check a batch against the collection's dimension.
///
/// Returns the batch dimension. `collection_dim` is `None` for an empty
/// collection, in which case the batch establishes it.
pub fn validate_batch(
    records: &[VectorRecord],
    collection_dim: Option<usize>,
    max_batch: usize,
) -> VectorResult<usize> {
    if records.is_empty() {
        return Err(VectorError::Validation("data must not be empty".into()));
    }
    if records.len() > max_batch {
        return Err(VectorError::Validation(format!(
            "batch of {} records exceeds the limit of {}",
            records.len(),
            max_batch
        )));
    }

    let batch_dim = records[0].dimension();
    let mut seen = HashSet::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        if record.id.is_empty() {
            return Err(VectorError::Validation(format!(
                "record {position} has an empty id"
            )));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(VectorError::Validation(format!(
                "duplicate id '{}' in batch",
                record.id
            )));
        }
        if record.embedding.is_empty() {
            return Err(VectorError::Validation(format!(
                "record '{}' has an empty embedding",
                record.id
            )));
        }
        if record.dimension() != batch_dim {
            return Err(VectorError::Validation(format!(
                "record '{}' has dimension {}, expected {}",
                record.id,
                record.dimension(),
                batch_dim
            )));
        }
        if record.embedding.iter().any(|x| !x.is_finite()) {
            return Err(VectorError::Validation(format!(
                "record '{}' contains a non-finite component",
                record.id
            )));
        }
    }

    match collection_dim {
        Some(dim) if dim != batch_dim => Err(VectorError::Validation(format!(
            "batch dimension {batch_dim} does not match collection dimension {dim}"
        ))),
        _ => Ok(batch_dim),
    }
}

/// Validate and upsert `records`; returns how many were written.
///
/// Nothing is written unless every record passes.
pub async fn ingest<S>(store: &S, records: Vec<VectorRecord>, max_batch: usize) -> VectorResult<usize>
where
    S: RecordStore + ?Sized,
{
    let collection_dim = store.dimension().await?;
    let dim = validate_batch(&records, collection_dim, max_batch)?;

    let count = records.len();
    store.upsert(records).await?;

    debug!(count, dim, "Batch ingested");
    Ok(count)
}
