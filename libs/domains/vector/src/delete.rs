//! Set-based deletion.

use std::collections::HashSet;
use tracing::debug;

use crate::error::{VectorError, VectorResult};
use crate::store::RecordStore;

/// Remove every record whose id is in `ids`; returns the number removed.
///
/// Duplicates collapse, absent ids are ignored, and an empty list returns 0
/// without a store round-trip.
pub async fn delete<S>(store: &S, ids: Vec<String>) -> VectorResult<u64>
where
    S: RecordStore + ?Sized,
{
    if ids.is_empty() {
        return Ok(0);
    }
    if ids.iter().any(String::is_empty) {
        return Err(VectorError::Validation("ids must not contain empty strings".into()));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();

    let removed = store.delete(unique).await?;
    debug!(removed, "Delete complete");
    Ok(removed)
}
