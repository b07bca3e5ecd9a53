//! Exact (brute-force) top-k search.
//!
//! One scan feeds every query of a call. Scoring runs on the blocking pool.

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::error::{VectorError, VectorResult};
use crate::metric::Metric;
use crate::models::{SimilarityResult, VectorRecord};
use crate::store::RecordStore;

/// A validated search call
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub vectors: Vec<Vec<f32>>,
    pub metric: Metric,
    pub k: usize,
    pub offset: usize,
}

impl SearchQuery {
    /// Parses the metric tag and checks everything that does not need the
    /// collection.
    pub fn new(
        vectors: Vec<Vec<f32>>,
        measure_type: &str,
        k: usize,
        offset: usize,
    ) -> VectorResult<Self> {
        let metric: Metric = measure_type.parse()?;

        if vectors.is_empty() {
            return Err(VectorError::Validation("vectors must not be empty".into()));
        }
        if k == 0 {
            return Err(VectorError::Validation("count must be positive".into()));
        }
        for (i, query) in vectors.iter().enumerate() {
            if query.is_empty() {
                return Err(VectorError::Validation(format!("query vector {i} is empty")));
            }
            if query.iter().any(|x| !x.is_finite()) {
                return Err(VectorError::Validation(format!(
                    "query vector {i} contains a non-finite component"
                )));
            }
        }

        Ok(Self {
            vectors,
            metric,
            k,
            offset,
        })
    }
}

/// Rank `records` against one query.
///
/// Descending score; equal scores keep collection order (the order of
/// `records`). The first `offset` ranked entries are skipped, then at most
/// `k` are returned.
pub fn rank(
    records: &[VectorRecord],
    query: &[f32],
    metric: Metric,
    k: usize,
    offset: usize,
) -> Vec<SimilarityResult> {
    let wanted = offset.saturating_add(k).min(records.len());
    if wanted == 0 || offset >= records.len() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f32)> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (i, metric.score(query, &record.embedding)))
        .collect();

    let by_rank = |a: &(usize, f32), b: &(usize, f32)| -> Ordering {
        b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
    };

    if wanted < scored.len() {
        scored.select_nth_unstable_by(wanted - 1, by_rank);
        scored.truncate(wanted);
    }
    scored.sort_unstable_by(by_rank);

    scored
        .into_iter()
        .skip(offset)
        .map(|(i, score)| SimilarityResult {
            id: records[i].id.clone(),
            score,
        })
        .collect()
}

/// Run every query of `query` against one scan of `store`.
///
/// `result[i]` is the ranked list for `query.vectors[i]`.
pub async fn search<S>(store: &S, query: SearchQuery) -> VectorResult<Vec<Vec<SimilarityResult>>>
where
    S: RecordStore + ?Sized,
{
    let records = store.scan().await?;

    let Some(dim) = records.first().map(VectorRecord::dimension) else {
        debug!(queries = query.vectors.len(), "Search on empty collection");
        return Ok(vec![Vec::new(); query.vectors.len()]);
    };

    if let Some(odd) = records.iter().find(|r| r.dimension() != dim) {
        return Err(VectorError::Store(format!(
            "collection holds mixed dimensions: '{}' has {}, expected {dim}",
            odd.id,
            odd.dimension()
        )));
    }

    if let Some((i, bad)) = query
        .vectors
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != dim)
    {
        return Err(VectorError::Validation(format!(
            "query vector {i} has dimension {}, collection dimension is {dim}",
            bad.len()
        )));
    }

    let records = Arc::new(records);
    let scanned = records.len();
    let results = tokio::task::spawn_blocking(move || {
        query
            .vectors
            .iter()
            .map(|v| rank(&records, v, query.metric, query.k, query.offset))
            .collect::<Vec<_>>()
    })
    .await?;

    debug!(queries = results.len(), scanned, "Search complete");
    Ok(results)
}
