use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::config::EngineConfig;
use crate::error::{VectorError, VectorResult};
use crate::gate::{GateState, ReadinessGate};
use crate::models::{SimilarityResult, VectorRecord};
use crate::search::SearchQuery;
use crate::store::RecordStore;
use crate::{delete, ingest, search};

/// Request-path entry point.
///
/// Every operation checks the readiness gate before touching the store and
/// runs under `config.request_timeout`.
pub struct VectorService<S: RecordStore + ?Sized> {
    store: Arc<S>,
    gate: Arc<ReadinessGate>,
    config: EngineConfig,
}

/// Result of a readiness probe
#[derive(Debug, Clone, PartialEq)]
pub struct Readiness {
    pub gate: GateState,
    pub store: Result<(), String>,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self.gate, GateState::Ready) && self.store.is_ok()
    }
}

impl<S: RecordStore + ?Sized> VectorService<S> {
    pub fn new(store: Arc<S>, gate: Arc<ReadinessGate>, config: EngineConfig) -> Self {
        Self {
            store,
            gate,
            config,
        }
    }

    pub fn gate(&self) -> &Arc<ReadinessGate> {
        &self.gate
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn guarded<T, F>(&self, operation: F) -> VectorResult<T>
    where
        F: Future<Output = VectorResult<T>>,
    {
        self.gate.ensure_ready()?;

        let budget = self.config.request_timeout;
        tokio::time::timeout(budget, operation)
            .await
            .map_err(|_| VectorError::Timeout(budget))?
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn insert(&self, records: Vec<VectorRecord>) -> VectorResult<usize> {
        self.guarded(ingest::ingest(
            self.store.as_ref(),
            records,
            self.config.max_batch,
        ))
        .await
    }

    #[instrument(skip(self, vectors), fields(queries = vectors.len()))]
    pub async fn search(
        &self,
        vectors: Vec<Vec<f32>>,
        measure_type: &str,
        count: usize,
        offset: usize,
    ) -> VectorResult<Vec<Vec<SimilarityResult>>> {
        self.guarded(async {
            let query = SearchQuery::new(vectors, measure_type, count, offset)?;
            search::search(self.store.as_ref(), query).await
        })
        .await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete(&self, ids: Vec<String>) -> VectorResult<u64> {
        self.guarded(delete::delete(self.store.as_ref(), ids)).await
    }

    /// Remove every record. The collection dimension is released with them.
    #[instrument(skip(self))]
    pub async fn drop_collection(&self) -> VectorResult<u64> {
        self.guarded(self.store.truncate()).await
    }

    /// Gate state plus a live store ping. Never rejected by the gate itself.
    pub async fn readiness(&self) -> Readiness {
        let gate = self.gate.state();
        let budget = self.config.request_timeout;

        let store = match tokio::time::timeout(budget, self.store.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(VectorError::Timeout(budget).to_string()),
        };

        Readiness { gate, store }
    }
}
