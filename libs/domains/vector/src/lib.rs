//! Vector Domain Library
//!
//! Exact nearest-neighbour search over one collection of fixed-dimension
//! embeddings, persisted in ClickHouse (or kept in memory).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │    handlers     │────▶│  ReadinessGate  │  ← rejects requests until Ready
//! └────────┬────────┘     └─────────────────┘
//!          │
//! ┌────────▼────────┐
//! │  VectorService  │  ← ingest / search / delete / drop, under a timeout
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   RecordStore   │
//! │    (trait)      │
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ ClickHouseStore │
//! │  InMemoryStore  │
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_vector::{EngineConfig, InMemoryStore, ReadinessGate, VectorRecord, VectorService};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = Arc::new(ReadinessGate::new());
//! gate.begin_registration()?;
//! gate.registration_acknowledged()?;
//! gate.store_confirmed()?;
//!
//! let service = VectorService::new(Arc::new(InMemoryStore::new()), gate, EngineConfig::default());
//! service.insert(vec![VectorRecord::new("doc-1", vec![0.1, 0.2, 0.3])]).await?;
//!
//! let hits = service.search(vec![vec![0.1, 0.2, 0.25]], "cosine", 5, 0).await?;
//! assert_eq!(hits[0][0].id, "doc-1");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod delete;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod ingest;
pub mod metric;
pub mod models;
pub mod search;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{EngineConfig, StartupConfig, StoreBackend, TableConfig};
pub use error::{VectorError, VectorResult};
pub use gate::{BootstrapError, GateError, GateState, ReadinessGate, bootstrap};
pub use handlers::{VectorApiDoc, router};
pub use metric::Metric;
pub use models::{
    DeleteRequest, DeleteResponse, InsertRequest, InsertResponse, OperationStatus, SearchRequest,
    SearchResponse, SimilarityResult, VectorRecord,
};
pub use search::SearchQuery;
pub use service::{Readiness, VectorService};
pub use store::{ClickHouseStore, InMemoryStore, RecordStore};
