//! Store connectivity for the vector search service.
//!
//! # Features
//!
//! - `clickhouse` (default) - ClickHouse client over its HTTP interface
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::clickhouse::{ClickHouseClient, ClickHouseConfig};
//!
//! let config = ClickHouseConfig::new("http://127.0.0.1:8123").with_database("db_master");
//! let client = ClickHouseClient::new(config)?;
//! client.ping().await?;
//! let rows: Vec<Row> = client.query_rows("SELECT doc_id FROM db_master.element").await?;
//! ```

// Always available modules
pub mod common;

#[cfg(feature = "clickhouse")]
pub mod clickhouse;

pub use common::{DatabaseError, DatabaseResult};
