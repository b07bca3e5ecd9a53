use async_trait::async_trait;
use database::DatabaseResult;
use database::clickhouse::{ClickHouseClient, check_health, escape_string, quote_identifier};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument};

use super::{RecordStore, check_dimension};
use crate::config::TableConfig;
use crate::error::VectorResult;
use crate::models::VectorRecord;

/// [`RecordStore`] over a ClickHouse table.
///
/// Layout:
///
/// ```sql
/// CREATE TABLE db.element (
///     doc_id   String,
///     centroid Array(Float32),
///     seq      UInt64,   -- collection order, stable across upserts
///     version  UInt64    -- newest row wins on merge
/// ) ENGINE = ReplacingMergeTree(version) ORDER BY doc_id
/// ```
///
/// Reads use `FINAL` so replaced rows are never observed.
pub struct ClickHouseStore {
    client: ClickHouseClient,
    database: String,
    table: String,
    id_column: String,
    vector_column: String,
    id_key: String,
    vector_key: String,
}

#[derive(Deserialize)]
struct DimensionRow {
    dim: u64,
}

#[derive(Deserialize)]
struct SeqRow {
    id: String,
    seq: u64,
}

#[derive(Deserialize)]
struct CountRow {
    n: u64,
}

#[derive(Deserialize)]
struct MaxSeqRow {
    max_seq: u64,
    n: u64,
}

#[derive(Deserialize)]
struct ScanRow {
    id: String,
    embedding: Vec<f32>,
}

impl ClickHouseStore {
    /// Validates every identifier up front; values never reach SQL unescaped.
    pub fn new(client: ClickHouseClient, table: &TableConfig) -> DatabaseResult<Self> {
        let database = quote_identifier(&client.config().database)?;
        let table_name = format!("{}.{}", database, quote_identifier(&table.table)?);

        Ok(Self {
            id_column: quote_identifier(&table.id_column)?,
            vector_column: quote_identifier(&table.vector_column)?,
            id_key: table.id_column.clone(),
            vector_key: table.vector_column.clone(),
            database,
            table: table_name,
            client,
        })
    }

    fn id_list(ids: &[String]) -> String {
        ids.iter()
            .map(|id| escape_string(id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    async fn existing_seqs(&self, ids: &[String]) -> VectorResult<HashMap<String, u64>> {
        let sql = format!(
            "SELECT {id} AS id, seq FROM {table} FINAL WHERE {id} IN ({list})",
            id = self.id_column,
            table = self.table,
            list = Self::id_list(ids),
        );
        let rows: Vec<SeqRow> = self.client.query_rows(&sql).await?;
        Ok(rows.into_iter().map(|row| (row.id, row.seq)).collect())
    }

    async fn next_seq(&self) -> VectorResult<u64> {
        let sql = format!(
            "SELECT max(seq) AS max_seq, count() AS n FROM {table}",
            table = self.table
        );
        let rows: Vec<MaxSeqRow> = self.client.query_rows(&sql).await?;
        Ok(match rows.first() {
            Some(row) if row.n > 0 => row.max_seq + 1,
            _ => 0,
        })
    }

    async fn count_matching(&self, ids: &[String]) -> VectorResult<u64> {
        let sql = format!(
            "SELECT count() AS n FROM {table} FINAL WHERE {id} IN ({list})",
            table = self.table,
            id = self.id_column,
            list = Self::id_list(ids),
        );
        let rows: Vec<CountRow> = self.client.query_rows(&sql).await?;
        Ok(rows.first().map_or(0, |row| row.n))
    }

    async fn count_all(&self) -> VectorResult<u64> {
        let sql = format!("SELECT count() AS n FROM {table} FINAL", table = self.table);
        let rows: Vec<CountRow> = self.client.query_rows(&sql).await?;
        Ok(rows.first().map_or(0, |row| row.n))
    }
}

/// Monotonic enough for `ReplacingMergeTree` versions within one writer.
fn now_version() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

#[async_trait]
impl RecordStore for ClickHouseStore {
    async fn ping(&self) -> VectorResult<()> {
        check_health(&self.client).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn ensure_schema(&self) -> VectorResult<()> {
        self.client
            .execute(&format!("CREATE DATABASE IF NOT EXISTS {}", self.database))
            .await?;
        self.client
            .execute(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 {id} String, \
                 {vec} Array(Float32), \
                 seq UInt64, \
                 version UInt64\
                 ) ENGINE = ReplacingMergeTree(version) ORDER BY {id}",
                table = self.table,
                id = self.id_column,
                vec = self.vector_column,
            ))
            .await?;

        info!("ClickHouse schema ready");
        Ok(())
    }

    async fn dimension(&self) -> VectorResult<Option<usize>> {
        let sql = format!(
            "SELECT length({vec}) AS dim FROM {table} FINAL LIMIT 1",
            vec = self.vector_column,
            table = self.table,
        );
        let rows: Vec<DimensionRow> = self.client.query_rows(&sql).await?;
        Ok(rows.first().map(|row| row.dim as usize))
    }

    #[instrument(skip(self, records), fields(table = %self.table, count = records.len()))]
    async fn upsert(&self, records: Vec<VectorRecord>) -> VectorResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Re-read right before the write. Not atomic with the INSERT: two
        // writers racing on an empty table can still commit different
        // dimensions.
        check_dimension(self.dimension().await?, &records)?;

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let existing = self.existing_seqs(&ids).await?;
        let mut next_seq = self.next_seq().await?;
        let version = now_version();

        let rows: Vec<Value> = records
            .into_iter()
            .map(|record| {
                let seq = match existing.get(&record.id) {
                    Some(&seq) => seq,
                    None => {
                        let seq = next_seq;
                        next_seq += 1;
                        seq
                    }
                };

                let mut row = Map::new();
                row.insert(self.id_key.clone(), json!(record.id));
                row.insert(self.vector_key.clone(), json!(record.embedding));
                row.insert("seq".to_string(), json!(seq));
                row.insert("version".to_string(), json!(version));
                Value::Object(row)
            })
            .collect();

        debug!(new = rows.len().saturating_sub(existing.len()), "Writing rows");

        let prefix = format!(
            "INSERT INTO {table} ({id}, {vec}, seq, version)",
            table = self.table,
            id = self.id_column,
            vec = self.vector_column,
        );
        self.client.insert_rows(&prefix, &rows).await?;
        Ok(())
    }

    #[instrument(skip(self, ids), fields(table = %self.table, count = ids.len()))]
    async fn delete(&self, ids: Vec<String>) -> VectorResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let present = self.count_matching(&ids).await?;
        if present == 0 {
            return Ok(0);
        }

        self.client
            .execute(&format!(
                "DELETE FROM {table} WHERE {id} IN ({list})",
                table = self.table,
                id = self.id_column,
                list = Self::id_list(&ids),
            ))
            .await?;

        Ok(present)
    }

    async fn scan(&self) -> VectorResult<Vec<VectorRecord>> {
        let sql = format!(
            "SELECT {id} AS id, {vec} AS embedding FROM {table} FINAL ORDER BY seq",
            id = self.id_column,
            vec = self.vector_column,
            table = self.table,
        );
        let rows: Vec<ScanRow> = self.client.query_rows(&sql).await?;

        Ok(rows
            .into_iter()
            .map(|row| VectorRecord {
                id: row.id,
                embedding: row.embedding,
            })
            .collect())
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn truncate(&self) -> VectorResult<u64> {
        let removed = self.count_all().await?;
        self.client
            .execute(&format!("TRUNCATE TABLE IF EXISTS {}", self.table))
            .await?;

        info!(removed, "Collection truncated");
        Ok(removed)
    }
}
