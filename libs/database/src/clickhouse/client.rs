use super::ClickHouseConfig;
use crate::common::{DatabaseError, DatabaseResult};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// Thin client for the ClickHouse HTTP interface.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ClickHouseClient {
    http: Client,
    config: ClickHouseConfig,
}

impl ClickHouseClient {
    pub fn new(config: ClickHouseConfig) -> DatabaseResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    fn post(&self, query_params: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/", self.config.url))
            .header("X-ClickHouse-User", &self.config.user)
            .header("X-ClickHouse-Key", &self.config.password)
            .query(&[("database", self.config.database.as_str())])
            .query(query_params)
    }

    async fn check(response: reqwest::Response) -> DatabaseResult<String> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(DatabaseError::Query {
                status: status.as_u16(),
                message: body.trim().to_string(),
            })
        }
    }

    /// Run a statement that returns no rows (DDL, DELETE, TRUNCATE).
    #[instrument(skip(self, sql), fields(database = %self.config.database))]
    pub async fn execute(&self, sql: &str) -> DatabaseResult<()> {
        debug!(sql, "Executing statement");
        let response = self.post(&[]).body(sql.to_string()).send().await?;
        Self::check(response).await.map(|_| ())
    }

    /// Run a `SELECT` and decode each `JSONEachRow` line into `T`.
    ///
    /// `FORMAT JSONEachRow` is appended to the statement.
    #[instrument(skip(self, sql), fields(database = %self.config.database))]
    pub async fn query_rows<T: DeserializeOwned>(&self, sql: &str) -> DatabaseResult<Vec<T>> {
        debug!(sql, "Running query");
        let response = self
            .post(&[("output_format_json_quote_64bit_integers", "0")])
            .body(format!("{sql} FORMAT JSONEachRow"))
            .send()
            .await?;
        let body = Self::check(response).await?;

        parse_json_each_row(&body)
    }

    /// Insert rows with `JSONEachRow`.
    ///
    /// `insert_prefix` is everything before `FORMAT`, e.g.
    /// `INSERT INTO db.tbl (id, vec)`.
    #[instrument(skip(self, insert_prefix, rows), fields(database = %self.config.database, rows = rows.len()))]
    pub async fn insert_rows<T: Serialize>(
        &self,
        insert_prefix: &str,
        rows: &[T],
    ) -> DatabaseResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut body = format!("{insert_prefix} FORMAT JSONEachRow\n");
        for row in rows {
            let line =
                serde_json::to_string(row).map_err(|e| DatabaseError::Decode(e.to_string()))?;
            body.push_str(&line);
            body.push('\n');
        }

        let response = self.post(&[]).body(body).send().await?;
        Self::check(response).await.map(|_| ())
    }

    /// `GET /ping`; the server answers `Ok.` when it is up.
    pub async fn ping(&self) -> DatabaseResult<()> {
        let response = self
            .http
            .get(format!("{}/ping", self.config.url))
            .send()
            .await?;
        let body = Self::check(response).await?;

        if body.trim() == "Ok." {
            Ok(())
        } else {
            Err(DatabaseError::HealthCheckFailed(format!(
                "unexpected ping response: {}",
                body.trim()
            )))
        }
    }
}

fn parse_json_each_row<T: DeserializeOwned>(body: &str) -> DatabaseResult<Vec<T>> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(|e| DatabaseError::Decode(e.to_string())))
        .collect()
}

/// Validate and backtick-quote an identifier (database, table or column).
///
/// Only ASCII letters, digits and underscores are accepted, and the first
/// character must not be a digit.
pub fn quote_identifier(name: &str) -> DatabaseResult<String> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest {
        Ok(format!("`{name}`"))
    } else {
        Err(DatabaseError::ConfigError(format!(
            "invalid identifier: {name:?}"
        )))
    }
}

/// Render a single-quoted string literal.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
