use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use database::common::RetryConfig;
use std::str::FromStr;
use std::time::Duration;

/// Request-path limits
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Largest accepted insert batch
    pub max_batch: usize,
    /// Budget for one service operation, store round-trips included
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch: 10_000,
            request_timeout: Duration::from_millis(30_000),
        }
    }
}

impl FromEnv for EngineConfig {
    /// INGEST_MAX_BATCH (10000), REQUEST_TIMEOUT_MS (30000)
    fn from_env() -> Result<Self, ConfigError> {
        let max_batch = env_parse("INGEST_MAX_BATCH", 10_000usize)?;
        let timeout_ms = env_parse("REQUEST_TIMEOUT_MS", 30_000u64)?;

        Ok(Self {
            max_batch,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Retry budget for registration and the store probe at startup
#[derive(Clone, Debug)]
pub struct StartupConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl StartupConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .with_max_retries(self.max_retries)
            .with_initial_delay(self.initial_delay_ms)
            .with_max_delay(self.max_delay_ms)
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl FromEnv for StartupConfig {
    /// STARTUP_MAX_RETRIES (5), STARTUP_RETRY_DELAY_MS (500),
    /// STARTUP_RETRY_MAX_DELAY_MS (10000)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_retries: env_parse("STARTUP_MAX_RETRIES", 5)?,
            initial_delay_ms: env_parse("STARTUP_RETRY_DELAY_MS", 500)?,
            max_delay_ms: env_parse("STARTUP_RETRY_MAX_DELAY_MS", 10_000)?,
        })
    }
}

/// Which [`RecordStore`](crate::store::RecordStore) the service runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    ClickHouse,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clickhouse" => Ok(StoreBackend::ClickHouse),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("expected 'clickhouse' or 'memory', got '{other}'")),
        }
    }
}

impl FromEnv for StoreBackend {
    /// STORE_BACKEND, default `clickhouse`
    fn from_env() -> Result<Self, ConfigError> {
        env_parse("STORE_BACKEND", StoreBackend::ClickHouse)
    }
}

/// Table layout of the ClickHouse collection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    pub table: String,
    pub id_column: String,
    pub vector_column: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table: "element".to_string(),
            id_column: "doc_id".to_string(),
            vector_column: "centroid".to_string(),
        }
    }
}

impl FromEnv for TableConfig {
    /// CLICKHOUSE_TABLE (element), CLICKHOUSE_IDS (doc_id),
    /// CLICKHOUSE_VECTORS (centroid)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            table: env_or_default("CLICKHOUSE_TABLE", "element"),
            id_column: env_or_default("CLICKHOUSE_IDS", "doc_id"),
            vector_column: env_or_default("CLICKHOUSE_VECTORS", "centroid"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        temp_env::with_vars(
            [("INGEST_MAX_BATCH", None::<&str>), ("REQUEST_TIMEOUT_MS", None)],
            || {
                let config = EngineConfig::from_env().unwrap();
                assert_eq!(config.max_batch, 10_000);
                assert_eq!(config.request_timeout, Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_engine_config_invalid_timeout() {
        temp_env::with_var("REQUEST_TIMEOUT_MS", Some("-5"), || {
            let err = EngineConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "REQUEST_TIMEOUT_MS"));
        });
    }

    #[test]
    fn test_startup_config_from_env() {
        temp_env::with_vars(
            [
                ("STARTUP_MAX_RETRIES", Some("2")),
                ("STARTUP_RETRY_DELAY_MS", None),
                ("STARTUP_RETRY_MAX_DELAY_MS", None),
            ],
            || {
                let config = StartupConfig::from_env().unwrap();
                assert_eq!(config.max_retries, 2);
                assert_eq!(config.initial_delay_ms, 500);
                assert_eq!(config.retry_config().max_retries, 2);
            },
        );
    }

    #[test]
    fn test_store_backend_parse() {
        temp_env::with_var_unset("STORE_BACKEND", || {
            assert_eq!(StoreBackend::from_env().unwrap(), StoreBackend::ClickHouse);
        });
        temp_env::with_var("STORE_BACKEND", Some("Memory"), || {
            assert_eq!(StoreBackend::from_env().unwrap(), StoreBackend::Memory);
        });
        temp_env::with_var("STORE_BACKEND", Some("postgres"), || {
            assert!(StoreBackend::from_env().is_err());
        });
    }

    #[test]
    fn test_table_config_defaults() {
        temp_env::with_vars(
            [
                ("CLICKHOUSE_TABLE", None::<&str>),
                ("CLICKHOUSE_IDS", None),
                ("CLICKHOUSE_VECTORS", None),
            ],
            || {
                assert_eq!(TableConfig::from_env().unwrap(), TableConfig::default());
            },
        );
    }
}
