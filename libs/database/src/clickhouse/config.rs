#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};

/// ClickHouse connection settings
///
/// ```ignore
/// use database::clickhouse::ClickHouseConfig;
///
/// let config = ClickHouseConfig::new("http://clickhouse:8123")
///     .with_credentials("default", "")
///     .with_database("db_master");
/// ```
#[derive(Clone, Debug)]
pub struct ClickHouseConfig {
    /// Base URL of the HTTP interface, e.g. `http://127.0.0.1:8123`
    pub url: String,

    pub user: String,

    pub password: String,

    /// Database used for unqualified names and created at bootstrap
    pub database: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ClickHouseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            user: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(feature = "config")]
impl ClickHouseConfig {
    /// Reads everything but the URL from the environment.
    ///
    /// Used when the URL comes from service discovery instead of
    /// `CLICKHOUSE_URL`.
    pub fn from_env_with_url(url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self::new(url)
            .with_credentials(
                env_or_default("CLICKHOUSE_USER", "default"),
                env_or_default("CLICKHOUSE_PASSWORD", ""),
            )
            .with_database(env_or_default("CLICKHOUSE_DATABASE", "db_master"))
            .with_timeout(env_parse("CLICKHOUSE_TIMEOUT_SECS", 30)?))
    }
}

#[cfg(feature = "config")]
impl FromEnv for ClickHouseConfig {
    /// Requires CLICKHOUSE_URL; everything else has defaults.
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_url(env_required("CLICKHOUSE_URL")?)
    }
}
