use core_config::{AppInfo, FromEnv, app_info, env_optional, env_or_default, server::ServerConfig};
use discovery::{ConsulConfig, DiscoveryBackend};
use domain_vector::{EngineConfig, StartupConfig, StoreBackend, TableConfig};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the workspace libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub engine: EngineConfig,
    pub startup: StartupConfig,
    pub store: StoreBackend,
    pub table: TableConfig,
    /// Direct ClickHouse URL; resolved through discovery when unset
    pub clickhouse_url: Option<String>,
    pub clickhouse_service: String,
    pub discovery: DiscoveryBackend,
    pub consul: ConsulConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=4000

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            engine: EngineConfig::from_env()?,
            startup: StartupConfig::from_env()?,
            store: StoreBackend::from_env()?,
            table: TableConfig::from_env()?,
            clickhouse_url: env_optional("CLICKHOUSE_URL"),
            clickhouse_service: env_or_default("CLICKHOUSE_SERVICE_NAME", "clickhouse-service"),
            discovery: DiscoveryBackend::from_env()?,
            consul: ConsulConfig::from_env()?,
        })
    }
}
