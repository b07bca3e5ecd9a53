use axum_helpers::server::{ShutdownCoordinator, create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::clickhouse::{ClickHouseClient, ClickHouseConfig};
use database::common::retry_with_backoff;
use discovery::{ConsulRegistry, DiscoveryBackend, ServiceRegistration, ServiceRegistry, StaticRegistry};
use domain_vector::{
    ClickHouseStore, InMemoryStore, ReadinessGate, RecordStore, StoreBackend, VectorService,
    bootstrap,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod config;
mod openapi;

use config::Config;

fn build_registry(config: &Config) -> eyre::Result<Arc<dyn ServiceRegistry>> {
    Ok(match config.discovery {
        DiscoveryBackend::Consul => {
            info!("Using Consul at {}", config.consul.base_url());
            Arc::new(ConsulRegistry::new(&config.consul)?)
        }
        DiscoveryBackend::Static => {
            info!("Using static in-process registry");
            Arc::new(StaticRegistry::new())
        }
    })
}

async fn build_store(
    config: &Config,
    registry: &dyn ServiceRegistry,
) -> eyre::Result<Arc<dyn RecordStore>> {
    match config.store {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::ClickHouse => {
            let url = match &config.clickhouse_url {
                Some(url) => url.clone(),
                None => {
                    let name = config.clickhouse_service.as_str();
                    let endpoint = retry_with_backoff(
                        "clickhouse discovery",
                        || registry.resolve(name),
                        config.startup.retry_config(),
                    )
                    .await
                    .map_err(|e| eyre::eyre!("Could not resolve '{}': {}", name, e))?;
                    endpoint.http_url()
                }
            };

            info!("Using ClickHouse at {}", url);
            let client = ClickHouseClient::new(ClickHouseConfig::from_env_with_url(url)?)?;
            Ok(Arc::new(ClickHouseStore::new(client, &config.table)?))
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let registry = build_registry(&config)?;
    let store = build_store(&config, registry.as_ref()).await?;

    let gate = Arc::new(ReadinessGate::new());
    let registration = ServiceRegistration::from_env(config.server.port)?;
    let service = Arc::new(VectorService::new(
        store.clone(),
        gate.clone(),
        config.engine.clone(),
    ));

    let (coordinator, _rx) = ShutdownCoordinator::new();

    // Registration and the store probe run while the server already answers
    // /health; vector routes return 503 until the gate opens.
    let startup = {
        let coordinator = coordinator.clone();
        let retry = config.startup.retry_config();
        tokio::spawn(async move {
            let result = bootstrap(&gate, registry.as_ref(), &registration, store.as_ref(), retry).await;
            if let Err(e) = &result {
                error!("Startup failed, shutting down: {}", e);
                coordinator.shutdown();
            }
            result
        })
    };

    let api_routes = domain_vector::router(service);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(health_router(config.app.clone()));

    info!("Starting vector search API with production-ready shutdown (30s timeout)");

    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30),
        coordinator,
        async move {
            info!("Shutting down: draining in-flight requests");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    if startup.is_finished() {
        startup
            .await
            .map_err(|e| eyre::eyre!("Startup task panicked: {}", e))?
            .map_err(|e| eyre::eyre!("Startup failed: {}", e))?;
    } else {
        startup.abort();
    }

    info!("Vector search API shutdown complete");
    Ok(())
}
