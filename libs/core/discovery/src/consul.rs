use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::{DiscoveryError, DiscoveryResult, ServiceEndpoint, ServiceRegistration, ServiceRegistry};

/// Consul agent connection settings
#[derive(Clone, Debug)]
pub struct ConsulConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl ConsulConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout_secs: 10,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl FromEnv for ConsulConfig {
    /// CONSUL_HOST defaults to `consul`, CONSUL_PORT to 8500.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("CONSUL_HOST", "consul"),
            port: env_parse("CONSUL_PORT", 8500)?,
            timeout_secs: env_parse("CONSUL_TIMEOUT_SECS", 10)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceRegistration<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    name: &'a str,
    address: &'a str,
    port: u16,
    check: AgentServiceCheck<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceCheck<'a> {
    #[serde(rename = "HTTP")]
    http: &'a str,
    interval: &'a str,
    timeout: &'a str,
    deregister_critical_service_after: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct CatalogService {
    #[serde(default)]
    address: String,
    #[serde(default)]
    service_address: String,
    service_port: u16,
}

impl CatalogService {
    fn into_endpoint(self) -> DiscoveryResult<ServiceEndpoint> {
        let address = if self.service_address.is_empty() {
            self.address
        } else {
            self.service_address
        };

        if address.is_empty() {
            return Err(DiscoveryError::InvalidEntry(
                "entry has neither ServiceAddress nor Address".to_string(),
            ));
        }

        Ok(ServiceEndpoint {
            address,
            port: self.service_port,
        })
    }
}

/// [`ServiceRegistry`] backed by a Consul agent's HTTP API
#[derive(Clone)]
pub struct ConsulRegistry {
    client: Client,
    base_url: String,
}

impl ConsulRegistry {
    pub fn new(config: &ConsulConfig) -> DiscoveryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    async fn check(response: reqwest::Response) -> DiscoveryResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(DiscoveryError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ServiceRegistry for ConsulRegistry {
    #[instrument(skip(self, registration), fields(service = %registration.name, id = %registration.id))]
    async fn register(&self, registration: &ServiceRegistration) -> DiscoveryResult<()> {
        let body = AgentServiceRegistration {
            id: &registration.id,
            name: &registration.name,
            address: &registration.address,
            port: registration.port,
            check: AgentServiceCheck {
                http: &registration.health_check_url,
                interval: "10s",
                timeout: "5s",
                deregister_critical_service_after: "1m",
            },
        };

        let response = self
            .client
            .put(format!("{}/v1/agent/service/register", self.base_url))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;

        info!("Registered with Consul");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve(&self, service_name: &str) -> DiscoveryResult<ServiceEndpoint> {
        let response = self
            .client
            .get(format!("{}/v1/catalog/service/{}", self.base_url, service_name))
            .send()
            .await?;
        let entries: Vec<CatalogService> = Self::check(response).await?.json().await?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| DiscoveryError::NotFound(service_name.to_string()))?;
        let endpoint = entry.into_endpoint()?;

        debug!(address = %endpoint.address, port = endpoint.port, "Resolved service");
        Ok(endpoint)
    }
}
