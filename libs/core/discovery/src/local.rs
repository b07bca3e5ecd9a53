use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::info;

use crate::{DiscoveryError, DiscoveryResult, ServiceEndpoint, ServiceRegistration, ServiceRegistry};

/// Which registry implementation the process talks to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiscoveryBackend {
    #[default]
    Consul,
    /// In-process registry; nothing leaves the process
    Static,
}

impl FromStr for DiscoveryBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consul" => Ok(DiscoveryBackend::Consul),
            "static" => Ok(DiscoveryBackend::Static),
            other => Err(ConfigError::ParseError {
                key: "DISCOVERY_BACKEND".to_string(),
                details: format!("unknown backend '{other}', expected 'consul' or 'static'"),
            }),
        }
    }
}

impl FromEnv for DiscoveryBackend {
    /// DISCOVERY_BACKEND (consul)
    fn from_env() -> Result<Self, ConfigError> {
        env_or_default("DISCOVERY_BACKEND", "consul").parse()
    }
}

/// Registry for local runs and tests.
///
/// `register` always succeeds and is remembered; `resolve` answers from
/// endpoints added with [`StaticRegistry::with_service`].
#[derive(Debug, Default)]
pub struct StaticRegistry {
    endpoints: HashMap<String, ServiceEndpoint>,
    registered: Mutex<Vec<ServiceRegistration>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, name: impl Into<String>, endpoint: ServiceEndpoint) -> Self {
        self.endpoints.insert(name.into(), endpoint);
        self
    }

    /// Every registration received so far, oldest first.
    pub fn registrations(&self) -> Vec<ServiceRegistration> {
        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ServiceRegistry for StaticRegistry {
    async fn register(&self, registration: &ServiceRegistration) -> DiscoveryResult<()> {
        info!(
            service = %registration.name,
            id = %registration.id,
            "Registered in static registry"
        );
        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(registration.clone());
        Ok(())
    }

    async fn resolve(&self, service_name: &str) -> DiscoveryResult<ServiceEndpoint> {
        self.endpoints
            .get(service_name)
            .cloned()
            .ok_or_else(|| DiscoveryError::NotFound(service_name.to_string()))
    }
}
