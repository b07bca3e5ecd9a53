//! Service discovery: self-registration and endpoint lookup.
//!
//! The [`ServiceRegistry`] trait is what the rest of the workspace depends
//! on; [`ConsulRegistry`] implements it against Consul's HTTP API and
//! [`StaticRegistry`] keeps everything in-process.

mod consul;
mod local;
mod registration;

use async_trait::async_trait;
use thiserror::Error;

pub use consul::{ConsulConfig, ConsulRegistry};
pub use local::{DiscoveryBackend, StaticRegistry};
pub use registration::{ServiceEndpoint, ServiceRegistration};

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Registry rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Service '{0}' not found in catalog")]
    NotFound(String),

    #[error("Invalid catalog entry: {0}")]
    InvalidEntry(String),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Catalog the service registers itself in and resolves peers from
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Register (or re-register) this instance.
    async fn register(&self, registration: &ServiceRegistration) -> DiscoveryResult<()>;

    /// Look up the first known endpoint of `service_name`.
    async fn resolve(&self, service_name: &str) -> DiscoveryResult<ServiceEndpoint>;
}
