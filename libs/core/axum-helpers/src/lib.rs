//! # Axum Helpers
//!
//! Shared HTTP plumbing for the workspace's axum services.
//!
//! ## Modules
//!
//! - **[`server`]**: router assembly with OpenAPI docs, liveness, graceful shutdown
//! - **[`errors`]**: the `{status: "error", code, error, message}` envelope and [`AppError`]
//! - **[`extractors`]**: JSON extraction whose rejections use the same envelope
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, ShutdownCoordinator};
//! use core_config::server::ServerConfig;
//!
//! let router = create_router::<ApiDoc>(api_routes).await?;
//! let (coordinator, _rx) = ShutdownCoordinator::new();
//! create_production_app(router, &ServerConfig::default(), Duration::from_secs(30), coordinator, async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod server;

pub use server::{
    HealthResponse, ShutdownCoordinator, create_production_app, create_router, health_router,
    shutdown_signal,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::AppJson;
