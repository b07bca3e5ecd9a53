//! Readiness gate.
//!
//! ```text
//! Starting ──begin_registration──▶ Registering ──registration_acknowledged──▶ AwaitingStore
//!                                                                                  │
//!                                                                           store_confirmed
//!                                                                                  ▼
//!          any non-Ready state ──fail(reason)──▶ Failed(reason)                  Ready
//! ```
//!
//! Requests are served only in `Ready`; `Failed` is terminal.

use database::common::{RetryConfig, retry_with_backoff};
use discovery::{DiscoveryError, ServiceRegistration, ServiceRegistry};
use serde::Serialize;
use std::fmt;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{error, info};

use crate::error::{VectorError, VectorResult};
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum GateState {
    Starting,
    Registering,
    AwaitingStore,
    Ready,
    Failed(String),
}

impl GateState {
    pub fn name(&self) -> &'static str {
        match self {
            GateState::Starting => "starting",
            GateState::Registering => "registering",
            GateState::AwaitingStore => "awaiting_store",
            GateState::Ready => "ready",
            GateState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("invalid gate transition '{action}' from state '{from}'")]
    InvalidTransition { from: String, action: &'static str },
}

/// Startup state shared by the bootstrap task and every request.
#[derive(Debug)]
pub struct ReadinessGate {
    state: RwLock<GateState>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GateState::Starting),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), GateState::Ready)
    }

    fn transition(
        &self,
        action: &'static str,
        next: impl FnOnce(&GateState) -> Option<GateState>,
    ) -> Result<(), GateError> {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match next(&state) {
            Some(new_state) => {
                info!(from = state.name(), to = new_state.name(), "Readiness gate transition");
                *state = new_state;
                Ok(())
            }
            None => Err(GateError::InvalidTransition {
                from: state.name().to_string(),
                action,
            }),
        }
    }

    /// `Starting → Registering`
    pub fn begin_registration(&self) -> Result<(), GateError> {
        self.transition("begin_registration", |s| {
            matches!(s, GateState::Starting).then_some(GateState::Registering)
        })
    }

    /// `Registering → AwaitingStore`
    pub fn registration_acknowledged(&self) -> Result<(), GateError> {
        self.transition("registration_acknowledged", |s| {
            matches!(s, GateState::Registering).then_some(GateState::AwaitingStore)
        })
    }

    /// `AwaitingStore → Ready`
    pub fn store_confirmed(&self) -> Result<(), GateError> {
        self.transition("store_confirmed", |s| {
            matches!(s, GateState::AwaitingStore).then_some(GateState::Ready)
        })
    }

    /// Any non-Ready, non-Failed state `→ Failed(reason)`
    pub fn fail(&self, reason: impl Into<String>) -> Result<(), GateError> {
        let reason = reason.into();
        self.transition("fail", move |s| match s {
            GateState::Ready | GateState::Failed(_) => None,
            _ => Some(GateState::Failed(reason)),
        })
    }

    /// `Ok` only in `Ready`.
    pub fn ensure_ready(&self) -> VectorResult<()> {
        match self.state() {
            GateState::Ready => Ok(()),
            other => Err(VectorError::ServiceUnavailable(format!(
                "service is not ready ({other})"
            ))),
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("service registration failed: {0}")]
    Registration(#[source] DiscoveryError),

    #[error("store did not become ready: {0}")]
    Store(#[source] VectorError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

/// Drive the gate from `Starting` to `Ready`.
///
/// Registration and the store probe (`ping` + `ensure_schema`) are each
/// retried under `retry`. On exhaustion the gate is failed and the last
/// error returned.
pub async fn bootstrap<R, S>(
    gate: &ReadinessGate,
    registry: &R,
    registration: &ServiceRegistration,
    store: &S,
    retry: RetryConfig,
) -> Result<(), BootstrapError>
where
    R: ServiceRegistry + ?Sized,
    S: RecordStore + ?Sized,
{
    gate.begin_registration()?;

    if let Err(e) = retry_with_backoff(
        "service registration",
        move || registry.register(registration),
        retry.clone(),
    )
    .await
    {
        error!("Registration retries exhausted: {}", e);
        gate.fail(format!("registration: {e}"))?;
        return Err(BootstrapError::Registration(e));
    }
    gate.registration_acknowledged()?;

    if let Err(e) = retry_with_backoff(
        "store probe",
        move || async move {
            store.ping().await?;
            store.ensure_schema().await
        },
        retry,
    )
    .await
    {
        error!("Store probe retries exhausted: {}", e);
        gate.fail(format!("store: {e}"))?;
        return Err(BootstrapError::Store(e));
    }
    gate.store_confirmed()?;

    info!(service = %registration.name, id = %registration.id, "Service ready");
    Ok(())
}
