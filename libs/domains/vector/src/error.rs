use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::DatabaseError;
use std::time::Duration;
use thiserror::Error;

use crate::gate::GateError;

#[derive(Debug, Error)]
pub enum VectorError {
    /// Malformed input; nothing was written.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The readiness gate is not open.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<DatabaseError> for VectorError {
    fn from(err: DatabaseError) -> Self {
        VectorError::Store(err.to_string())
    }
}

impl From<GateError> for VectorError {
    fn from(err: GateError) -> Self {
        VectorError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for VectorError {
    fn from(err: tokio::task::JoinError) -> Self {
        VectorError::Internal(format!("scoring task failed: {}", err))
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Validation(msg) => AppError::BadRequest(msg),
            VectorError::ServiceUnavailable(msg) => AppError::ServiceUnavailable(msg),
            VectorError::Store(msg) => AppError::BadGateway(msg),
            VectorError::Timeout(after) => AppError::GatewayTimeout(format!(
                "operation timed out after {}ms",
                after.as_millis()
            )),
            VectorError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (VectorError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                VectorError::ServiceUnavailable("starting".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (VectorError::Store("down".into()), StatusCode::BAD_GATEWAY),
            (
                VectorError::Timeout(Duration::from_millis(5)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                VectorError::Internal("panic".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_database_error_becomes_store() {
        let err: VectorError = DatabaseError::Query {
            status: 404,
            message: "Table db_master.element doesn't exist".into(),
        }
        .into();
        assert!(matches!(err, VectorError::Store(msg) if msg.contains("element")));
    }

    #[test]
    fn test_timeout_display() {
        let err = VectorError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Operation timed out after 1500ms");
    }
}
