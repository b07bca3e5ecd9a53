//! Type-safe error codes for API responses.
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier for clients, an integer
//! for logs and dashboards, and a default message.
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000s)
    /// Request payload failed validation
    ValidationError,

    /// Request body is not valid JSON or does not match the expected shape
    InvalidJson,

    /// No route matches the request
    NotFound,

    /// Route exists but not for this HTTP method
    MethodNotAllowed,

    // Server errors (1500s)
    /// An unexpected internal server error occurred
    InternalError,

    /// The service is not ready to serve requests
    ServiceUnavailable,

    /// The request exceeded its latency budget
    Timeout,

    // Upstream errors (2000s)
    /// The backing store failed or is unreachable
    StoreError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::StoreError => "STORE_ERROR",
        }
    }

    /// Integer code for structured logs.
    ///
    /// - 1000-1499: client errors
    /// - 1500-1999: server errors
    /// - 2000-2999: upstream errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidJson => 1002,
            Self::NotFound => 1004,
            Self::MethodNotAllowed => 1005,
            Self::InternalError => 1500,
            Self::ServiceUnavailable => 1503,
            Self::Timeout => 1504,
            Self::StoreError => 2001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidJson => "Invalid JSON in request body",
            Self::NotFound => "The requested resource was not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError => "An unexpected error occurred",
            Self::ServiceUnavailable => "Service is not ready",
            Self::Timeout => "Request timed out",
            Self::StoreError => "The storage backend failed to complete the request",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::InvalidJson,
            ErrorCode::NotFound,
            ErrorCode::MethodNotAllowed,
            ErrorCode::InternalError,
            ErrorCode::ServiceUnavailable,
            ErrorCode::Timeout,
            ErrorCode::StoreError,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }

    #[test]
    fn test_code_ranges() {
        assert!((1000..1500).contains(&ErrorCode::ValidationError.code()));
        assert!((1500..2000).contains(&ErrorCode::Timeout.code()));
        assert!((2000..3000).contains(&ErrorCode::StoreError.code()));
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::StoreError.to_string(), "STORE_ERROR");
    }
}
