/// Unified error type for store connectivity
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Transport-level failure talking to the store (connect, TLS, timeout)
    #[cfg(feature = "clickhouse")]
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered but rejected the statement
    #[error("Query failed with status {status}: {message}")]
    Query { status: u16, message: String },

    /// A response row could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
