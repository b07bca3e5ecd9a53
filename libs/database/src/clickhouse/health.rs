use tracing::debug;

use super::ClickHouseClient;
use crate::common::DatabaseError;

/// Check ClickHouse health
///
/// Pings the server and then runs `SELECT 1` so that credentials and the
/// configured database are exercised too.
///
/// # Example
/// ```ignore
/// use database::clickhouse::check_health;
///
/// if let Err(e) = check_health(&client).await {
///     tracing::warn!("ClickHouse unavailable: {}", e);
/// }
/// ```
pub async fn check_health(client: &ClickHouseClient) -> Result<(), DatabaseError> {
    debug!("Running ClickHouse health check");

    client.ping().await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("ClickHouse ping failed: {}", e))
    })?;

    #[derive(serde::Deserialize)]
    struct One {
        ok: u8,
    }

    let rows: Vec<One> = client
        .query_rows("SELECT 1 AS ok")
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("ClickHouse query failed: {}", e)))?;

    match rows.first() {
        Some(One { ok: 1 }) => {
            debug!("ClickHouse health check passed");
            Ok(())
        }
        _ => Err(DatabaseError::HealthCheckFailed(
            "ClickHouse SELECT 1 returned an unexpected result".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clickhouse::ClickHouseConfig;

    #[tokio::test]
    async fn test_unreachable_server_fails_ping() {
        let client =
            ClickHouseClient::new(ClickHouseConfig::new("http://127.0.0.1:1").with_timeout(1))
                .unwrap();
        let err = check_health(&client).await.unwrap_err();
        assert!(matches!(err, DatabaseError::HealthCheckFailed(_)));
        assert!(err.to_string().contains("ping failed"));
    }
}
