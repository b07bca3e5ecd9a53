//! ClickHouse test infrastructure
//!
//! Provides a `TestClickHouse` helper that runs a ClickHouse server container
//! and waits until its HTTP interface answers.

use database::clickhouse::{ClickHouseClient, ClickHouseConfig};
use database::common::{RetryConfig, retry_with_backoff};
use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const HTTP_PORT: u16 = 8123;

/// Test ClickHouse wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestClickHouse;
///
/// # async fn example() {
/// let clickhouse = TestClickHouse::new().await;
/// let client = clickhouse.client("db_test");
/// client.execute("CREATE DATABASE IF NOT EXISTS db_test").await.unwrap();
/// # }
/// ```
pub struct TestClickHouse {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    pub url: String,
}

impl TestClickHouse {
    /// Start ClickHouse 24.8 and block until `/ping` answers.
    pub async fn new() -> Self {
        let container = GenericImage::new("clickhouse/clickhouse-server", "24.8-alpine")
            .with_exposed_port(HTTP_PORT.tcp())
            .with_env_var("CLICKHOUSE_SKIP_USER_SETUP", "1")
            .start()
            .await
            .expect("Failed to start ClickHouse container");

        let host_port = container
            .get_host_port_ipv4(HTTP_PORT)
            .await
            .expect("Failed to get ClickHouse port");

        let url = format!("http://127.0.0.1:{}", host_port);

        let client = ClickHouseClient::new(ClickHouseConfig::new(&url))
            .expect("Failed to create ClickHouse client");
        let retry = RetryConfig::new()
            .with_max_retries(30)
            .with_initial_delay(200)
            .with_max_delay(1000)
            .without_jitter();
        retry_with_backoff("test clickhouse ping", || client.ping(), retry)
            .await
            .expect("ClickHouse did not become ready");

        tracing::info!(port = host_port, "Test ClickHouse ready (24.8)");

        Self { container, url }
    }

    /// Client bound to `database` (which may not exist yet)
    pub fn client(&self, database: &str) -> ClickHouseClient {
        ClickHouseClient::new(ClickHouseConfig::new(&self.url).with_database(database))
            .expect("Failed to create ClickHouse client")
    }
}

// Container is automatically cleaned up when TestClickHouse is dropped
impl Drop for TestClickHouse {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test ClickHouse container");
    }
}
