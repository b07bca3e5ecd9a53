use core_config::{ConfigError, env_optional, env_or_default};
use serde::{Deserialize, Serialize};

/// What this instance announces to the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    pub name: String,
    pub id: String,
    pub address: String,
    pub port: u16,
    /// Polled by the registry; points at the liveness endpoint.
    pub health_check_url: String,
}

impl ServiceRegistration {
    pub fn new(name: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        let name = name.into();
        let address = address.into();
        Self {
            id: format!("{name}-{address}-{port}"),
            health_check_url: format!("http://{address}:{port}/health"),
            name,
            address,
            port,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Build the registration for a server listening on `port`.
    ///
    /// Reads `SERVICE_NAME` (default `vector-search-api`), `SERVICE_ADDRESS`
    /// (default `$HOSTNAME`, then `127.0.0.1`) and `SERVICE_ID` (default
    /// `{name}-{address}-{port}`).
    pub fn from_env(port: u16) -> Result<Self, ConfigError> {
        let name = env_or_default("SERVICE_NAME", "vector-search-api");
        let address = env_optional("SERVICE_ADDRESS")
            .or_else(|| env_optional("HOSTNAME"))
            .unwrap_or_else(|| "127.0.0.1".to_string());

        let registration = Self::new(name, address, port);
        Ok(match env_optional("SERVICE_ID") {
            Some(id) => registration.with_id(id),
            None => registration,
        })
    }
}

/// A resolved `host:port` pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub address: String,
    pub port: u16,
}

impl ServiceEndpoint {
    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_id_and_health_url() {
        let reg = ServiceRegistration::new("vector-search-api", "10.0.0.5", 4000);
        assert_eq!(reg.id, "vector-search-api-10.0.0.5-4000");
        assert_eq!(reg.health_check_url, "http://10.0.0.5:4000/health");
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("SERVICE_NAME", None::<&str>),
                ("SERVICE_ADDRESS", None),
                ("SERVICE_ID", None),
                ("HOSTNAME", None),
            ],
            || {
                let reg = ServiceRegistration::from_env(4000).unwrap();
                assert_eq!(reg.name, "vector-search-api");
                assert_eq!(reg.address, "127.0.0.1");
                assert_eq!(reg.id, "vector-search-api-127.0.0.1-4000");
            },
        );
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("SERVICE_NAME", Some("search")),
                ("SERVICE_ADDRESS", Some("api-1")),
                ("SERVICE_ID", Some("search-primary")),
            ],
            || {
                let reg = ServiceRegistration::from_env(8080).unwrap();
                assert_eq!(reg.name, "search");
                assert_eq!(reg.id, "search-primary");
                assert_eq!(reg.health_check_url, "http://api-1:8080/health");
            },
        );
    }

    #[test]
    fn test_address_falls_back_to_hostname() {
        temp_env::with_vars(
            [("SERVICE_ADDRESS", None), ("HOSTNAME", Some("pod-7"))],
            || {
                let reg = ServiceRegistration::from_env(4000).unwrap();
                assert_eq!(reg.address, "pod-7");
            },
        );
    }

    #[test]
    fn test_endpoint_url() {
        let endpoint = ServiceEndpoint {
            address: "clickhouse".into(),
            port: 8123,
        };
        assert_eq!(endpoint.http_url(), "http://clickhouse:8123");
    }
}
