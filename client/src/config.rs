use kvcluster_common::{Result, TopologyError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:8081";
pub const DEFAULT_API_PATH: &str = "/admin/api";

/// Control-plane client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the control-plane HTTP listener
    pub endpoint: String,

    /// Path that accepts query/mutation POSTs
    pub api_path: String,

    /// Timeout of the liveness probe against `/`
    pub probe_timeout_seconds: u64,

    /// Timeout of every topology query and mutation
    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            probe_timeout_seconds: 10,
            request_timeout_seconds: 60,
            user_agent: format!("kvcluster-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (host, port) = self.endpoint.rsplit_once(':').ok_or_else(|| {
            TopologyError::config(format!(
                "endpoint `{}` must have the form host:port",
                self.endpoint
            ))
        })?;

        if host.is_empty() {
            return Err(TopologyError::config(format!(
                "endpoint `{}` has an empty host",
                self.endpoint
            )));
        }

        match port.parse::<u16>() {
            Ok(p) if p > 0 => {}
            _ => {
                return Err(TopologyError::config(format!(
                    "endpoint `{}` has an invalid port",
                    self.endpoint
                )))
            }
        }

        if !self.api_path.starts_with('/') {
            return Err(TopologyError::config(format!(
                "api path `{}` must start with '/'",
                self.api_path
            )));
        }

        if self.probe_timeout_seconds == 0 || self.request_timeout_seconds == 0 {
            return Err(TopologyError::config("timeouts must be greater than zero"));
        }

        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.endpoint)
    }

    pub fn api_url(&self) -> String {
        format!("{}{}", self.base_url(), self.api_path)
    }

    pub fn probe_url(&self) -> String {
        format!("{}/", self.base_url())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url(), "http://127.0.0.1:8081/admin/api");
        assert_eq!(config.probe_url(), "http://127.0.0.1:8081/");
        assert_eq!(config.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_endpoints() {
        for endpoint in ["localhost", ":8081", "localhost:", "localhost:http", "localhost:0"] {
            let config = ClientConfig::with_endpoint(endpoint);
            assert!(
                matches!(config.validate(), Err(TopologyError::Config { .. })),
                "{} should be rejected",
                endpoint
            );
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ClientConfig {
            request_timeout_seconds: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
