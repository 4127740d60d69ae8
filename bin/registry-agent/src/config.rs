//! Agent configuration loaded from YAML

use anyhow::{Context, Result};
use registry_core::{SessionConfig, Vendor};
use registry_transport::TcpConnectorConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default location of the agent config file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/registry-agent/agent.yaml";

#[derive(Clone, Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    /// The service this process hosts
    pub node: NodeConfig,

    /// Services this node depends on
    #[serde(default)]
    pub vendors: Vec<VendorConfig>,

    /// Timeout for request/response exchanges with the registry (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Interval between address cache reports (seconds)
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

/// Registry endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_host")]
    pub host: String,

    #[serde(default = "default_registry_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Identity and listening endpoint of the hosted service
#[derive(Clone, Debug, Deserialize)]
pub struct NodeConfig {
    pub ip: String,
    pub port: u16,
    pub app: String,
    pub service: String,
    pub version: String,
}

/// A dependency and the local endpoints subscribed to its events
#[derive(Clone, Debug, Deserialize)]
pub struct VendorConfig {
    pub app: String,
    pub service: String,
    pub version: String,

    #[serde(default)]
    pub subscribe: Vec<String>,
}

fn default_registry_host() -> String {
    "127.0.0.1".to_string()
}

fn default_registry_port() -> u16 {
    4500
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_report_interval() -> u64 {
    60
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: default_registry_host(),
            port: default_registry_port(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn connector_config(&self) -> TcpConnectorConfig {
        TcpConnectorConfig {
            host: self.registry.host.clone(),
            port: self.registry.port,
            connect_timeout: Duration::from_secs(self.registry.connect_timeout_secs),
            ..Default::default()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs.max(1))
    }

    /// Vendor declarations with their subscribable endpoints
    pub fn vendors(&self) -> Vec<Vendor> {
        self.vendors
            .iter()
            .map(|v| {
                v.subscribe
                    .iter()
                    .fold(Vendor::new(&v.app, &v.service, &v.version), |vendor, endpoint| {
                        vendor.subscribe(endpoint)
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
registry:
  host: registry.internal
  port: 4600
  connect_timeout_secs: 3
node:
  ip: 10.0.0.5
  port: 9000
  app: orders
  service: checkout
  version: "2"
vendors:
  - app: billing
    service: invoice
    version: "1"
    subscribe: [invoice_paid, invoice_voided]
  - app: identity
    service: accounts
    version: "3"
request_timeout_secs: 5
report_interval_secs: 15
"#;

    #[test]
    fn test_parse_full_config() {
        let config = AgentConfig::parse(FULL).unwrap();
        assert_eq!(config.node.app, "orders");
        assert_eq!(config.node.version, "2");

        let connector = config.connector_config();
        assert_eq!(connector.addr(), "registry.internal:4600");
        assert_eq!(connector.connect_timeout, Duration::from_secs(3));

        assert_eq!(config.session_config().request_timeout, Duration::from_secs(5));
        assert_eq!(config.report_interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_vendors_carry_subscriptions() {
        let vendors = AgentConfig::parse(FULL).unwrap().vendors();
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].identity().key(), "billing/invoice/1");
        assert_eq!(
            vendors[0].subscribable_endpoints().to_vec(),
            vec!["invoice_paid", "invoice_voided"]
        );
        assert!(vendors[1].subscribable_endpoints().is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = AgentConfig::parse(
            "node: {ip: 10.0.0.5, port: 9000, app: orders, service: checkout, version: '2'}",
        )
        .unwrap();
        assert_eq!(config.registry.host, "127.0.0.1");
        assert_eq!(config.registry.port, 4500);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.report_interval_secs, 60);
        assert!(config.vendors.is_empty());
    }

    #[test]
    fn test_missing_node_is_an_error() {
        assert!(AgentConfig::parse("vendors: []").is_err());
    }
}
