//! Vendor instance addresses
use registry_api::AdvertisedAddress;
use serde::{Deserialize, Serialize};

/// One running instance of a vendor service, as advertised by the registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub host: String,
    pub port: u16,
    /// Assigned by the registry, distinguishes instances on the same host:port
    pub node_id: String,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16, node_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            node_id: node_id.into(),
        }
    }

    /// `host:port`, suitable for dialing
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<AdvertisedAddress> for Address {
    fn from(addr: AdvertisedAddress) -> Self {
        Self {
            host: addr.host,
            port: addr.port,
            node_id: addr.node_id,
        }
    }
}
