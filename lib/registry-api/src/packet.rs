use serde::{Deserialize, Serialize};

/// Params of the outbound `register` packet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterParams {
    pub app: String,
    pub service: String,
    pub version: String,
    /// Host the local service listens on
    pub host: String,
    /// Port the local service listens on
    pub port: u16,
    /// Node id minted by the client for this process
    pub node_id: String,
    /// Every service this node depends on
    #[serde(default)]
    pub vendors: Vec<VendorRef>,
}

/// A dependency declaration as it appears on the wire
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRef {
    pub app: String,
    pub service: String,
    pub version: String,
}

/// Params of the outbound `subscribe` packet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubscribeParams {
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub subscribe_to: Vec<SubscriptionEntry>,
}

/// One (vendor identity, local endpoint) pair the registry should push to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    pub app: String,
    pub service: String,
    pub version: String,
    pub endpoint: String,
}

/// Params of the inbound `registered` packet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisteredParams {
    #[serde(default)]
    pub vendors: Vec<AdvertisedVendor>,
}

/// A vendor and the instances the registry currently knows for it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvertisedVendor {
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<AdvertisedAddress>,
}

/// One running instance of a vendor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisedAddress {
    pub host: String,
    pub port: u16,
    pub node_id: String,
}
