//! Construction of the registration and subscription packets

use crate::{Result, ServiceIdentity, Vendor};
use registry_api::{Record, RegisterParams, SubscribeParams, TYPE_REGISTER, TYPE_SUBSCRIBE};
use rand::RngCore;

/// Random 32-hex-digit token used for correlation ids and node ids.
///
/// Best-effort unique: 128 random bits, no coordination with other nodes.
pub fn unique_hex() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build the `register` packet announcing the local service and its vendors
pub fn registration_packet(
    identity: &ServiceIdentity,
    host: &str,
    port: u16,
    node_id: &str,
    vendors: &[Vendor],
) -> Result<Record> {
    let params = RegisterParams {
        app: identity.app.clone(),
        service: identity.service.clone(),
        version: identity.version.clone(),
        host: host.to_string(),
        port,
        node_id: node_id.to_string(),
        vendors: vendors.iter().map(|v| v.identity().to_vendor_ref()).collect(),
    };

    Ok(Record::new(TYPE_REGISTER, &params)?.with_pid(unique_hex()))
}

/// Build the `subscribe` packet listing every (vendor, local endpoint) pair
/// the registry should push events for
pub fn subscription_packet(ip: &str, port: u16, vendors: &[Vendor]) -> Result<Record> {
    let params = SubscribeParams {
        ip: ip.to_string(),
        port,
        subscribe_to: vendors.iter().flat_map(|v| v.subscription_entries()).collect(),
    };

    Ok(Record::new(TYPE_SUBSCRIBE, &params)?.with_pid(unique_hex()))
}
