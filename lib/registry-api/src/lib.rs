//! Wire records exchanged between a node and the service registry
//!
//! This library defines:
//! - Record: the structured envelope every packet travels in
//! - Typed params for the `register`, `subscribe` and `registered` packets

pub mod record;
pub mod packet;

pub use record::Record;
pub use packet::{
    AdvertisedAddress, AdvertisedVendor, RegisterParams, RegisteredParams, SubscribeParams,
    SubscriptionEntry, VendorRef,
};

/// Record type of the outbound registration packet
pub const TYPE_REGISTER: &str = "register";
/// Record type of the outbound subscription packet
pub const TYPE_SUBSCRIBE: &str = "subscribe";
/// Record type the registry replies with once a node is registered
pub const TYPE_REGISTERED: &str = "registered";
