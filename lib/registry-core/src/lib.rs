//! Node-side service registry client
//!
//! This library provides:
//! - Registration of the local service with the registry
//! - An address cache of vendor instances fed by registry pushes
//! - Subscription requests for vendor event streams
//! - Lookup and assignment resolution for callers

pub mod assignment;
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod identity;
pub mod listener;
pub mod packet;
pub mod pending;
pub mod session;
pub mod transport;
pub mod vendor;

pub use assignment::AssignmentTable;
pub use cache::AddressCache;
pub use config::SessionConfig;
pub use endpoint::Address;
pub use error::{CoreError, Result};
pub use identity::ServiceIdentity;
pub use listener::RegistrationListener;
pub use pending::PendingRequests;
pub use session::{RegistrationState, RegistrySession, SessionState};
pub use transport::{Connection, ConnectionFactory, Link};
pub use vendor::Vendor;
