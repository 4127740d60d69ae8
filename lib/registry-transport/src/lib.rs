//! Newline-delimited JSON transport to the service registry
pub mod codec;
pub mod error;
pub mod tcp;

pub use codec::{decode_record, encode_record};
pub use error::TransportError;
pub use tcp::{JsonLineConnection, JsonLineConnector, TcpConnectorConfig};
