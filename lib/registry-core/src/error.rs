use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Not connected to the registry")]
    NotConnected,

    #[error("Already registered as {registered}, refusing to register as {requested}")]
    IdentityMismatch { registered: String, requested: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No reply to request {pid} within {timeout:?}")]
    Timeout { pid: String, timeout: Duration },

    #[error("Request {0} was dropped before a reply arrived")]
    RequestDropped(String),

    #[error("Duplicate pending request: {0}")]
    DuplicateRequest(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
