//! Seams to the connection and codec layers
//!
//! The session never names a concrete protocol. A [`ConnectionFactory`] is
//! injected at construction; calling it yields a [`Link`] whose connection
//! accepts outbound records and whose receiver yields decoded inbound ones.

use crate::Result;
use async_trait::async_trait;
use registry_api::Record;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound half of an established registry connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Encode and send one record. Does not wait for any reply.
    async fn send(&self, record: Record) -> Result<()>;
}

/// Establishes connections to the registry
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self) -> Result<Link>;
}

/// An established connection plus the stream of records decoded from it.
///
/// The receiver closes when the underlying connection goes away.
pub struct Link {
    pub connection: Arc<dyn Connection>,
    pub inbound: mpsc::Receiver<Record>,
}

impl Link {
    pub fn new(connection: Arc<dyn Connection>, inbound: mpsc::Receiver<Record>) -> Self {
        Self { connection, inbound }
    }
}
