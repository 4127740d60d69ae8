//! Per-service entity assignments

use crate::identity::full_service_name;
use crate::ServiceIdentity;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// AssignmentTable maps a service key to named entities and the opaque
/// value the registry assigned to each (a partition, a shard id, a peer).
///
/// The session never writes here itself; framework handlers for the
/// registry's assignment pushes call [`AssignmentTable::assign`].
#[derive(Clone, Default)]
pub struct AssignmentTable {
    assigned: Arc<RwLock<HashMap<String, HashMap<String, Value>>>>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value assigned to an entity, returning the previous one
    pub async fn assign(
        &self,
        identity: &ServiceIdentity,
        entity: impl Into<String>,
        value: Value,
    ) -> Option<Value> {
        let key = identity.key();
        let entity = entity.into();
        debug!(service = %key, entity = %entity, "Recorded assignment");

        let mut assigned = self.assigned.write().await;
        assigned.entry(key).or_default().insert(entity, value)
    }

    /// Drop an entity's assignment
    pub async fn unassign(&self, identity: &ServiceIdentity, entity: &str) -> Option<Value> {
        let mut assigned = self.assigned.write().await;
        assigned.get_mut(&identity.key())?.remove(entity)
    }

    /// The value assigned to an entity, `None` when no assignment is known
    pub async fn resolve(&self, app: &str, service: &str, version: &str, entity: &str) -> Option<Value> {
        let assigned = self.assigned.read().await;
        assigned
            .get(&full_service_name(app, service, version))
            .and_then(|entities| entities.get(entity))
            .cloned()
    }
}
