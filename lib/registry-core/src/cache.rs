//! Vendor address cache fed by registry pushes

use crate::{Address, ServiceIdentity};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// AddressCache maps a service key (app/service/version) to every address
/// the registry has advertised for it, in arrival order.
///
/// Pushes only ever append. Nothing is de-duplicated, so an instance the
/// registry advertises twice shows up twice.
#[derive(Clone, Default)]
pub struct AddressCache {
    services: Arc<RwLock<HashMap<String, Vec<Address>>>>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append addresses under a raw cache key
    pub async fn append<I>(&self, key: &str, addresses: I) -> usize
    where
        I: IntoIterator<Item = Address>,
    {
        let mut services = self.services.write().await;
        let entry = services.entry(key.to_string()).or_default();
        let before = entry.len();
        entry.extend(addresses);
        let added = entry.len() - before;

        debug!(service = %key, added, total = entry.len(), "Cached vendor addresses");
        added
    }

    /// Replace the whole address set for a service.
    ///
    /// Extension point for registries that push authoritative snapshots;
    /// the session dispatcher never calls it.
    pub async fn replace(&self, identity: &ServiceIdentity, addresses: Vec<Address>) {
        let key = identity.key();
        let mut services = self.services.write().await;
        debug!(service = %key, total = addresses.len(), "Replaced vendor addresses");
        services.insert(key, addresses);
    }

    /// All known addresses for a service, empty when never advertised
    pub async fn get(&self, identity: &ServiceIdentity) -> Vec<Address> {
        self.get_by_key(&identity.key()).await
    }

    /// Lookup under a raw cache key
    pub async fn get_by_key(&self, key: &str) -> Vec<Address> {
        let services = self.services.read().await;
        services.get(key).cloned().unwrap_or_default()
    }

    /// Keys with at least one cached entry
    pub async fn keys(&self) -> Vec<String> {
        let services = self.services.read().await;
        services.keys().cloned().collect()
    }

    /// Get count of cached services
    pub async fn service_count(&self) -> usize {
        let services = self.services.read().await;
        services.len()
    }
}
