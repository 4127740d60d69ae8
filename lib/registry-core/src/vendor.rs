//! Dependency declarations

use crate::ServiceIdentity;
use registry_api::SubscriptionEntry;

/// A service this node depends on.
///
/// Subscribable endpoints are the names of locally hosted operations that
/// should receive events pushed from this vendor's registry entry. They are
/// declared when the vendor is built and never discovered later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vendor {
    identity: ServiceIdentity,
    subscribe: Vec<String>,
}

impl Vendor {
    /// A plain dependency with no subscribable endpoints
    pub fn new(app: impl Into<String>, service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            identity: ServiceIdentity::new(app, service, version),
            subscribe: Vec::new(),
        }
    }

    /// Mark a local endpoint as subscribed to this vendor's events
    pub fn subscribe(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        if !self.subscribe.contains(&endpoint) {
            self.subscribe.push(endpoint);
        }
        self
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// Subscribable endpoints in declaration order
    pub fn subscribable_endpoints(&self) -> &[String] {
        &self.subscribe
    }

    /// One subscription entry per subscribable endpoint
    pub fn subscription_entries(&self) -> impl Iterator<Item = SubscriptionEntry> + '_ {
        self.subscribe.iter().map(move |endpoint| SubscriptionEntry {
            app: self.identity.app.clone(),
            service: self.identity.service.clone(),
            version: self.identity.version.clone(),
            endpoint: endpoint.clone(),
        })
    }
}

impl From<ServiceIdentity> for Vendor {
    fn from(identity: ServiceIdentity) -> Self {
        Self {
            identity,
            subscribe: Vec::new(),
        }
    }
}
