//! Registry session: registration, subscription and inbound dispatch

use crate::packet::{registration_packet, subscription_packet, unique_hex};
use crate::{
    Address, AddressCache, AssignmentTable, Connection, ConnectionFactory, CoreError,
    PendingRequests, RegistrationListener, Result, ServiceIdentity, SessionConfig, Vendor,
};
use registry_api::{AdvertisedVendor, Record, RegisteredParams, TYPE_REGISTERED};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle of a session. There is no way back to `Unregistered`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No register packet sent yet
    Unregistered,
    /// Register packet sent, waiting for the registry's `registered` reply
    Registering,
    /// Registry acknowledged; pushes keep updating the cache
    Registered,
}

/// The local node's own identity once it has registered
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationState {
    pub identity: ServiceIdentity,
    /// Minted client-side by the first register call, reused afterwards
    pub node_id: String,
}

/// RegistrySession registers the local service, keeps the vendor address
/// cache current from registry pushes, and answers lookups.
pub struct RegistrySession {
    factory: Arc<dyn ConnectionFactory>,
    listener: Arc<dyn RegistrationListener>,
    config: SessionConfig,
    connection: RwLock<Option<Arc<dyn Connection>>>,
    registration: RwLock<Option<RegistrationState>>,
    state: Mutex<SessionState>,
    vendors: RwLock<Vec<Vendor>>,
    addresses: AddressCache,
    assignments: AssignmentTable,
    pending: PendingRequests,
}

impl RegistrySession {
    /// Create a session with default configuration
    pub fn new(
        factory: Arc<dyn ConnectionFactory>,
        listener: Arc<dyn RegistrationListener>,
    ) -> Self {
        Self::with_config(factory, listener, SessionConfig::default())
    }

    pub fn with_config(
        factory: Arc<dyn ConnectionFactory>,
        listener: Arc<dyn RegistrationListener>,
        config: SessionConfig,
    ) -> Self {
        Self {
            factory,
            listener,
            config,
            connection: RwLock::new(None),
            registration: RwLock::new(None),
            state: Mutex::new(SessionState::Unregistered),
            vendors: RwLock::new(Vec::new()),
            addresses: AddressCache::new(),
            assignments: AssignmentTable::new(),
            pending: PendingRequests::new(),
        }
    }

    /// Establish the registry connection and start dispatching inbound records.
    ///
    /// The returned task ends when the connection closes. Calling this again
    /// swaps in a fresh connection; follow it with `register` to recover.
    pub async fn connect(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        let link = self.factory.connect().await?;
        *self.connection.write().await = Some(link.connection);
        info!("Connected to registry");

        let session = Arc::clone(self);
        let mut inbound = link.inbound;
        Ok(tokio::spawn(async move {
            while let Some(record) = inbound.recv().await {
                session.receive(record).await;
            }
            info!("Registry connection closed");
        }))
    }

    async fn connection(&self) -> Result<Arc<dyn Connection>> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)
    }

    /// Register the local service and subscribe to its vendors' events.
    ///
    /// Sends one `register` packet then one `subscribe` packet and returns
    /// without waiting for the registry. Completion is signalled through the
    /// [`RegistrationListener`] when the `registered` reply arrives.
    ///
    /// Registering again with the same identity (after a reconnect, say)
    /// reuses the node id and leaves the address cache untouched.
    pub async fn register(
        &self,
        vendors: Vec<Vendor>,
        ip: &str,
        port: u16,
        app: &str,
        service: &str,
        version: &str,
    ) -> Result<()> {
        let connection = self.connection().await?;
        let identity = ServiceIdentity::new(app, service, version);

        let node_id = {
            let mut registration = self.registration.write().await;
            match registration.as_ref() {
                Some(existing) if existing.identity == identity => existing.node_id.clone(),
                Some(existing) => {
                    return Err(CoreError::IdentityMismatch {
                        registered: existing.identity.key(),
                        requested: identity.key(),
                    });
                }
                None => {
                    let node_id = unique_hex();
                    *registration = Some(RegistrationState {
                        identity: identity.clone(),
                        node_id: node_id.clone(),
                    });
                    node_id
                }
            }
        };

        *self.vendors.write().await = vendors.clone();
        *self.state.lock().await = SessionState::Registering;

        let packet = registration_packet(&identity, ip, port, &node_id, &vendors)?;
        debug!(pid = ?packet.pid, service = %identity, "Sending register packet");
        connection.send(packet).await?;

        let packet = subscription_packet(ip, port, &vendors)?;
        debug!(pid = ?packet.pid, ip = %ip, port, "Sending subscribe packet");
        connection.send(packet).await?;

        info!(
            service = %identity,
            node_id = %node_id,
            vendors = vendors.len(),
            "Registration requested"
        );
        Ok(())
    }

    /// Handle one decoded record from the registry.
    ///
    /// Replies to pending requests go to their waiter. A `registered` record
    /// feeds the address cache; every other type is left to other handlers.
    pub async fn receive(&self, record: Record) {
        let Some(record) = self.pending.complete(record) else {
            return;
        };

        if record.is(TYPE_REGISTERED) {
            self.on_registered(&record).await;
        } else {
            debug!(kind = %record.kind, "Ignoring registry record");
        }
    }

    async fn on_registered(&self, record: &Record) {
        let params: RegisteredParams = match record.params_as() {
            Ok(params) => params,
            Err(e) => {
                warn!("Dropping malformed registered record: {}", e);
                return;
            }
        };

        self.cache_vendors(params.vendors).await;

        let first = {
            let mut state = self.state.lock().await;
            let first = *state == SessionState::Registering;
            if first {
                *state = SessionState::Registered;
            }
            first
        };

        if first {
            info!("Registration complete");
            self.listener.registration_complete();
        }
    }

    /// Append every advertised address to the cache, in arrival order
    async fn cache_vendors(&self, vendors: Vec<AdvertisedVendor>) {
        for vendor in vendors {
            let key = self.vendor_key(&vendor.name).await;
            self.addresses
                .append(&key, vendor.addresses.into_iter().map(Address::from))
                .await;
        }
    }

    /// Map an advertised vendor name onto a cache key.
    ///
    /// Full `app/service/version` names are used as-is. Bare service names
    /// resolve through the vendors declared at registration.
    async fn vendor_key(&self, name: &str) -> String {
        if ServiceIdentity::parse_key(name).is_some() {
            return name.to_string();
        }

        let vendors = self.vendors.read().await;
        match vendors.iter().find(|v| v.identity().service == name) {
            Some(vendor) => vendor.identity().key(),
            None => {
                debug!(vendor = %name, "Advertised vendor was not declared, caching under its name");
                name.to_string()
            }
        }
    }

    /// Every address advertised for a service, empty when none are known
    pub async fn get_all_addresses(&self, identity: &ServiceIdentity) -> Vec<Address> {
        self.addresses.get(identity).await
    }

    /// The value the registry assigned to `entity` for a service, if any
    pub async fn resolve(&self, app: &str, service: &str, version: &str, entity: &str) -> Option<Value> {
        self.assignments.resolve(app, service, version, entity).await
    }

    /// Overwrite the address set of one vendor.
    ///
    /// Not used by the dispatcher, which only appends.
    pub async fn replace_addresses(&self, identity: &ServiceIdentity, addresses: Vec<Address>) {
        self.addresses.replace(identity, addresses).await;
    }

    /// Send a record and wait for the reply carrying the same pid.
    ///
    /// A pid is minted when the record has none. The waiter is registered
    /// before sending and removed on send failure or timeout.
    pub async fn request(&self, mut record: Record) -> Result<Record> {
        let connection = self.connection().await?;
        let pid = record.pid.get_or_insert_with(unique_hex).clone();
        let rx = self.pending.insert(&pid)?;

        if let Err(e) = connection.send(record).await {
            self.pending.cancel(&pid);
            return Err(e);
        }

        self.pending.wait(&pid, rx, self.config.request_timeout).await
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    pub async fn registration(&self) -> Option<RegistrationState> {
        self.registration.read().await.clone()
    }

    pub fn addresses(&self) -> &AddressCache {
        &self.addresses
    }

    pub fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }
}
