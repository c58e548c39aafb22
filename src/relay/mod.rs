//! Relay Dispatch
//!
//! Wires local inbound messages to the active remote's namespaced outbound
//! channels, and remote inbound messages back onto the local bus, subject
//! to the active-remote gate. Lookup misses on the relay path (unknown
//! remote, unregistered channel, inactive remote) drop the message without
//! an error: they occur transiently during startup ordering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::bridge::{RouteAdvertisement, RouteRegistrar};
use crate::bus::{BusError, MessageBus, PublisherHandle, SubscriptionHandle};
use crate::config::RelayConfig;
use crate::gate::ActiveRemote;
use crate::registry::RemoteRegistry;
use crate::topic;

/// Channel depth for every relay channel: latest value only.
const RELAY_DEPTH: usize = 1;

/// Error type for relay setup
#[derive(Debug)]
pub enum RelayError {
    /// Remote or topic name rejected by validation
    InvalidName(&'static str),
    /// Bus refused a channel
    Bus(BusError),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::InvalidName(msg) => write!(f, "Invalid name: {}", msg),
            RelayError::Bus(e) => write!(f, "Bus error: {}", e),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<BusError> for RelayError {
    fn from(e: BusError) -> Self {
        RelayError::Bus(e)
    }
}

/// The routing core: remote registry, active-remote gate, and the local
/// publication table, wired to a bus and a bridge registrar.
pub struct RemoteManager {
    bus: Arc<dyn MessageBus>,
    registrar: Arc<dyn RouteRegistrar>,
    registry: Arc<RemoteRegistry>,
    gate: Arc<ActiveRemote>,
    local_publishers: Arc<RwLock<HashMap<String, PublisherHandle>>>,
    local_subscriptions: RwLock<Vec<SubscriptionHandle>>,
    config: RelayConfig,
}

impl RemoteManager {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        registrar: Arc<dyn RouteRegistrar>,
        config: RelayConfig,
    ) -> Self {
        Self {
            bus,
            registrar,
            registry: Arc::new(RemoteRegistry::new()),
            gate: Arc::new(ActiveRemote::new(config.remote.clone())),
            local_publishers: Arc::new(RwLock::new(HashMap::new())),
            local_subscriptions: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Wire the whole relay: local channels first, then the initial active
    /// remote's namespaced channels.
    pub async fn setup(&self) -> Result<(), RelayError> {
        topic::validate_remote_name(&self.config.remote).map_err(RelayError::InvalidName)?;
        for spec in self.config.outbound.iter().chain(self.config.inbound.iter()) {
            topic::validate_logical_topic(&spec.topic).map_err(RelayError::InvalidName)?;
        }

        // Local side: the channels the inbound relay feeds...
        for spec in &self.config.inbound {
            self.advertise_local(&spec.topic, &spec.message_type)?;
        }
        // ...and the channels the outbound relay consumes.
        for spec in &self.config.outbound {
            self.subscribe_local(&spec.topic, &spec.message_type)?;
        }

        // Remote side for the initial active remote.
        let remote = self.gate.current();
        self.registry.get_or_create(&remote);
        for spec in &self.config.outbound {
            self.register_outbound(&remote, &spec.topic, &spec.message_type)
                .await?;
        }
        for spec in &self.config.inbound {
            self.register_inbound(&remote, &spec.topic, &spec.message_type)?;
        }

        info!(
            "Relay ready: remote '{}', {} outbound, {} inbound",
            remote,
            self.config.outbound.len(),
            self.config.inbound.len()
        );
        Ok(())
    }

    /// Open a local publication channel the inbound relay can feed.
    fn advertise_local(&self, logical: &str, message_type: &str) -> Result<(), RelayError> {
        let handle = self.bus.advertise(logical, message_type, RELAY_DEPTH)?;
        self.local_publishers
            .write()
            .insert(logical.to_string(), handle);
        Ok(())
    }

    /// Subscribe to a local channel and forward it to whichever remote is
    /// active when each message arrives.
    fn subscribe_local(&self, logical: &str, message_type: &str) -> Result<(), RelayError> {
        let registry = Arc::clone(&self.registry);
        let gate = Arc::clone(&self.gate);
        let topic_name = logical.to_string();

        let handle = self.bus.subscribe(
            logical,
            message_type,
            RELAY_DEPTH,
            Arc::new(move |payload| {
                // Unknown remote or unregistered channel drops the message.
                registry.publish(&gate.current(), &topic_name, payload);
            }),
        )?;

        self.local_subscriptions.write().push(handle);
        Ok(())
    }

    /// Open `remote`'s outbound channel for `logical` and declare the
    /// forwarding route with the bridge.
    pub async fn register_outbound(
        &self,
        remote: &str,
        logical: &str,
        message_type: &str,
    ) -> Result<(), RelayError> {
        let qualified = topic::qualify(remote, logical);
        let handle = self.bus.advertise(&qualified, message_type, RELAY_DEPTH)?;

        let route = RouteAdvertisement::mirror(
            remote,
            &self.config.connection_id,
            &qualified,
            self.config.queue_size,
        );
        if let Err(e) = self.registrar.advertise_route(&route).await {
            // Best-effort: the channel stays registered so a later bridge
            // start can carry it.
            warn!("Bridge registration for '{}' failed: {}", qualified, e);
        }

        self.registry.insert_publisher(remote, logical, handle);
        Ok(())
    }

    /// Open a subscription on `remote`'s namespaced channel for `logical`.
    /// Messages are re-published locally only while `remote` is active.
    pub fn register_inbound(
        &self,
        remote: &str,
        logical: &str,
        message_type: &str,
    ) -> Result<(), RelayError> {
        let qualified = topic::qualify(remote, logical);

        let gate = Arc::clone(&self.gate);
        let local_publishers = Arc::clone(&self.local_publishers);
        // Owned copies: the handler must not alias registry storage.
        let remote_name = remote.to_string();
        let topic_name = logical.to_string();

        let handle = self.bus.subscribe(
            &qualified,
            message_type,
            RELAY_DEPTH,
            Arc::new(move |payload| {
                if !gate.is_active(&remote_name) {
                    return;
                }
                let publisher = local_publishers.read().get(&topic_name).cloned();
                if let Some(publisher) = publisher {
                    publisher.publish(payload);
                }
            }),
        )?;

        self.registry.insert_subscription(remote, logical, handle);
        Ok(())
    }

    /// Switch the active remote. Takes effect for the next message in both
    /// directions; open channels are untouched.
    pub fn set_active(&self, remote: &str) {
        info!("Active remote set to '{}'", remote);
        self.gate.set(remote);
    }

    /// Name of the currently active remote.
    pub fn active_remote(&self) -> String {
        self.gate.current()
    }

    pub fn registry(&self) -> &Arc<RemoteRegistry> {
        &self.registry
    }

    pub fn gate(&self) -> &Arc<ActiveRemote> {
        &self.gate
    }
}
