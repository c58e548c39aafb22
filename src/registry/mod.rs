//! Remote Registry
//!
//! Owns the per-remote state: outbound publisher handles and inbound
//! subscription handles keyed by logical topic. Entries are created once
//! per configured remote and never removed; a handle is only stored after
//! its channel is open and its bridge registration has been attempted, so
//! the maps never contain an unset handle.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::bus::{PublisherHandle, SubscriptionHandle};

/// A named peer endpoint with its namespaced channel handles.
pub struct Remote {
    name: String,
    publishers: HashMap<String, PublisherHandle>,
    subscriptions: HashMap<String, SubscriptionHandle>,
}

impl Remote {
    fn new(name: String) -> Self {
        Self {
            name,
            publishers: HashMap::new(),
            subscriptions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an outbound channel is registered for `logical`.
    pub fn has_publisher(&self, logical: &str) -> bool {
        self.publishers.contains_key(logical)
    }

    /// Whether an inbound channel is registered for `logical`.
    pub fn has_subscription(&self, logical: &str) -> bool {
        self.subscriptions.contains_key(logical)
    }
}

/// Registry of all configured remotes, keyed by unique name.
///
/// Effectively read-only after startup; the lock makes dynamic remote
/// addition safe against concurrent relay lookups.
pub struct RemoteRegistry {
    remotes: RwLock<HashMap<String, Remote>>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self {
            remotes: RwLock::new(HashMap::new()),
        }
    }

    /// Ensure an entry exists for `name`. Idempotent, always succeeds.
    pub fn get_or_create(&self, name: &str) {
        let mut remotes = self.remotes.write();
        if !remotes.contains_key(name) {
            remotes.insert(name.to_string(), Remote::new(name.to_string()));
        }
    }

    pub(crate) fn insert_publisher(&self, remote: &str, logical: &str, handle: PublisherHandle) {
        let mut remotes = self.remotes.write();
        remotes
            .entry(remote.to_string())
            .or_insert_with(|| Remote::new(remote.to_string()))
            .publishers
            .insert(logical.to_string(), handle);
    }

    pub(crate) fn insert_subscription(
        &self,
        remote: &str,
        logical: &str,
        handle: SubscriptionHandle,
    ) {
        let mut remotes = self.remotes.write();
        remotes
            .entry(remote.to_string())
            .or_insert_with(|| Remote::new(remote.to_string()))
            .subscriptions
            .insert(logical.to_string(), handle);
    }

    /// Publish `payload` on `remote`'s outbound channel for `logical`.
    ///
    /// Returns false when the remote or the channel is not registered; the
    /// message is dropped in that case.
    pub fn publish(&self, remote: &str, logical: &str, payload: Bytes) -> bool {
        // Clone the handle out so the lock is not held while publishing.
        let publisher = {
            let remotes = self.remotes.read();
            remotes
                .get(remote)
                .and_then(|r| r.publishers.get(logical))
                .cloned()
        };

        match publisher {
            Some(publisher) => {
                publisher.publish(payload);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.remotes.read().contains_key(name)
    }

    pub fn has_publisher(&self, remote: &str, logical: &str) -> bool {
        self.remotes
            .read()
            .get(remote)
            .is_some_and(|r| r.has_publisher(logical))
    }

    pub fn has_subscription(&self, remote: &str, logical: &str) -> bool {
        self.remotes
            .read()
            .get(remote)
            .is_some_and(|r| r.has_subscription(logical))
    }

    pub fn len(&self) -> usize {
        self.remotes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.read().is_empty()
    }

    /// Names of all registered remotes.
    pub fn remote_names(&self) -> Vec<String> {
        self.remotes.read().keys().cloned().collect()
    }
}

impl Default for RemoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
