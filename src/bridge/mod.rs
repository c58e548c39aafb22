//! Bridge Route Registration
//!
//! The bridging service carries namespaced topic traffic across the
//! constrained link; this module only declares forwarding routes to it.
//! Registration is a one-shot, at-most-once RPC: a bounded wait for the
//! service to become available, then a single best-effort call. There is no
//! acknowledgement-driven retry.

mod client;

#[cfg(test)]
mod tests;

pub use client::BridgeClient;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Connection identifier used when none is configured.
pub const DEFAULT_CONNECTION_ID: &str = "default";

/// A forwarding route declaration sent to the bridging service.
///
/// Destination and source are the same qualified topic: both sides publish
/// and subscribe on the identical namespaced path, which mirrors the topic
/// across the link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAdvertisement {
    /// Remote the route belongs to
    pub remote: String,
    /// Bridge connection carrying the route
    pub connection_id: String,
    /// Topic published on the far side
    pub destination_topic: String,
    /// Topic consumed on the near side
    pub source_topic: String,
    /// Undelivered messages kept per route, oldest dropped first
    pub queue_size: usize,
}

impl RouteAdvertisement {
    /// Mirror `qualified_topic` across the link for `remote`.
    pub fn mirror(
        remote: &str,
        connection_id: &str,
        qualified_topic: &str,
        queue_size: usize,
    ) -> Self {
        Self {
            remote: remote.to_string(),
            connection_id: connection_id.to_string(),
            destination_topic: qualified_topic.to_string(),
            source_topic: qualified_topic.to_string(),
            queue_size,
        }
    }
}

/// Error type for bridge registration
#[derive(Debug)]
pub enum BridgeError {
    /// Connection to the service failed or was lost
    ConnectionLost(String),
    /// Service answered with something other than an acknowledgement
    Rejected(String),
    /// Call timed out
    Timeout,
    /// Request could not be encoded
    Encode(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),
            BridgeError::Rejected(msg) => write!(f, "Rejected: {}", msg),
            BridgeError::Timeout => write!(f, "Operation timed out"),
            BridgeError::Encode(msg) => write!(f, "Encode error: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Declares forwarding routes to the external bridging service.
///
/// Implemented by [`BridgeClient`] for the TCP advertise service; tests
/// substitute recording implementations.
#[async_trait]
pub trait RouteRegistrar: Send + Sync {
    /// Declare one forwarding route. At-most-once: implementations must not
    /// retry, and callers treat failure as non-fatal.
    async fn advertise_route(&self, route: &RouteAdvertisement) -> Result<(), BridgeError>;
}
