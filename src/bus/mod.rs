//! Local Message Bus Abstraction
//!
//! The relay core is transport-agnostic: it talks to the local bus through
//! the [`MessageBus`] trait and holds on to the publisher and subscription
//! handles the bus returns. Payloads are opaque - the relay never inspects
//! message content beyond routing by topic identity.

mod memory;

#[cfg(test)]
mod tests;

pub use memory::MemoryBus;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

/// Callback invoked once per message delivered on a subscribed channel.
pub type MessageHandler = Arc<dyn Fn(Bytes) + Send + Sync>;

/// Error type for bus operations
#[derive(Debug)]
pub enum BusError {
    /// Topic name rejected by validation
    InvalidTopic(&'static str),
    /// Channel already open with a different message type
    TypeMismatch {
        topic: String,
        registered: String,
        requested: String,
    },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::InvalidTopic(msg) => write!(f, "Invalid topic: {}", msg),
            BusError::TypeMismatch {
                topic,
                registered,
                requested,
            } => write!(
                f,
                "Type mismatch on '{}': registered as {}, requested {}",
                topic, registered, requested
            ),
        }
    }
}

impl std::error::Error for BusError {}

/// Outbound channel handle bound to a single topic.
pub trait Publisher: Send + Sync {
    /// Topic this handle publishes on
    fn topic(&self) -> &str;

    /// Publish a payload. Delivery is best-effort: with no subscribers the
    /// message is dropped.
    fn publish(&self, payload: Bytes);
}

/// Inbound channel handle. Dropping it cancels delivery.
pub trait Subscription: Send + Sync {
    /// Topic this handle is subscribed to
    fn topic(&self) -> &str;
}

impl fmt::Debug for dyn Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher").field("topic", &self.topic()).finish()
    }
}

impl fmt::Debug for dyn Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("topic", &self.topic()).finish()
    }
}

/// Shared outbound handle stored in registries and captured by callbacks.
pub type PublisherHandle = Arc<dyn Publisher>;

/// Owned inbound handle; kept alive for the lifetime of the subscription.
pub type SubscriptionHandle = Box<dyn Subscription>;

/// Local publish/subscribe transport.
///
/// `depth` bounds undelivered messages per channel: only the most recent
/// `depth` are kept, oldest dropped first. Depth 1 gives latest-value
/// semantics. The first advertise or subscribe on a topic pins its message
/// type; later calls with a different type are rejected.
pub trait MessageBus: Send + Sync {
    /// Open an outbound channel on `topic`.
    fn advertise(
        &self,
        topic: &str,
        message_type: &str,
        depth: usize,
    ) -> Result<PublisherHandle, BusError>;

    /// Open a subscription on `topic`; `handler` runs once per message, in
    /// the order messages are published on the topic.
    fn subscribe(
        &self,
        topic: &str,
        message_type: &str,
        depth: usize,
        handler: MessageHandler,
    ) -> Result<SubscriptionHandle, BusError>;
}
