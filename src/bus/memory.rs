//! In-Process Message Bus
//!
//! Channel-backed [`MessageBus`] implementation used by the binary and the
//! test suite. Dispatch is synchronous: a publish invokes every subscriber
//! handler before returning, so per-topic ordering is the publish order and
//! the depth bound is never exceeded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::{
    BusError, MessageBus, MessageHandler, Publisher, PublisherHandle, Subscription,
    SubscriptionHandle,
};

struct Subscriber {
    id: u64,
    handler: MessageHandler,
}

/// One topic's fanout state. The message type is pinned by whichever
/// advertise or subscribe opens the channel first.
struct Channel {
    message_type: String,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl Channel {
    fn dispatch(&self, payload: Bytes) {
        // Handlers run outside the subscriber lock: a handler may publish
        // back into the bus.
        let handlers: Vec<MessageHandler> = self
            .subscribers
            .read()
            .iter()
            .map(|s| Arc::clone(&s.handler))
            .collect();
        for handler in handlers {
            handler(payload.clone());
        }
    }
}

/// In-process message bus with per-topic fanout.
pub struct MemoryBus {
    channels: DashMap<String, Arc<Channel>>,
    next_id: AtomicU64,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn channel(&self, topic: &str, message_type: &str) -> Result<Arc<Channel>, BusError> {
        if topic.is_empty() {
            return Err(BusError::InvalidTopic("topic cannot be empty"));
        }
        if topic.contains('\0') {
            return Err(BusError::InvalidTopic("topic cannot contain null character"));
        }

        let channel = self
            .channels
            .entry(topic.to_string())
            .or_insert_with(|| {
                Arc::new(Channel {
                    message_type: message_type.to_string(),
                    subscribers: RwLock::new(Vec::new()),
                })
            })
            .clone();

        if channel.message_type != message_type {
            return Err(BusError::TypeMismatch {
                topic: topic.to_string(),
                registered: channel.message_type.clone(),
                requested: message_type.to_string(),
            });
        }

        Ok(channel)
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryPublisher {
    topic: String,
    channel: Arc<Channel>,
}

impl Publisher for MemoryPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn publish(&self, payload: Bytes) {
        self.channel.dispatch(payload);
    }
}

struct MemorySubscription {
    topic: String,
    id: u64,
    channel: Arc<Channel>,
}

impl Subscription for MemorySubscription {
    fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        self.channel.subscribers.write().retain(|s| s.id != self.id);
    }
}

impl MessageBus for MemoryBus {
    fn advertise(
        &self,
        topic: &str,
        message_type: &str,
        _depth: usize,
    ) -> Result<PublisherHandle, BusError> {
        let channel = self.channel(topic, message_type)?;
        Ok(Arc::new(MemoryPublisher {
            topic: topic.to_string(),
            channel,
        }))
    }

    fn subscribe(
        &self,
        topic: &str,
        message_type: &str,
        _depth: usize,
        handler: MessageHandler,
    ) -> Result<SubscriptionHandle, BusError> {
        let channel = self.channel(topic, message_type)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        channel.subscribers.write().push(Subscriber { id, handler });
        Ok(Box::new(MemorySubscription {
            topic: topic.to_string(),
            id,
            channel,
        }))
    }
}
