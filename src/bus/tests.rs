//! Bus Module Tests

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::{BusError, MemoryBus, MessageBus};

fn collector(
    bus: &MemoryBus,
    topic: &str,
    message_type: &str,
) -> (super::SubscriptionHandle, Arc<Mutex<Vec<Bytes>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = bus
        .subscribe(topic, message_type, 1, Arc::new(move |payload| sink.lock().push(payload)))
        .unwrap();
    (sub, seen)
}

#[test]
fn test_publish_reaches_subscriber() {
    let bus = MemoryBus::new();
    let (_sub, seen) = collector(&bus, "test/topic", "std_msgs/String");

    let publisher = bus.advertise("test/topic", "std_msgs/String", 1).unwrap();
    publisher.publish(Bytes::from_static(b"hello"));

    assert_eq!(seen.lock().as_slice(), &[Bytes::from_static(b"hello")]);
}

#[test]
fn test_publish_without_subscribers_is_dropped() {
    let bus = MemoryBus::new();
    let publisher = bus.advertise("lonely", "std_msgs/String", 1).unwrap();
    // No panic, no error: delivery is best-effort.
    publisher.publish(Bytes::from_static(b"void"));
}

#[test]
fn test_per_topic_ordering() {
    let bus = MemoryBus::new();
    let (_sub, seen) = collector(&bus, "ordered", "std_msgs/String");
    let publisher = bus.advertise("ordered", "std_msgs/String", 1).unwrap();

    for payload in [&b"one"[..], b"two", b"three"] {
        publisher.publish(Bytes::copy_from_slice(payload));
    }

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], Bytes::from_static(b"one"));
    assert_eq!(seen[1], Bytes::from_static(b"two"));
    assert_eq!(seen[2], Bytes::from_static(b"three"));
}

#[test]
fn test_fanout_to_multiple_subscribers() {
    let bus = MemoryBus::new();
    let (_s1, seen1) = collector(&bus, "fanout", "std_msgs/String");
    let (_s2, seen2) = collector(&bus, "fanout", "std_msgs/String");

    let publisher = bus.advertise("fanout", "std_msgs/String", 1).unwrap();
    publisher.publish(Bytes::from_static(b"both"));

    assert_eq!(seen1.lock().len(), 1);
    assert_eq!(seen2.lock().len(), 1);
}

#[test]
fn test_dropped_subscription_stops_delivery() {
    let bus = MemoryBus::new();
    let (sub, seen) = collector(&bus, "drop/me", "std_msgs/String");
    let publisher = bus.advertise("drop/me", "std_msgs/String", 1).unwrap();

    publisher.publish(Bytes::from_static(b"before"));
    drop(sub);
    publisher.publish(Bytes::from_static(b"after"));

    assert_eq!(seen.lock().as_slice(), &[Bytes::from_static(b"before")]);
}

#[test]
fn test_message_type_pinned_by_first_open() {
    let bus = MemoryBus::new();
    bus.advertise("typed", "project11_msgs/Helm", 1).unwrap();

    let err = bus.advertise("typed", "std_msgs/String", 1).unwrap_err();
    assert!(matches!(err, BusError::TypeMismatch { .. }));

    let err = bus
        .subscribe("typed", "std_msgs/String", 1, Arc::new(|_| {}))
        .unwrap_err();
    assert!(matches!(err, BusError::TypeMismatch { .. }));
}

#[test]
fn test_invalid_topic_rejected() {
    let bus = MemoryBus::new();
    assert!(matches!(
        bus.advertise("", "std_msgs/String", 1),
        Err(BusError::InvalidTopic(_))
    ));
    assert!(matches!(
        bus.subscribe("bad\0topic", "std_msgs/String", 1, Arc::new(|_| {})),
        Err(BusError::InvalidTopic(_))
    ));
}

#[test]
fn test_handler_may_republish_into_bus() {
    let bus = Arc::new(MemoryBus::new());
    let (_sink_sub, seen) = collector(&bus, "relayed", "std_msgs/String");

    let relayed = bus.advertise("relayed", "std_msgs/String", 1).unwrap();
    let _forwarder = bus
        .subscribe(
            "source",
            "std_msgs/String",
            1,
            Arc::new(move |payload| relayed.publish(payload)),
        )
        .unwrap();

    let source = bus.advertise("source", "std_msgs/String", 1).unwrap();
    source.publish(Bytes::from_static(b"through"));

    assert_eq!(seen.lock().as_slice(), &[Bytes::from_static(b"through")]);
}
