//! Bridge Module Tests

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::config::BridgeConfig;

use super::{BridgeClient, BridgeError, RouteAdvertisement, RouteRegistrar, DEFAULT_CONNECTION_ID};

// Atomic port counter to avoid port conflicts between tests
static PORT_COUNTER: AtomicU16 = AtomicU16::new(20500);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

fn test_config(port: u16) -> BridgeConfig {
    BridgeConfig {
        address: format!("127.0.0.1:{}", port),
        availability_timeout: Duration::from_millis(500),
        connect_timeout: Duration::from_millis(500),
    }
}

/// Fake advertise service: records every request and answers with `ack`.
async fn spawn_fake_service(port: u16, ack: &'static str) -> Arc<Mutex<Vec<RouteAdvertisement>>> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("Failed to bind fake bridge service");
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let (read_half, mut write_half) = stream.into_split();
            let mut line = String::new();
            if BufReader::new(read_half).read_line(&mut line).await.is_ok() {
                if let Ok(route) = serde_json::from_str::<RouteAdvertisement>(line.trim()) {
                    sink.lock().push(route);
                }
                let _ = write_half.write_all(ack.as_bytes()).await;
            }
        }
    });

    received
}

#[test]
fn test_mirror_uses_qualified_topic_on_both_sides() {
    let route = RouteAdvertisement::mirror("robot", DEFAULT_CONNECTION_ID, "/robot/project11/command", 1);

    assert_eq!(route.remote, "robot");
    assert_eq!(route.connection_id, "default");
    assert_eq!(route.destination_topic, "/robot/project11/command");
    assert_eq!(route.source_topic, "/robot/project11/command");
    assert_eq!(route.queue_size, 1);
}

#[test]
fn test_advertisement_wire_fields() {
    let route = RouteAdvertisement::mirror("robot", "default", "/robot/project11/response", 1);
    let value = serde_json::to_value(&route).unwrap();

    assert_eq!(value["remote"], "robot");
    assert_eq!(value["connection_id"], "default");
    assert_eq!(value["destination_topic"], "/robot/project11/response");
    assert_eq!(value["source_topic"], "/robot/project11/response");
    assert_eq!(value["queue_size"], 1);
}

#[tokio::test]
async fn test_advertise_route_acknowledged() {
    let port = next_port();
    let received = spawn_fake_service(port, "{\"ok\":true}\n").await;

    let client = BridgeClient::new(test_config(port));
    let route = RouteAdvertisement::mirror("robot", "default", "/robot/project11/command", 1);
    client.advertise_route(&route).await.unwrap();

    let received = received.lock();
    assert_eq!(received.as_slice(), &[route]);
}

#[tokio::test]
async fn test_advertise_route_rejected_ack() {
    let port = next_port();
    let _received = spawn_fake_service(port, "{\"ok\":false}\n").await;

    let client = BridgeClient::new(test_config(port));
    let route = RouteAdvertisement::mirror("robot", "default", "/robot/project11/command", 1);
    let err = client.advertise_route(&route).await.unwrap_err();

    assert!(matches!(err, BridgeError::Rejected(_)));
}

#[tokio::test]
async fn test_advertise_route_service_unavailable() {
    // Nothing listening on the port: the bounded wait expires, the single
    // call still goes out and fails, and the error is recoverable.
    let port = next_port();
    let config = BridgeConfig {
        address: format!("127.0.0.1:{}", port),
        availability_timeout: Duration::from_millis(50),
        connect_timeout: Duration::from_millis(100),
    };

    let client = BridgeClient::new(config);
    let route = RouteAdvertisement::mirror("robot", "default", "/robot/project11/command", 1);

    let start = Instant::now();
    let err = client.advertise_route(&route).await.unwrap_err();

    assert!(matches!(err, BridgeError::ConnectionLost(_) | BridgeError::Timeout));
    // Bounded: availability wait plus one connect attempt, no retry loop.
    assert!(start.elapsed() < Duration::from_secs(2));
}
