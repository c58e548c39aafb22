//! Bridge Registration Client
//!
//! Talks to the bridge advertise service over TCP with newline-delimited
//! JSON. The protocol is two explicit steps: a bounded wait for the service
//! to accept connections, then a single call. A wait timeout is only a
//! warning - the call is attempted regardless, and the caller's local
//! channels stay usable so a later bridge start can pick the route up.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::config::BridgeConfig;

use super::{BridgeError, RouteAdvertisement, RouteRegistrar};

/// Interval between availability probes while waiting for the service.
const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Client for the bridge advertise service.
pub struct BridgeClient {
    config: BridgeConfig,
}

impl BridgeClient {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Probe until the service accepts a connection or the deadline passes.
    async fn wait_for_service(&self) -> bool {
        let deadline = Instant::now() + self.config.availability_timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let probe = PROBE_INTERVAL.min(deadline - now);
            if let Ok(Ok(_)) = timeout(probe, TcpStream::connect(&self.config.address)).await {
                return true;
            }
            sleep(probe).await;
        }
    }

    /// Single advertise call: connect, send one request line, read one ack
    /// line.
    async fn call(&self, route: &RouteAdvertisement) -> Result<(), BridgeError> {
        let request = serde_json::to_string(route).map_err(|e| BridgeError::Encode(e.to_string()))?;

        let stream = timeout(
            self.config.connect_timeout,
            TcpStream::connect(&self.config.address),
        )
        .await
        .map_err(|_| BridgeError::Timeout)?
        .map_err(|e| BridgeError::ConnectionLost(e.to_string()))?;

        let (read_half, mut write_half) = stream.into_split();

        write_half
            .write_all(request.as_bytes())
            .await
            .map_err(|e| BridgeError::ConnectionLost(e.to_string()))?;
        write_half
            .write_all(b"\n")
            .await
            .map_err(|e| BridgeError::ConnectionLost(e.to_string()))?;

        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        let read = timeout(self.config.connect_timeout, reader.read_line(&mut line))
            .await
            .map_err(|_| BridgeError::Timeout)?
            .map_err(|e| BridgeError::ConnectionLost(e.to_string()))?;

        if read == 0 {
            return Err(BridgeError::ConnectionLost("connection closed".to_string()));
        }

        let ack: serde_json::Value = serde_json::from_str(line.trim())
            .map_err(|_| BridgeError::Rejected(line.trim().to_string()))?;
        if ack.get("ok").and_then(|v| v.as_bool()) == Some(true) {
            Ok(())
        } else {
            Err(BridgeError::Rejected(line.trim().to_string()))
        }
    }
}

#[async_trait]
impl RouteRegistrar for BridgeClient {
    async fn advertise_route(&self, route: &RouteAdvertisement) -> Result<(), BridgeError> {
        if !self.wait_for_service().await {
            warn!(
                "Timeout waiting for bridge advertise service at {}",
                self.config.address
            );
        }

        // Attempted regardless of the wait outcome, exactly once.
        let result = self.call(route).await;
        if result.is_ok() {
            debug!(
                "Bridge route advertised on connection '{}': {}",
                route.connection_id, route.source_topic
            );
        }
        result
    }
}
