//! Remote Manager - topic relay between a local bus and bridged remote peers
//!
//! Forwards selected control topics from the local message bus to the
//! currently active remote's mirrored topic namespace, registering each
//! forwarding route with an external bridging service, and re-publishes the
//! remote's inbound traffic locally while that remote stays active.

pub mod bridge;
pub mod bus;
pub mod config;
pub mod gate;
pub mod registry;
pub mod relay;
pub mod topic;

pub use bridge::{BridgeClient, BridgeError, RouteAdvertisement, RouteRegistrar};
pub use bus::{MemoryBus, MessageBus};
pub use config::{Config, RelayConfig};
pub use gate::ActiveRemote;
pub use registry::{Remote, RemoteRegistry};
pub use relay::{RelayError, RemoteManager};
