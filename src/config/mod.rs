//! Configuration Module
//!
//! Provides TOML-based configuration for the remote manager with support
//! for:
//! - Relay settings (initial active remote, relayed topics)
//! - Bridge advertise service settings
//! - Logging
//! - Environment variable overrides (REMOTE_MANAGER__* prefix)

use std::path::Path;
use std::time::Duration;

use config::{Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;

use crate::topic;


/// Substitute environment variables in a string.
/// Supports `${VAR}` and `${VAR:-default}` syntax.
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").unwrap();
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
    /// Config crate error
    Config(config::ConfigError),
    /// Validation error
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Config(e) => write!(f, "Config error: {}", e),
            ConfigError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Config(e)
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,
    /// Relay configuration
    pub relay: RelayConfig,
    /// Bridge advertise service configuration
    pub bridge: BridgeConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// A relayed channel: logical topic plus its payload type tag.
///
/// The type tag is opaque to the relay and passed through to the bus, which
/// pins each channel to the first type it sees.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicSpec {
    /// Logical topic name, identical on the local side and, qualified, on
    /// each remote's side
    pub topic: String,
    /// Channel payload type tag
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

impl TopicSpec {
    pub fn new(topic: impl Into<String>, message_type: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message_type: message_type.into(),
        }
    }
}

fn default_message_type() -> String {
    "std_msgs/String".to_string()
}

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Initial active remote
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Topics forwarded local -> remote
    #[serde(default = "default_outbound")]
    pub outbound: Vec<TopicSpec>,
    /// Topics relayed remote -> local
    #[serde(default = "default_inbound")]
    pub inbound: Vec<TopicSpec>,
    /// Bridge connection the forwarding routes are declared under
    #[serde(default = "default_connection_id")]
    pub connection_id: String,
    /// Undelivered messages kept per route; 1 = latest value only
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

fn default_remote() -> String {
    "robot".to_string()
}

fn default_connection_id() -> String {
    crate::bridge::DEFAULT_CONNECTION_ID.to_string()
}

fn default_queue_size() -> usize {
    1
}

fn default_outbound() -> Vec<TopicSpec> {
    vec![
        TopicSpec::new("project11/piloting_mode/manual/helm", "project11_msgs/Helm"),
        TopicSpec::new("project11/command", "std_msgs/String"),
    ]
}

fn default_inbound() -> Vec<TopicSpec> {
    vec![TopicSpec::new("project11/response", "std_msgs/String")]
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            outbound: default_outbound(),
            inbound: default_inbound(),
            connection_id: default_connection_id(),
            queue_size: default_queue_size(),
        }
    }
}

/// Bridge advertise service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Advertise service address (host:port)
    #[serde(default = "default_bridge_address")]
    pub address: String,
    /// Bounded wait for the service to become available
    #[serde(with = "humantime_serde", default = "default_availability_timeout")]
    pub availability_timeout: Duration,
    /// Per-call connect and read timeout
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

fn default_bridge_address() -> String {
    "127.0.0.1:18700".to_string()
}

fn default_availability_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(2)
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: default_bridge_address(),
            availability_timeout: default_availability_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file with environment variable
    /// overrides.
    ///
    /// Supports two forms of environment variable usage:
    /// 1. In-file substitution: `${VAR}` or `${VAR:-default}` syntax in the
    ///    TOML file
    /// 2. Override via env vars: `REMOTE_MANAGER__` prefix with double
    ///    underscores for nesting:
    ///    - `REMOTE_MANAGER__RELAY__REMOTE=boat` overrides `relay.remote`
    ///    - `REMOTE_MANAGER__BRIDGE__ADDRESS=10.0.0.1:18700` overrides
    ///      `bridge.address`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            // Start with defaults
            .set_default("log.level", "info")?
            .set_default("relay.remote", "robot")?
            .set_default("relay.connection_id", "default")?
            .set_default("relay.queue_size", 1)?
            .set_default("bridge.address", "127.0.0.1:18700")?
            .set_default("bridge.availability_timeout", "5s")?
            .set_default("bridge.connect_timeout", "2s")?;

        // Load from file with env var substitution
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let substituted = substitute_env_vars(&content);
                builder = builder.add_source(File::from_str(&substituted, FileFormat::Toml));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File doesn't exist, use defaults
            }
            Err(e) => return Err(ConfigError::Io(e)),
        }

        // Override with environment variables (REMOTE_MANAGER__RELAY__REMOTE, etc.)
        // Double underscore separates nested keys, single underscore preserved in field names
        let cfg = builder
            .add_source(
                Environment::with_prefix("REMOTE_MANAGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = cfg.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate names and bounds after loading or after CLI overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        topic::validate_remote_name(&self.relay.remote)
            .map_err(|e| ConfigError::Validation(format!("relay.remote: {}", e)))?;

        for spec in self.relay.outbound.iter().chain(self.relay.inbound.iter()) {
            topic::validate_logical_topic(&spec.topic)
                .map_err(|e| ConfigError::Validation(format!("topic '{}': {}", spec.topic, e)))?;
        }

        if self.relay.connection_id.is_empty() {
            return Err(ConfigError::Validation(
                "relay.connection_id cannot be empty".to_string(),
            ));
        }

        if self.relay.queue_size == 0 {
            return Err(ConfigError::Validation(
                "relay.queue_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
