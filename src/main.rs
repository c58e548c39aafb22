//! Remote Manager - topic relay between a local bus and bridged remotes
//!
//! Usage:
//!   remote-manager [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>    Configuration file path
//!   -r, --remote <NAME>    Initial active remote (default: robot)
//!   --bridge-addr <ADDR>   Bridge advertise service address
//!   -l, --log-level        Log level (error, warn, info, debug, trace)
//!   -h, --help             Print help

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use remote_manager::bridge::BridgeClient;
use remote_manager::bus::MemoryBus;
use remote_manager::config::Config;
use remote_manager::relay::RemoteManager;

/// Log level for CLI
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
    /// Trace messages (very verbose)
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Remote Manager - bidirectional topic relay for bridged remote peers
#[derive(Parser, Debug)]
#[command(name = "remote-manager")]
#[command(version = "0.1.0")]
#[command(about = "Bidirectional topic relay between a local message bus and bridged remote peers")]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial active remote (overrides config)
    #[arg(short, long)]
    remote: Option<String>,

    /// Bridge advertise service address (overrides config)
    #[arg(long)]
    bridge_addr: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration file if specified, otherwise use defaults
    let mut config = if let Some(config_path) = &args.config {
        match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error loading config file: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Setup logging - CLI overrides config, config overrides default (info)
    let log_level = args.log_level.unwrap_or_else(|| {
        match config.log.level.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    });

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level.to_tracing_level())
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(path) = &args.config {
        info!("Loaded configuration from {:?}", path);
    }

    // CLI args override file config
    if let Some(remote) = args.remote {
        config.relay.remote = remote;
    }
    if let Some(addr) = args.bridge_addr {
        config.bridge.address = addr;
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("Starting Remote Manager");
    info!("  Active remote: {}", config.relay.remote);
    info!("  Bridge advertise service: {}", config.bridge.address);
    info!("  Bridge connection: {}", config.relay.connection_id);
    for spec in &config.relay.outbound {
        info!("    {} -> /{}/{}", spec.topic, config.relay.remote, spec.topic);
    }
    for spec in &config.relay.inbound {
        info!("    /{}/{} -> {}", config.relay.remote, spec.topic, spec.topic);
    }

    let bus = Arc::new(MemoryBus::new());
    let registrar = Arc::new(BridgeClient::new(config.bridge.clone()));
    let manager = RemoteManager::new(bus, registrar, config.relay.clone());

    manager.setup().await?;

    info!("Remote manager running (ctrl-c to exit)");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
