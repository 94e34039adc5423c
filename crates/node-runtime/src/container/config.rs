//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. TOML file from `--config FILE` or `PC_CONFIG`
//! 3. Environment: `PC_P2P_PORT`, `PC_KEY_FILE`, `PC_CHAIN_FILE`,
//!    `PC_PEERS_FILE`, `PC_DEBUG`
//! 4. Command line: `--debug`, `--port N`, `--key FILE`

use clap::Parser;
use pc_01_peer_directory::LivenessConfig;
use pc_03_transport::TransportConfig;
use pc_04_ledger::LedgerConfig;
use serde::Deserialize;
use shared_types::LEDGER_VERSION;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Network configuration.
    pub network: NetworkConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Mining configuration.
    pub mining: MiningConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Configuration errors.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file could not be read.
    Io { path: PathBuf, message: String },
    /// The config file is not valid TOML for [`NodeConfig`].
    Parse(String),
    /// An environment variable has an unusable value.
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "cannot read config file {}: {}", path.display(), message)
            }
            ConfigError::Parse(msg) => write!(f, "invalid config file: {}", msg),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value {:?} for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the UDP socket binds to.
    pub bind_address: IpAddr,
    /// P2P listening port.
    pub p2p_port: u16,
    /// Maximum bytes per datagram, control byte included.
    pub datagram_budget: usize,
    /// Seconds of silence before a peer is demoted.
    pub liveness_window_secs: u64,
    /// Milliseconds between liveness sweeps.
    pub liveness_interval_ms: u64,
    /// Maximum addresses per peer-list answer.
    pub max_gossip_peers: usize,
    /// Bootstrap peer file (`host port` per line).
    pub peers_file: PathBuf,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        let liveness = LivenessConfig::default();
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            p2p_port: 6666,
            datagram_budget: transport.datagram_budget,
            liveness_window_secs: liveness.liveness_window_secs,
            liveness_interval_ms: transport.liveness_interval.as_millis() as u64,
            max_gossip_peers: liveness.max_gossip_peers,
            peers_file: PathBuf::from("peers.txt"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persisted chain file.
    pub chain_file: PathBuf,
    /// Maximum pending transactions.
    pub max_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chain_file: PathBuf::from("chain.bin"),
            max_pool_size: LedgerConfig::default().max_pool_size,
        }
    }
}

/// Mining configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Hex seed of the node key. An ephemeral key is used when unset.
    pub key_file: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log at DEBUG instead of INFO.
    pub debug: bool,
}

/// Proof-Chain peer-to-peer ledger node
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "node-runtime", version)]
pub struct CliArgs {
    /// Log at DEBUG instead of INFO
    #[arg(short, long)]
    pub debug: bool,

    /// UDP port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Hex seed file of the node key, created when missing
    #[arg(short, long = "key", value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl NodeConfig {
    /// Resolve the configuration from every source.
    pub fn load(args: &CliArgs, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file = args
            .config
            .clone()
            .or_else(|| env("PC_CONFIG").map(PathBuf::from));
        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.apply_args(args);
        Ok(config)
    }

    /// Read a TOML file; missing sections keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Override fields from `PC_*` environment variables.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(port) = env("PC_P2P_PORT") {
            self.network.p2p_port = parse_value("PC_P2P_PORT", &port)?;
        }
        if let Some(path) = env("PC_KEY_FILE") {
            self.mining.key_file = Some(PathBuf::from(path));
        }
        if let Some(path) = env("PC_CHAIN_FILE") {
            self.storage.chain_file = PathBuf::from(path);
        }
        if let Some(path) = env("PC_PEERS_FILE") {
            self.network.peers_file = PathBuf::from(path);
        }
        if let Some(flag) = env("PC_DEBUG") {
            self.logging.debug = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Override fields from command-line flags.
    pub fn apply_args(&mut self, args: &CliArgs) {
        if args.debug {
            self.logging.debug = true;
        }
        if let Some(port) = args.port {
            self.network.p2p_port = port;
        }
        if let Some(path) = &args.key_file {
            self.mining.key_file = Some(path.clone());
        }
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.network.bind_address, self.network.p2p_port)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            datagram_budget: self.network.datagram_budget,
            liveness_interval: Duration::from_millis(self.network.liveness_interval_ms),
        }
    }

    pub fn liveness_config(&self) -> LivenessConfig {
        LivenessConfig {
            liveness_window_secs: self.network.liveness_window_secs,
            max_gossip_peers: self.network.max_gossip_peers,
        }
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            local_version: LEDGER_VERSION,
            max_pool_size: self.storage.max_pool_size,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
