//! # Node Configuration
//!
//! Loaded in three layers: built-in defaults, then an optional TOML file at
//! the path named by `CC_CONFIG`, then individual environment overrides.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CC_P2P_PORT` | `network.p2p_port` |
//! | `CC_SELF_HOST` | `network.self_host` |
//! | `CC_OPERATOR` | `node.operator` |
//! | `CC_DATA_DIR` | `storage.data_dir` |
//! | `CC_DIFFICULTY` | `consensus.difficulty` |
//! | `CC_FORCE_BOOTSTRAP` | `node.force_bootstrap` |

use cc_01_peer_registry::DEFAULT_MAX_PEERS;
use cc_03_proof_of_work::{Difficulty, DEFAULT_DIFFICULTY};
use serde::Deserialize;
use shared_types::PeerAddress;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "CC_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub network: NetworkConfig,
    pub node: NodeSection,
    pub consensus: ConsensusConfig,
    pub storage: StorageConfig,
    pub services: ServicesConfig,
}

/// Listener, advertised address and peer set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interface the listener binds.
    pub listen_host: String,
    /// TCP port for the node protocol.
    pub p2p_port: u16,
    /// Host other peers reach this node at.
    pub self_host: String,
    /// `host:port` peers known at startup.
    pub seed_peers: Vec<String>,
    /// `host:port` endpoints that are never peers (e.g. wallet clients).
    pub reserved_peers: Vec<String>,
    pub max_peers: usize,
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            p2p_port: 6000,
            self_host: "127.0.0.1".to_string(),
            seed_peers: Vec::new(),
            reserved_peers: Vec::new(),
            max_peers: DEFAULT_MAX_PEERS,
            connect_timeout_ms: 5_000,
            io_timeout_ms: 10_000,
        }
    }
}

/// Node identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Reserved operator address: receives operator gas, may not be paid directly.
    pub operator: String,
    /// Fetch a peer's chain at startup even when a local chain exists.
    pub force_bootstrap: bool,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            operator: "node-operator".to_string(),
            force_bootstrap: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Leading zero hex digits required in a block hash.
    pub difficulty: u8,
    /// Threads used to mine a genesis block.
    pub mining_workers: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the `chain` and `pending-pool` resources.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// How principal transaction signatures are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMode {
    /// secp256k1 ECDSA against the block's public key.
    #[default]
    Local,
    /// POST to the attestation service.
    Attestation,
}

/// External HTTP collaborators.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Queried for peers when the registry is empty at startup.
    pub peer_directory_url: Option<String>,
    pub attestation_url: Option<String>,
    pub signature_mode: SignatureMode,
}

impl NodeConfig {
    /// Defaults, then the file at `CC_CONFIG` if set, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `CC_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CC_P2P_PORT") {
            self.network.p2p_port = parse_env("CC_P2P_PORT", value)?;
        }
        if let Some(value) = lookup("CC_SELF_HOST") {
            self.network.self_host = value;
        }
        if let Some(value) = lookup("CC_OPERATOR") {
            self.node.operator = value;
        }
        if let Some(value) = lookup("CC_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("CC_DIFFICULTY") {
            self.consensus.difficulty = parse_env("CC_DIFFICULTY", value)?;
        }
        if let Some(value) = lookup("CC_FORCE_BOOTSTRAP") {
            self.node.force_bootstrap = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "CC_FORCE_BOOTSTRAP",
                        value,
                    })
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Difficulty::new(self.consensus.difficulty)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.network.p2p_port == 0 {
            return Err(ConfigError::Invalid("network.p2p_port must be non-zero".into()));
        }
        if self.node.operator.trim().is_empty() {
            return Err(ConfigError::Invalid("node.operator must be set".into()));
        }
        if self.network.max_peers == 0 {
            return Err(ConfigError::Invalid("network.max_peers must be at least 1".into()));
        }
        if self.services.signature_mode == SignatureMode::Attestation
            && self.services.attestation_url.is_none()
        {
            return Err(ConfigError::Invalid(
                "services.attestation_url is required in attestation mode".into(),
            ));
        }
        self.seed_peers()?;
        self.reserved_peers()?;
        Ok(())
    }

    /// The address peers reach this node at.
    pub fn self_address(&self) -> PeerAddress {
        PeerAddress::new(self.network.self_host.clone(), self.network.p2p_port)
    }

    pub fn seed_peers(&self) -> Result<Vec<PeerAddress>, ConfigError> {
        parse_peers("network.seed_peers", &self.network.seed_peers)
    }

    pub fn reserved_peers(&self) -> Result<Vec<PeerAddress>, ConfigError> {
        parse_peers("network.reserved_peers", &self.network.reserved_peers)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.network.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.network.io_timeout_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

fn parse_peers(field: &str, raw: &[String]) -> Result<Vec<PeerAddress>, ConfigError> {
    raw.iter()
        .map(|s| {
            PeerAddress::parse(s.trim())
                .ok_or_else(|| ConfigError::Invalid(format!("{field}: bad address {s:?}")))
        })
        .collect()
}
