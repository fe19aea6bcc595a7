//! # Node Configuration
//!
//! Unified configuration for the signing service, gossip membership and
//! runtime parameters, loaded from `BN_*` environment variables.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Field |
//! |----------|---------|-------|
//! | `BN_BIND_ADDR` | `127.0.0.1:7946` | UDP bind address |
//! | `BN_ADVERTISE_URL` | `udp://<bound address>` | URL peers use to reach this node |
//! | `BN_SEED_PEERS` | empty | Comma-separated seed URLs |
//! | `BN_FANOUT` | `3` | `gossip.fanout` |
//! | `BN_MAX_TTL` | `3` | `gossip.max_ttl` |
//! | `BN_HEARTBEAT_MS` | `5000` | `gossip.heartbeat_interval_ms` |
//! | `BN_GOSSIP_MS` | `2000` | `gossip.gossip_interval_ms` |
//! | `BN_SUSPICION_MS` | `15000` | `gossip.suspicion_timeout_ms` |
//! | `BN_CLEANUP_MS` | `30000` | `gossip.cleanup_timeout_ms` and `dead_grace_period_ms` |
//! | `BN_MAX_PEERS` | `256` | `gossip.max_peers` |
//! | `BN_MAX_MESSAGE_HISTORY` | `1000` | `gossip.max_message_history` |
//! | `BN_STATE_FILE` | `./data/node-state.json` | Identity state file |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use bn_02_gossip_membership::adapters::parse_peer_addr;
use bn_02_gossip_membership::{GossipConfig, GossipError};
use bn_telemetry::TelemetryConfig;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Network configuration.
    pub network: NetworkConfig,
    /// Gossip protocol timing and bounds.
    pub gossip: GossipConfig,
    /// Identity persistence.
    pub identity: IdentityConfig,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("invalid peer URL {0:?}")]
    InvalidPeerUrl(String),

    #[error("BN_ADVERTISE_URL is required when binding to an unspecified address ({0})")]
    MissingAdvertiseUrl(SocketAddr),

    #[error(transparent)]
    Gossip(#[from] GossipError),
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// UDP bind address for gossip traffic.
    pub bind_addr: SocketAddr,
    /// URL advertised to peers; derived from the bound socket when unset.
    pub advertise_url: Option<String>,
    /// Seed peer URLs contacted on startup.
    pub seed_peers: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7946)),
            advertise_url: None,
            seed_peers: Vec::new(),
        }
    }
}

impl NetworkConfig {
    /// The URL peers should use, given the address the socket actually bound.
    pub fn advertised_url(&self, bound: SocketAddr) -> String {
        self.advertise_url
            .clone()
            .unwrap_or_else(|| format!("udp://{bound}"))
    }
}

/// Identity persistence configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// JSON state file holding the node's key material.
    pub state_file: PathBuf,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("./data/node-state.json"),
        }
    }
}

impl NodeConfig {
    /// Load from the process environment, then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an explicit variable source, then validate.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = NodeConfig {
            telemetry: TelemetryConfig::from_lookup(&lookup),
            ..NodeConfig::default()
        };

        if let Some(addr) = parse_var(&lookup, "BN_BIND_ADDR")? {
            config.network.bind_addr = addr;
        }
        config.network.advertise_url = lookup("BN_ADVERTISE_URL").filter(|u| !u.trim().is_empty());
        if let Some(seeds) = lookup("BN_SEED_PEERS") {
            config.network.seed_peers = seeds
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(path) = lookup("BN_STATE_FILE") {
            config.identity.state_file = PathBuf::from(path);
        }

        let gossip = &mut config.gossip;
        if let Some(v) = parse_var(&lookup, "BN_FANOUT")? {
            gossip.fanout = v;
        }
        if let Some(v) = parse_var(&lookup, "BN_MAX_TTL")? {
            gossip.max_ttl = v;
        }
        if let Some(v) = parse_var(&lookup, "BN_HEARTBEAT_MS")? {
            gossip.heartbeat_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BN_GOSSIP_MS")? {
            gossip.gossip_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BN_SUSPICION_MS")? {
            gossip.suspicion_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BN_CLEANUP_MS")? {
            gossip.cleanup_timeout_ms = v;
            gossip.dead_grace_period_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BN_MAX_PEERS")? {
            gossip.max_peers = v;
        }
        if let Some(v) = parse_var(&lookup, "BN_MAX_MESSAGE_HISTORY")? {
            gossip.max_message_history = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gossip.validate()?;

        match &self.network.advertise_url {
            Some(url) => {
                parse_peer_addr(url).map_err(|_| ConfigError::InvalidPeerUrl(url.clone()))?;
            }
            None if self.network.bind_addr.ip().is_unspecified() => {
                return Err(ConfigError::MissingAdvertiseUrl(self.network.bind_addr));
            }
            None => {}
        }

        for seed in &self.network.seed_peers {
            parse_peer_addr(seed).map_err(|_| ConfigError::InvalidPeerUrl(seed.clone()))?;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
