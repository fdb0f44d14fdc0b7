//! Configuration for the resolver and the HTTP API.
//!
//! Values are layered: built-in defaults, then an optional YAML/JSON file, then
//! environment variables, then command-line flags (applied by the binary).
//!
//! ```yaml
//! resolver:
//!   primary_rpc_url: https://rpc.xandeum.network
//!   secondary_rpc_url: https://api.mainnet-beta.solana.com
//!   primary_timeout: 10s
//!   secondary_timeout: 15s
//!   simulation_count: 50
//! server:
//!   bind_addr: 0.0.0.0:8080
//!   revalidate: 30s
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default primary storage-network RPC endpoint.
pub const DEFAULT_PRIMARY_RPC: &str = "https://rpc.xandeum.network";

/// Default secondary (independent network) RPC endpoint.
pub const DEFAULT_SECONDARY_RPC: &str = "https://api.mainnet-beta.solana.com";

/// Environment variable overriding the primary endpoint.
pub const ENV_PRIMARY_RPC: &str = "PNODE_PRIMARY_RPC";

/// Environment variable overriding the secondary endpoint.
pub const ENV_SECONDARY_RPC: &str = "PNODE_SECONDARY_RPC";

/// Number of nodes produced in simulation mode.
pub const DEFAULT_SIMULATION_COUNT: usize = 50;

/// Settings for [`crate::resolver::NetworkStatusResolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Primary storage-network JSON-RPC endpoint
    pub primary_rpc_url: String,
    /// Secondary network JSON-RPC endpoint (cluster topology)
    pub secondary_rpc_url: String,
    /// Time budget for each call against the primary endpoint
    #[serde(with = "humantime_serde")]
    pub primary_timeout: Duration,
    /// Time budget for the call against the secondary endpoint
    #[serde(with = "humantime_serde")]
    pub secondary_timeout: Duration,
    /// Nodes generated when every live strategy fails
    pub simulation_count: usize,
    /// Fixed seed for synthesized values (tests and reproducible demos)
    pub rng_seed: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_rpc_url: DEFAULT_PRIMARY_RPC.to_string(),
            secondary_rpc_url: DEFAULT_SECONDARY_RPC.to_string(),
            primary_timeout: Duration::from_secs(10),
            secondary_timeout: Duration::from_secs(15),
            simulation_count: DEFAULT_SIMULATION_COUNT,
            rng_seed: None,
        }
    }
}

impl ResolverConfig {
    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply endpoint overrides from a variable lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(ENV_PRIMARY_RPC) {
            self.primary_rpc_url = url.trim().to_string();
        }
        if let Some(url) = non_blank(ENV_SECONDARY_RPC) {
            self.secondary_rpc_url = url.trim().to_string();
        }
    }

    /// Reject unusable endpoints and counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url(&self.primary_rpc_url)?;
        validate_url(&self.secondary_rpc_url)?;

        if self.simulation_count == 0 {
            return Err(ConfigError::Invalid {
                field: "simulation_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.primary_timeout.is_zero() || self.secondary_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings for the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Cache revalidation window advertised to HTTP caches
    #[serde(with = "humantime_serde")]
    pub revalidate: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            revalidate: Duration::from_secs(30),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Resolver settings
    pub resolver: ResolverConfig,
    /// HTTP API settings
    pub server: ServerConfig,
}

impl AppConfig {
    /// Parse a config document. JSON is tried first, then YAML.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e: serde_yaml::Error| ConfigError::Parse(e.to_string()))
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Defaults, then the optional file, then environment overrides; validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.resolver.apply_env(|key| std::env::var(key).ok());
        config.resolver.validate()?;
        Ok(config)
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
