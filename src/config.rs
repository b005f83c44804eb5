//! Configuration Module
//!
//! This module defines all configuration structures for the ticket validator.
//! Configuration is loaded from a TOML file, parsed using serde, and then
//! patched from a small set of environment variables. The result is built
//! once at startup and handed to the components that need it.

use serde::Deserialize;
use std::fs;

/// Environment variable overriding `rpc.url`
pub const ENV_RPC_URL: &str = "TICKET_RPC_URL";
/// Environment variable overriding `contract.address`
pub const ENV_CONTRACT_ADDRESS: &str = "TICKET_CONTRACT_ADDRESS";
/// Environment variable overriding `support.email`
pub const ENV_SUPPORT_EMAIL: &str = "TICKET_SUPPORT_EMAIL";

/// Main configuration structure
///
/// Contains all configuration sections for the validator service.
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [rpc]
/// url = "https://rpc.gnosischain.com"
/// network = "Gnosis Chain"
///
/// [contract]
/// address = "0x0f9ab1d4feaede6b8e5bb7a9d7a10e3e5c1b5d2a"
///
/// [api]
/// host = "127.0.0.1"
/// port = 8080
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcConfig,
    pub contract: ContractConfig,
    #[serde(default)]
    pub ticket: TicketConfig,
    #[serde(default)]
    pub support: SupportConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Blockchain gateway configuration
///
/// # Fields
/// - `url`: JSON-RPC endpoint queried for contract state
/// - `network`: Display name of the chain, shown in the contract details
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    #[serde(default = "default_network")]
    pub network: String,
}

/// Lock contract configuration
///
/// # Fields
/// - `address`: Address of the lock contract that issues the tickets
#[derive(Debug, Clone, Deserialize)]
pub struct ContractConfig {
    pub address: String,
}

/// Static ticket metadata attached to a valid outcome
#[derive(Debug, Clone, Deserialize)]
pub struct TicketConfig {
    pub contract_name: String,
    pub event_name: String,
    pub key_expiration: String,
}

/// Support contact shown alongside the contract details
#[derive(Debug, Clone, Deserialize)]
pub struct SupportConfig {
    pub email: String,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on (e.g., 8080)
/// - `max_sessions`: Upper bound on live UI sessions kept in memory
/// - `session_ttl_secs`: Idle time after which a session is dropped
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_max_sessions() -> usize {
    1024
}

fn default_session_ttl_secs() -> u64 {
    30 * 60
}

fn default_network() -> String {
    "Gnosis Chain".to_string()
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            contract_name: "DappCon 2025 Tickets".to_string(),
            event_name: "DappCon 2025".to_string(),
            key_expiration: "16th-18th June, 2025".to_string(),
        }
    }
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            email: "support@dappcon.io".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_sessions: default_max_sessions(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Environment overrides (`TICKET_RPC_URL`, `TICKET_CONTRACT_ADDRESS`,
    /// `TICKET_SUPPORT_EMAIL`) are applied after parsing.
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    ///
    /// # Example
    /// ```no_run
    /// # use ticket_validator::Config;
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe out the file setting.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc.url = url;
        }
        if let Some(address) = lookup(ENV_CONTRACT_ADDRESS) {
            self.contract.address = address;
        }
        if let Some(email) = lookup(ENV_SUPPORT_EMAIL) {
            self.support.email = email;
        }
        self
    }
}
