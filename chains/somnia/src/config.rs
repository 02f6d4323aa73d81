use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{ChainConfig, ConfigError, ProxyConfig, ProxyManager};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_RPC_URL: &str = "https://dream-rpc.somnia.network";
pub const DEFAULT_PING_TOKEN: &str = "0xbecd9b5f373877881d91cbdbaf013d97eb532154";
pub const DEFAULT_PONG_TOKEN: &str = "0x7968ac15a72629e05f41b8271e4e7292e0cc9f90";
pub const DEFAULT_SWAP_ROUTER: &str = "0x6aac14f090a35eea150705f72d90e4cdc4a49b2c";
pub const DEFAULT_FAUCET_URL: &str = "https://testnet.somnia.network/api/faucet";
pub const DEFAULT_NETWORK_NAME: &str = "Somnia Testnet";

/// Raw settings as read from defaults, the optional TOML file and the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomniaConfig {
    pub rpc_url: String,
    pub ping_token_address: String,
    pub pong_token_address: String,
    pub swap_contract_address: String,
    #[serde(default)]
    pub proxy: Option<String>,
    pub network_name: String,
    pub faucet_url: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    pub tx_timeout_secs: u64,
    pub receipt_poll_ms: u64,
}

impl Default for SomniaConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            ping_token_address: DEFAULT_PING_TOKEN.to_string(),
            pong_token_address: DEFAULT_PONG_TOKEN.to_string(),
            swap_contract_address: DEFAULT_SWAP_ROUTER.to_string(),
            proxy: None,
            network_name: DEFAULT_NETWORK_NAME.to_string(),
            faucet_url: DEFAULT_FAUCET_URL.to_string(),
            chain_id: None,
            tx_timeout_secs: 180,
            receipt_poll_ms: 2000,
        }
    }
}

impl SomniaConfig {
    /// Defaults, then `path` if it exists, then environment variables
    /// (`RPC_URL`, `PING_TOKEN_ADDRESS`, `PROXY`, ...).
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    /// Validates every field once and produces the immutable runtime settings.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        Url::parse(&self.rpc_url).map_err(|_| ConfigError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
        })?;

        let faucet_url = Url::parse(&self.faucet_url).map_err(|e| ConfigError::InvalidValue {
            field: "FAUCET_URL".to_string(),
            reason: e.to_string(),
        })?;

        let proxy = match self.proxy.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(ProxyManager::parse(raw)?),
            _ => None,
        };

        if self.tx_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "TX_TIMEOUT_SECS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Settings {
            chain: ChainConfig {
                name: self.network_name.clone(),
                rpc_endpoint: self.rpc_url.clone(),
                chain_id: self.chain_id,
            },
            ping: TokenDescriptor::new(
                "Ping",
                parse_address("PING_TOKEN_ADDRESS", &self.ping_token_address)?,
            ),
            pong: TokenDescriptor::new(
                "Pong",
                parse_address("PONG_TOKEN_ADDRESS", &self.pong_token_address)?,
            ),
            swap_router: parse_address("SWAP_CONTRACT_ADDRESS", &self.swap_contract_address)?,
            faucet_url,
            proxy,
            tx_timeout: Duration::from_secs(self.tx_timeout_secs),
            receipt_poll: Duration::from_millis(self.receipt_poll_ms.max(100)),
        })
    }
}

fn parse_address(field: &str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not an address: {}", raw, e),
        })
}

/// One of the two swappable tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub name: String,
    pub address: Address,
}

impl TokenDescriptor {
    pub fn new(name: &str, address: Address) -> Self {
        Self {
            name: name.to_string(),
            address,
        }
    }
}

/// Immutable runtime settings, built once at start-up and shared by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub chain: ChainConfig,
    pub ping: TokenDescriptor,
    pub pong: TokenDescriptor,
    pub swap_router: Address,
    pub faucet_url: Url,
    pub proxy: Option<ProxyConfig>,
    pub tx_timeout: Duration,
    pub receipt_poll: Duration,
}

impl Settings {
    pub fn network_name(&self) -> &str {
        &self.chain.name
    }

    /// Display name for a token address, falling back to the address itself.
    pub fn token_name(&self, address: Address) -> String {
        if address == self.ping.address {
            self.ping.name.clone()
        } else if address == self.pong.address {
            self.pong.name.clone()
        } else {
            format!("{:?}", address)
        }
    }
}
