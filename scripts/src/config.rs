//! Network and plugin configuration.
//!
//! Everything is read from the process environment (populated from `.env` by
//! `main`), falling back to placeholder values so that local networks work
//! without any setup.

use std::{collections::BTreeMap, env, path::PathBuf, time::Duration};

use crate::{
    constants::{
        COINMARKETCAP_API, CONTRACT_SOURCE, DEFAULT_NETWORK, GAS_REPORT_FILE, GOERLI_EXPLORER_API,
        LOCALHOST_RPC, LOCAL_CHAIN_ID, RINKEBY_EXPLORER_API, SOLIDITY_VERSION, VERIFY_POLL_INTERVAL,
    },
    errors::ScriptError,
    utils::workspace_root,
};

/// Placeholder values used when a variable is missing from the environment
const GOERLI_RPC_PLACEHOLDER: &str = "https://eth-goerli/example";
const RINKEBY_RPC_PLACEHOLDER: &str = "https://eth-rinkeby/example";
const PRIVATE_KEY_PLACEHOLDER: &str = "0xkey";
const API_KEY_PLACEHOLDER: &str = "key";

/// Where a network can be reached
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// A throwaway node spawned for the duration of a single command
    Ephemeral,
    /// A node reachable over HTTP
    Http(String),
}

/// A named network entry
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    pub name: String,
    pub endpoint: Endpoint,
    /// Private keys of the accounts to sign with, the first one is used.
    /// Empty means the node's default development account.
    pub accounts: Vec<String>,
    /// Expected chain id, checked against the node when set
    pub chain_id: Option<u64>,
    /// Etherscan compatible API of the network's block explorer
    pub explorer_api_url: Option<String>,
}

/// Block explorer credentials
#[derive(Clone, Debug)]
pub struct EtherscanConfig {
    pub api_key: String,
    /// Whether `api_key` came from the environment rather than the placeholder
    pub from_env: bool,
    /// Delay between two verification status checks
    pub poll_interval: Duration,
}

/// Options of the gas usage report
#[derive(Clone, Debug)]
pub struct GasReporterConfig {
    pub enabled: bool,
    pub output_file: PathBuf,
    /// Fiat currency the costs are expressed in
    pub currency: String,
    /// Native token of the chain, used to look the price up
    pub token: String,
    pub coinmarketcap_api_key: String,
    pub coinmarketcap_api_url: String,
    /// Whether the CoinMarketCap key came from the environment
    pub coinmarketcap_from_env: bool,
}

/// Project layout
#[derive(Clone, Debug)]
pub struct PathsConfig {
    pub root: PathBuf,
    /// Contract source, relative to `root`
    pub source: String,
    pub artifacts: PathBuf,
}

/// The whole project configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub default_network: String,
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Expected solc version
    pub solidity: String,
    pub etherscan: EtherscanConfig,
    pub gas_reporter: GasReporterConfig,
    pub paths: PathsConfig,
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration, resolving variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, placeholder: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| placeholder.to_string())
        };
        let is_set = |key: &str| lookup(key).is_some_and(|value| !value.is_empty());

        let private_key = var("PRIVATE_KEY", PRIVATE_KEY_PLACEHOLDER);

        let networks = [
            NetworkConfig {
                name: "hardhat".to_string(),
                endpoint: Endpoint::Ephemeral,
                accounts: vec![],
                chain_id: Some(LOCAL_CHAIN_ID),
                explorer_api_url: None,
            },
            NetworkConfig {
                name: "localhost".to_string(),
                endpoint: Endpoint::Http(LOCALHOST_RPC.to_string()),
                accounts: vec![],
                chain_id: Some(LOCAL_CHAIN_ID),
                explorer_api_url: None,
            },
            NetworkConfig {
                name: "goerli".to_string(),
                endpoint: Endpoint::Http(var("GOERLI_RPC_URL", GOERLI_RPC_PLACEHOLDER)),
                accounts: vec![private_key.clone()],
                chain_id: Some(5),
                explorer_api_url: Some(GOERLI_EXPLORER_API.to_string()),
            },
            NetworkConfig {
                name: "rinkeby".to_string(),
                endpoint: Endpoint::Http(var("RINKEBY_RPC_URL", RINKEBY_RPC_PLACEHOLDER)),
                accounts: vec![private_key],
                chain_id: Some(4),
                explorer_api_url: Some(RINKEBY_EXPLORER_API.to_string()),
            },
        ]
        .into_iter()
        .map(|network| (network.name.clone(), network))
        .collect();

        let root = workspace_root();

        Config {
            default_network: DEFAULT_NETWORK.to_string(),
            networks,
            solidity: SOLIDITY_VERSION.to_string(),
            etherscan: EtherscanConfig {
                api_key: var("ETHERSCAN_API_KEY", API_KEY_PLACEHOLDER),
                from_env: is_set("ETHERSCAN_API_KEY"),
                poll_interval: VERIFY_POLL_INTERVAL,
            },
            gas_reporter: GasReporterConfig {
                enabled: true,
                output_file: root.join(GAS_REPORT_FILE),
                currency: "USD".to_string(),
                token: "ETH".to_string(),
                coinmarketcap_api_key: var("COINMARKETCAP_API_KEY", API_KEY_PLACEHOLDER),
                coinmarketcap_api_url: COINMARKETCAP_API.to_string(),
                coinmarketcap_from_env: is_set("COINMARKETCAP_API_KEY"),
            },
            paths: PathsConfig {
                source: CONTRACT_SOURCE.to_string(),
                artifacts: root.join("artifacts"),
                root,
            },
        }
    }

    /// Find a network by name, `None` selecting the default network
    pub fn network(&self, name: Option<&str>) -> Result<&NetworkConfig, ScriptError> {
        let name = name.unwrap_or(&self.default_network);
        self.networks.get(name).ok_or_else(|| {
            let known = self.networks.keys().cloned().collect::<Vec<_>>().join(", ");
            ScriptError::Config(format!("unknown network '{name}', expected one of: {known}"))
        })
    }

    /// Whether deployments on `network` should be verified on its explorer
    pub fn should_verify(&self, network: &NetworkConfig) -> bool {
        network.explorer_api_url.is_some() && self.etherscan.from_env
    }
}
