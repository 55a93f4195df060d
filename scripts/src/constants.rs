//! Constants used in the deploy scripts

use std::time::Duration;

/// Network used when none is given on the command line
pub const DEFAULT_NETWORK: &str = "hardhat";

/// RPC endpoint of a node started locally with `anvil` or `hardhat node`
pub const LOCALHOST_RPC: &str = "http://127.0.0.1:8545/";

/// Chain id used by local development nodes
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// First account derived from the default development mnemonic
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Compiler version the contracts are written against
pub const SOLIDITY_VERSION: &str = "0.8.8";

/// The deployed contract
pub const CONTRACT_NAME: &str = "SimpleStorage";

/// Source file of the deployed contract, relative to the workspace root
pub const CONTRACT_SOURCE: &str = "contracts/SimpleStorage.sol";

/// Number of blocks to wait on before asking the explorer to verify
pub const VERIFY_CONFIRMATIONS: u64 = 6;

/// Number of blocks to wait on after a `store` call
pub const STORE_CONFIRMATIONS: u64 = 1;

/// Delay between two chain height polls while waiting on confirmations
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Delay between two verification status polls
pub const VERIFY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Etherscan API endpoints
pub const GOERLI_EXPLORER_API: &str = "https://api-goerli.etherscan.io/api";
pub const RINKEBY_EXPLORER_API: &str = "https://api-rinkeby.etherscan.io/api";

/// CoinMarketCap API root
pub const COINMARKETCAP_API: &str = "https://pro-api.coinmarketcap.com";

/// Plain text gas usage report
pub const GAS_REPORT_FILE: &str = "gas-report.txt";
