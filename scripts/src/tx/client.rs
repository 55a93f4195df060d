use alloy::{
    hex,
    network::EthereumWallet,
    node_bindings::{Anvil, AnvilInstance},
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use reqwest::Url;
use tracing::{debug, info};

use crate::{
    config::{Endpoint, NetworkConfig},
    constants::{DEV_PRIVATE_KEY, LOCAL_CHAIN_ID},
    errors::ScriptError,
};

/// A type-erased provider that signs with a local private key
/// & interfaces with the RPC endpoint over HTTP
pub type RpcProvider = DynProvider;

/// A connection to one of the configured networks
pub struct ChainSession {
    /// The network we are connected to
    pub network: NetworkConfig,
    /// The signing client
    pub client: RpcProvider,
    /// The chain id reported by the node
    pub chain_id: u64,
    /// The account transactions are sent from
    pub sender: Address,
    /// Spawned node backing an ephemeral network, killed on drop
    _node: Option<AnvilInstance>,
}

/// Connect to `network`, spawning a local node first if the network is ephemeral
pub async fn connect(network: &NetworkConfig) -> Result<ChainSession, ScriptError> {
    let (url, node) = match &network.endpoint {
        Endpoint::Ephemeral => {
            let node = Anvil::new()
                .chain_id(network.chain_id.unwrap_or(LOCAL_CHAIN_ID))
                .try_spawn()
                .map_err(|e| {
                    ScriptError::ClientInitialization(format!("cannot spawn anvil: {e}"))
                })?;
            info!("Started local node on {}", node.endpoint());
            (node.endpoint_url(), Some(node))
        }
        Endpoint::Http(url) => {
            let url = url.parse::<Url>().map_err(|e| {
                ScriptError::ClientInitialization(format!("invalid rpc url '{url}': {e}"))
            })?;
            (url, None)
        }
    };

    // Networks without configured accounts sign with the development account
    let private_key = network
        .accounts
        .first()
        .map(String::as_str)
        .unwrap_or(DEV_PRIVATE_KEY);
    let signer = parse_signer(private_key)?;
    let sender = signer.address();
    debug!("Signing as {}", sender);

    // Create our provider with the rpc client + signer
    let client = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(url)
        .erased();

    // Fetch chain id
    let chain_id = client
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    check_chain_id(network, chain_id)?;

    info!("Built client on network {} (chain ID: {})", network.name, chain_id);

    Ok(ChainSession {
        network: network.clone(),
        client,
        chain_id,
        sender,
        _node: node,
    })
}

/// Parse a hex private key, with or without its `0x` prefix
pub fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ScriptError> {
    let bytes = hex::decode(private_key.trim_start_matches("0x")).map_err(|e| {
        ScriptError::ClientInitialization(format!("private key is not valid hex: {e}"))
    })?;

    PrivateKeySigner::from_slice(&bytes)
        .map_err(|e| ScriptError::ClientInitialization(format!("invalid private key: {e}")))
}

/// Ensure the node serves the chain the network was declared with
fn check_chain_id(network: &NetworkConfig, actual: u64) -> Result<(), ScriptError> {
    match network.chain_id {
        Some(expected) if expected != actual => Err(ScriptError::ClientInitialization(format!(
            "network {} expects chain id {} but the node reports {}",
            network.name, expected, actual
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(chain_id: Option<u64>) -> NetworkConfig {
        NetworkConfig {
            name: "rinkeby".to_string(),
            endpoint: Endpoint::Http("https://eth-rinkeby/example".to_string()),
            accounts: vec![],
            chain_id,
            explorer_api_url: None,
        }
    }

    #[test]
    fn dev_key_maps_to_first_dev_account() {
        let signer = parse_signer(DEV_PRIVATE_KEY).unwrap();
        assert_eq!(
            signer.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn key_prefix_is_optional() {
        let with_prefix = parse_signer(DEV_PRIVATE_KEY).unwrap();
        let without_prefix = parse_signer(DEV_PRIVATE_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(with_prefix.address(), without_prefix.address());
    }

    #[test]
    fn placeholder_key_is_rejected() {
        let err = parse_signer("0xkey").unwrap_err();
        assert!(matches!(err, ScriptError::ClientInitialization(_)));
    }

    #[test]
    fn chain_id_mismatch_is_rejected() {
        assert!(check_chain_id(&network(Some(4)), 4).is_ok());
        assert!(check_chain_id(&network(None), 1).is_ok());

        let err = check_chain_id(&network(Some(4)), 5).unwrap_err();
        assert!(err.to_string().contains("expects chain id 4"));
    }

    #[tokio::test]
    async fn invalid_url_fails_before_any_request() {
        let mut network = network(Some(4));
        network.endpoint = Endpoint::Http("not a url".to_string());

        let err = connect(&network).await.err().unwrap();
        assert!(err.to_string().contains("invalid rpc url"));
    }
}
