use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use tracing::{debug, error, info, warn};

use crate::{
    build::{Artifact, SolcBuilder},
    config::{Config, NetworkConfig},
    constants::{
        CONFIRMATION_POLL_INTERVAL, CONTRACT_NAME, STORE_CONFIRMATIONS, VERIFY_CONFIRMATIONS,
    },
    deploy::{deploy_contract, wait_for_confirmations, Deployment},
    errors::ScriptError,
    gas_report::GasReporter,
    output_writer::{read_artifact, write_artifact},
    pricing::CoinMarketCapClient,
    tx::{client::ChainSession, reader::retrieve, sender::send_store},
    verify::{is_already_verified, EtherscanVerifier},
};

/// What the deploy procedure went through
#[derive(Debug)]
pub struct DeployOutcome {
    pub deployment: Deployment,
    /// Verification result, `None` when the network is not verifiable
    pub verification: Option<VerificationOutcome>,
    /// Value held right after deployment
    pub initial_value: U256,
    /// Value held after the store call was confirmed
    pub updated_value: U256,
}

/// How a verification attempt ended, none of them stops the caller
#[derive(Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
    Failed(String),
}

/// Compile the SimpleStorage contract and save its artifact
pub fn compile_contract(config: &Config) -> Result<Artifact, ScriptError> {
    let artifact = SolcBuilder::new(&config.solidity).compile(
        &config.paths.root,
        &config.paths.source,
        CONTRACT_NAME,
    )?;

    let artifact_path = write_artifact(&config.paths.artifacts, &artifact)?;
    info!("Compiled {} into {}", CONTRACT_NAME, artifact_path.display());

    Ok(artifact)
}

/// Deploy SimpleStorage, verify it when possible, then read, store `value` and read again
pub async fn deploy_simple_storage(
    value: U256,
    config: &Config,
    session: &ChainSession,
) -> Result<DeployOutcome, ScriptError> {
    let artifact = compile_contract(config)?;
    let mut gas_reporter = GasReporter::new(&artifact.compiler_version);

    info!("Deploying contract...");
    let deployment = deploy_contract(&artifact, &session.client).await?;
    gas_reporter.record_deployment(CONTRACT_NAME, deployment.gas_used, deployment.gas_price);
    println!("Deployed contract to: {}", deployment.address);
    info!("Created by {} in tx {}", session.sender, deployment.tx_hash);

    info!("Deployed on chain ID: {}", session.chain_id);

    let verification = if config.should_verify(&session.network) {
        info!("Waiting for block txes...");
        wait_for_confirmations(
            &session.client,
            deployment.block_number,
            VERIFY_CONFIRMATIONS,
            CONFIRMATION_POLL_INTERVAL,
        )
        .await?;

        let verifier = explorer_verifier(config, &session.network)?;
        Some(verify(&verifier, deployment.address, &artifact, &[]).await)
    } else {
        debug!("Skipping verification on {}", session.network.name);
        None
    };

    let initial_value = retrieve(deployment.address, session.client.clone()).await?;
    println!("Current value is: {}", initial_value);

    let receipt = send_store(
        deployment.address,
        value,
        STORE_CONFIRMATIONS,
        session.client.clone(),
    )
    .await?;
    gas_reporter.record_method(
        CONTRACT_NAME,
        "store",
        receipt.gas_used,
        receipt.effective_gas_price,
    );

    let updated_value = retrieve(deployment.address, session.client.clone()).await?;
    println!("Updated value is: {}", updated_value);

    if config.gas_reporter.enabled {
        write_gas_report(config, &gas_reporter).await?;
    }

    Ok(DeployOutcome {
        deployment,
        verification,
        initial_value,
        updated_value,
    })
}

/// Verify an already deployed SimpleStorage from its saved artifact
pub async fn verify_deployed_contract(
    address: Address,
    constructor_args: &[u8],
    config: &Config,
    network: &NetworkConfig,
) -> Result<VerificationOutcome, ScriptError> {
    let artifact = read_artifact(&config.paths.artifacts, CONTRACT_NAME)?;
    let verifier = explorer_verifier(config, network)?;

    Ok(verify(&verifier, address, &artifact, constructor_args).await)
}

/// Run a verification, swallowing and logging every error
pub async fn verify(
    verifier: &EtherscanVerifier,
    address: Address,
    artifact: &Artifact,
    constructor_args: &[u8],
) -> VerificationOutcome {
    info!("Verifying contract...");
    match verifier.verify(address, artifact, constructor_args).await {
        Ok(()) => {
            info!("Verified {} at {}", artifact.contract_name, address);
            VerificationOutcome::Verified
        }
        Err(e) if is_already_verified(&e) => {
            info!("Already Verified!");
            VerificationOutcome::AlreadyVerified
        }
        Err(e) => {
            error!("{}", e);
            VerificationOutcome::Failed(e.to_string())
        }
    }
}

/// Print the current chain height
pub async fn print_block_number(session: &ChainSession) -> Result<u64, ScriptError> {
    let block_number = session
        .client
        .get_block_number()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    println!("Current block number: {}", block_number);

    Ok(block_number)
}

/// Build the explorer client of `network`
fn explorer_verifier(
    config: &Config,
    network: &NetworkConfig,
) -> Result<EtherscanVerifier, ScriptError> {
    let api_url = network.explorer_api_url.as_deref().ok_or_else(|| {
        ScriptError::Config(format!("network {} has no block explorer", network.name))
    })?;

    Ok(EtherscanVerifier::new(api_url, &config.etherscan.api_key)
        .with_poll_interval(config.etherscan.poll_interval))
}

/// Write the gas report, priced in fiat when a CoinMarketCap key is available
async fn write_gas_report(config: &Config, reporter: &GasReporter) -> Result<(), ScriptError> {
    let options = &config.gas_reporter;

    let price = if options.coinmarketcap_from_env {
        let client = CoinMarketCapClient::new(
            &options.coinmarketcap_api_url,
            &options.coinmarketcap_api_key,
        );
        match client.fetch_price(&options.token, &options.currency).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("Gas report written without {} costs: {}", options.currency, e);
                None
            }
        }
    } else {
        debug!("No CoinMarketCap key, gas report written without fiat costs");
        None
    };

    reporter.write(&options.output_file, price.as_ref())?;
    info!("Gas report written to {}", options.output_file.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::Bytes;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn artifact() -> Artifact {
        Artifact {
            contract_name: "SimpleStorage".to_string(),
            source_name: "contracts/SimpleStorage.sol".to_string(),
            source: "contract SimpleStorage {}".to_string(),
            abi: "[]".to_string(),
            bytecode: Bytes::from(vec![0x60, 0x80]),
            compiler_version: "v0.8.8+commit.dddeac2f".to_string(),
        }
    }

    async fn explorer_answering(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(&server)
            .await;
        server
    }

    fn verifier(server: &MockServer) -> EtherscanVerifier {
        EtherscanVerifier::new(&format!("{}/api", server.uri()), "explorer-key")
            .with_poll_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn already_verified_is_swallowed() {
        let server = explorer_answering(
            r#"{"status":"0","message":"NOTOK","result":"Contract source code already verified"}"#,
        )
        .await;

        let outcome = verify(&verifier(&server), Address::ZERO, &artifact(), &[]).await;
        assert_eq!(outcome, VerificationOutcome::AlreadyVerified);
    }

    #[tokio::test]
    async fn other_verification_errors_are_reported_not_raised() {
        let server = explorer_answering(
            r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#,
        )
        .await;

        let outcome = verify(&verifier(&server), Address::ZERO, &artifact(), &[]).await;
        match outcome {
            VerificationOutcome::Failed(reason) => assert!(reason.contains("Invalid API Key")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn local_networks_have_no_verifier() {
        let config = Config::from_lookup(|_| None);
        let hardhat = config.network(Some("hardhat")).unwrap();

        let err = explorer_verifier(&config, hardhat).err().unwrap();
        assert!(err.to_string().contains("has no block explorer"));
    }

    #[tokio::test]
    async fn verify_command_needs_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::from_lookup(|_| None);
        config.paths.artifacts = dir.path().to_path_buf();
        let rinkeby = config.network(Some("rinkeby")).unwrap().clone();

        let err = verify_deployed_contract(Address::ZERO, &[], &config, &rinkeby)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::ArtifactOutput(_)));
    }
}
