//! Definitions of CLI arguments and commands for the deploy scripts

use std::str::FromStr;

use alloy::{
    hex,
    primitives::{Address, U256},
};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    commands::{
        compile_contract, deploy_simple_storage, print_block_number, verify_deployed_contract,
    },
    config::Config,
    errors::ScriptError,
    tx::client::connect,
};

/// Scripts for compiling, deploying & verifying the SimpleStorage contract
#[derive(Parser)]
pub struct Cli {
    /// Network to run against, as named in the configuration
    #[arg(short, long, global = true)]
    pub network: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The possible CLI commands
#[derive(Subcommand)]
pub enum Command {
    /// Compile, deploy and verify the contract, then store a value in it
    Deploy(DeployArgs),
    /// Prints the current block number
    BlockNumber,
    /// Compile the contract and write its artifact
    Compile,
    /// Verify an already deployed contract on the network's block explorer
    Verify(VerifyArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, config: &Config, network: Option<&str>) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => {
                let value = parse_value(&args.value)?;
                let session = connect(config.network(network)?).await?;
                deploy_simple_storage(value, config, &session).await?;
                Ok(())
            }
            Command::BlockNumber => {
                let session = connect(config.network(network)?).await?;
                print_block_number(&session).await?;
                Ok(())
            }
            Command::Compile => {
                compile_contract(config)?;
                Ok(())
            }
            Command::Verify(args) => {
                let address = Address::from_str(&args.address)
                    .map_err(|e| ScriptError::Config(format!("invalid address: {e}")))?;
                let constructor_args = hex::decode(&args.constructor_args)
                    .map_err(|e| ScriptError::Config(format!("invalid constructor args: {e}")))?;

                let outcome = verify_deployed_contract(
                    address,
                    &constructor_args,
                    config,
                    config.network(network)?,
                )
                .await?;
                info!("Verification ended with {:?}", outcome);
                Ok(())
            }
        }
    }
}

/// Deploy the contract
#[derive(Args)]
pub struct DeployArgs {
    /// Value stored once the contract is deployed
    #[arg(short, long, default_value = "6")]
    pub value: String,
}

/// Verify a deployed contract
#[derive(Args)]
pub struct VerifyArgs {
    /// Address of the deployed contract
    #[arg(short, long)]
    pub address: String,
    /// ABI encoded constructor arguments, as hex
    #[arg(long, default_value = "")]
    pub constructor_args: String,
}

/// Parse a decimal or `0x` prefixed hex unsigned integer
fn parse_value(value: &str) -> Result<U256, ScriptError> {
    U256::from_str(value).map_err(|e| ScriptError::Config(format!("invalid value '{value}': {e}")))
}
