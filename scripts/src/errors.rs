//! Definitions of errors that can occur during the execution of the contract management scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the contract management scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error in the network or plugin configuration
    Config(String),
    /// Error when creating the client
    ClientInitialization(String),
    /// Error compiling a contract
    ContractCompilation(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error while verifying a contract on the explorer
    Verification(String),
    /// Error reading or writing a compilation artifact
    ArtifactOutput(String),
    /// Error fetching the token price
    Pricing(String),
    /// Error writing the gas report
    GasReport(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Config(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error during client init: {}", s),
            ScriptError::ContractCompilation(s) => write!(f, "error compiling contract: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Verification(s) => write!(f, "error verifying contract: {}", s),
            ScriptError::ArtifactOutput(s) => write!(f, "error with artifact file: {}", s),
            ScriptError::Pricing(s) => write!(f, "error fetching token price: {}", s),
            ScriptError::GasReport(s) => write!(f, "error writing gas report: {}", s),
        }
    }
}

impl Error for ScriptError {}
