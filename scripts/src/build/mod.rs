//! Contract compilation, delegated to the `solc` binary

mod solc;

pub use solc::{long_version, parse_combined_json, CompiledContract, SolcBuilder};

use alloy::primitives::Bytes;

/// A compiled contract, along with everything needed to verify it on an explorer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub contract_name: String,
    /// Path of the source file, relative to the workspace root
    pub source_name: String,
    /// Full source code
    pub source: String,
    /// JSON encoded ABI
    pub abi: String,
    /// Creation bytecode
    pub bytecode: Bytes,
    /// Long compiler version, e.g. `v0.8.8+commit.dddeac2f`
    pub compiler_version: String,
}
