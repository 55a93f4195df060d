use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use alloy::{hex, primitives::Bytes};
use tracing::{info, warn};

use crate::{build::Artifact, errors::ScriptError, utils::command_output_or};

/// Compiles solidity sources by shelling out to `solc`
pub struct SolcBuilder {
    /// The compiler binary
    binary: PathBuf,
    /// The version the sources are written against
    expected_version: String,
}

/// The parts of a `--combined-json` output we care about
#[derive(Debug, PartialEq, Eq)]
pub struct CompiledContract {
    pub abi: String,
    pub bytecode: Bytes,
    pub compiler_version: String,
}

impl SolcBuilder {
    /// A builder using the `solc` found in `PATH`
    pub fn new(expected_version: &str) -> Self {
        Self {
            binary: PathBuf::from("solc"),
            expected_version: expected_version.to_string(),
        }
    }

    /// Use a specific compiler binary
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Compile `contract_name` from `source_name`, a path relative to `root`
    pub fn compile(
        &self,
        root: &Path,
        source_name: &str,
        contract_name: &str,
    ) -> Result<Artifact, ScriptError> {
        let source = fs::read_to_string(root.join(source_name)).map_err(|e| {
            ScriptError::ContractCompilation(format!("cannot read {source_name}: {e}"))
        })?;

        info!("Compiling {} with {:?}...", source_name, self.binary);
        let mut build_cmd = Command::new(&self.binary);
        // Run from the root so that the source name in the output stays relative
        build_cmd.current_dir(root);
        build_cmd.args(["--combined-json", "abi,bin"]);
        build_cmd.arg(source_name);
        let output = command_output_or(build_cmd, "Failed to compile contract")?;

        let compiled = parse_combined_json(&output, contract_name)?;
        if !self.matches_expected(&compiled.compiler_version) {
            warn!(
                "Compiled with solc {} while the sources expect {}",
                compiled.compiler_version, self.expected_version
            );
        }

        Ok(Artifact {
            contract_name: contract_name.to_string(),
            source_name: source_name.to_string(),
            source,
            abi: compiled.abi,
            bytecode: compiled.bytecode,
            compiler_version: compiled.compiler_version,
        })
    }

    /// Whether a long version string is the expected release
    fn matches_expected(&self, long_version: &str) -> bool {
        long_version
            .trim_start_matches('v')
            .starts_with(&format!("{}+", self.expected_version))
    }
}

/// Extract a contract from the output of `solc --combined-json abi,bin`
pub fn parse_combined_json(
    output: &str,
    contract_name: &str,
) -> Result<CompiledContract, ScriptError> {
    let parsed =
        json::parse(output).map_err(|e| ScriptError::ContractCompilation(e.to_string()))?;

    let compiler_version = parsed["version"]
        .as_str()
        .and_then(long_version)
        .ok_or_else(|| {
            ScriptError::ContractCompilation(String::from("missing compiler version in output"))
        })?;

    let suffix = format!(":{contract_name}");
    let (_, contract) = parsed["contracts"]
        .entries()
        .find(|(key, _)| key.ends_with(&suffix))
        .ok_or_else(|| {
            ScriptError::ContractCompilation(format!("contract {contract_name} not in output"))
        })?;

    // Older compilers emit the ABI as an encoded string
    let abi = match &contract["abi"] {
        abi if abi.is_array() => abi.dump(),
        abi => abi.as_str().map(str::to_string).ok_or_else(|| {
            ScriptError::ContractCompilation(format!("missing ABI for {contract_name}"))
        })?,
    };

    let bin = contract["bin"].as_str().unwrap_or_default();
    if bin.is_empty() {
        return Err(ScriptError::ContractCompilation(format!(
            "no bytecode for {contract_name}, is it abstract?"
        )));
    }
    let bytecode = hex::decode(bin)
        .map_err(|e| ScriptError::ContractCompilation(e.to_string()))?
        .into();

    Ok(CompiledContract {
        abi,
        bytecode,
        compiler_version,
    })
}

/// Turn a solc build version (`0.8.8+commit.dddeac2f.Linux.g++`) into the
/// form explorers expect (`v0.8.8+commit.dddeac2f`)
pub fn long_version(version: &str) -> Option<String> {
    let (release, build) = version.trim_start_matches('v').split_once('+')?;
    let commit = build.split('.').next()?;
    if release.is_empty() || !commit.starts_with("commit") {
        return None;
    }
    Some(format!("v{release}+{commit}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::CONTRACT_SOURCE, utils::workspace_root};

    const COMBINED_OUTPUT: &str = r#"{
        "contracts": {
            "contracts/SimpleStorage.sol:SimpleStorage": {
                "abi": [{"inputs":[],"name":"retrieve","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"}],
                "bin": "6080604052"
            }
        },
        "version": "0.8.8+commit.dddeac2f.Linux.g++"
    }"#;

    #[test]
    fn extracts_contract_from_combined_output() {
        let compiled = parse_combined_json(COMBINED_OUTPUT, "SimpleStorage").unwrap();

        assert_eq!(compiled.compiler_version, "v0.8.8+commit.dddeac2f");
        assert_eq!(compiled.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(compiled.abi.starts_with('['));
        assert!(compiled.abi.contains("retrieve"));
    }

    #[test]
    fn accepts_string_encoded_abi() {
        let output = r#"{
            "contracts": {"SimpleStorage.sol:SimpleStorage": {"abi": "[]", "bin": "00"}},
            "version": "0.8.8+commit.dddeac2f.Darwin.appleclang"
        }"#;

        let compiled = parse_combined_json(output, "SimpleStorage").unwrap();
        assert_eq!(compiled.abi, "[]");
    }

    #[test]
    fn unknown_contract_is_an_error() {
        let err = parse_combined_json(COMBINED_OUTPUT, "Other").unwrap_err();
        assert!(err.to_string().contains("contract Other not in output"));
    }

    #[test]
    fn abstract_contract_is_an_error() {
        let output = r#"{
            "contracts": {"a.sol:SimpleStorage": {"abi": [], "bin": ""}},
            "version": "0.8.8+commit.dddeac2f.Linux.g++"
        }"#;

        let err = parse_combined_json(output, "SimpleStorage").unwrap_err();
        assert!(err.to_string().contains("no bytecode"));
    }

    #[test]
    fn long_version_keeps_release_and_commit() {
        assert_eq!(
            long_version("0.8.8+commit.dddeac2f.Linux.g++").as_deref(),
            Some("v0.8.8+commit.dddeac2f")
        );
        assert_eq!(
            long_version("v0.8.19+commit.7dd6d404").as_deref(),
            Some("v0.8.19+commit.7dd6d404")
        );
        assert_eq!(long_version("0.8.8"), None);
    }

    #[test]
    fn missing_compiler_is_reported() {
        let err = SolcBuilder::new("0.8.8")
            .with_binary("definitely-not-an-installed-solc")
            .compile(&workspace_root(), CONTRACT_SOURCE, "SimpleStorage")
            .unwrap_err();

        assert!(matches!(err, ScriptError::ContractCompilation(_)));
        assert!(err.to_string().contains("Failed to compile contract"));
    }

    #[test]
    fn missing_source_is_reported() {
        let err = SolcBuilder::new("0.8.8")
            .compile(&workspace_root(), "contracts/Missing.sol", "Missing")
            .unwrap_err();

        assert!(err.to_string().contains("cannot read contracts/Missing.sol"));
    }

    #[test]
    fn expected_version_must_match_exactly() {
        let builder = SolcBuilder::new("0.8.8");
        assert!(builder.matches_expected("v0.8.8+commit.dddeac2f"));
        assert!(!builder.matches_expected("v0.8.80+commit.00000000"));
        assert!(!builder.matches_expected("v0.8.19+commit.7dd6d404"));
    }
}
