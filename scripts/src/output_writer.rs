use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use alloy::hex;
use json::JsonValue;

use crate::{build::Artifact, errors::ScriptError};

/// Path of the artifact file of `contract_name` inside `artifacts_dir`
pub fn artifact_path(artifacts_dir: &Path, contract_name: &str) -> PathBuf {
    artifacts_dir.join(format!("{contract_name}.json"))
}

/// Writes the given artifact, creating the artifacts directory if needed
pub fn write_artifact(artifacts_dir: &Path, artifact: &Artifact) -> Result<PathBuf, ScriptError> {
    fs::create_dir_all(artifacts_dir).map_err(|e| ScriptError::ArtifactOutput(e.to_string()))?;

    // Keep the abi as a json array rather than an encoded string
    let abi = json::parse(&artifact.abi).map_err(|e| ScriptError::ArtifactOutput(e.to_string()))?;

    let mut content = JsonValue::new_object();
    content["contractName"] = artifact.contract_name.as_str().into();
    content["sourceName"] = artifact.source_name.as_str().into();
    content["compiler"] = artifact.compiler_version.as_str().into();
    content["abi"] = abi;
    content["bytecode"] = format!("0x{}", hex::encode(&artifact.bytecode)).into();
    content["source"] = artifact.source.as_str().into();

    let file_path = artifact_path(artifacts_dir, &artifact.contract_name);
    fs::write(&file_path, json::stringify_pretty(content, 4))
        .map_err(|e| ScriptError::ArtifactOutput(e.to_string()))?;

    Ok(file_path)
}

/// Read back the artifact of `contract_name`
pub fn read_artifact(artifacts_dir: &Path, contract_name: &str) -> Result<Artifact, ScriptError> {
    let file_path = artifact_path(artifacts_dir, contract_name);
    if !file_path.exists() {
        return Err(ScriptError::ArtifactOutput(format!(
            "{} not found, run the compile command first",
            file_path.display()
        )));
    }

    let parsed_json = get_json_from_file(&file_path)?;
    let field = |key: &str| {
        parsed_json[key]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ScriptError::ArtifactOutput(format!("missing '{key}' in artifact")))
    };

    let bytecode = hex::decode(field("bytecode")?)
        .map_err(|e| ScriptError::ArtifactOutput(e.to_string()))?
        .into();

    Ok(Artifact {
        contract_name: field("contractName")?,
        source_name: field("sourceName")?,
        source: field("source")?,
        abi: parsed_json["abi"].dump(),
        bytecode,
        compiler_version: field("compiler")?,
    })
}

/// Parses the JSON file at the given path
fn get_json_from_file(file_path: &Path) -> Result<JsonValue, ScriptError> {
    let mut file_contents = String::new();
    File::open(file_path)
        .map_err(|e| ScriptError::ArtifactOutput(e.to_string()))?
        .read_to_string(&mut file_contents)
        .map_err(|e| ScriptError::ArtifactOutput(e.to_string()))?;

    json::parse(&file_contents).map_err(|e| ScriptError::ArtifactOutput(e.to_string()))
}
