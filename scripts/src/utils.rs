//! Utilities for the deploy scripts.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use tracing::debug;

use crate::errors::ScriptError;

/// Root of the workspace, holding `contracts/` and `artifacts/`
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Executes a command, returning its standard output or an error if the command fails
pub fn command_output_or(mut cmd: Command, err_msg: &str) -> Result<String, ScriptError> {
    debug!("Running command: {:?}", cmd);
    let output = cmd
        .output()
        .map_err(|e| ScriptError::ContractCompilation(format!("{err_msg}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScriptError::ContractCompilation(format!(
            "{err_msg}: {}",
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| ScriptError::ContractCompilation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_root_holds_the_contracts() {
        assert!(workspace_root().join("contracts").is_dir());
    }

    #[test]
    fn missing_binary_is_a_compilation_error() {
        let cmd = Command::new("definitely-not-an-installed-binary");
        let err = command_output_or(cmd, "Failed to run").unwrap_err();

        assert!(matches!(err, ScriptError::ContractCompilation(_)));
        assert!(err.to_string().contains("Failed to run"));
    }
}
