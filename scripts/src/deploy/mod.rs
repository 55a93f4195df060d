//! Contract creation and confirmation tracking

use std::time::Duration;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, TxHash},
    providers::Provider,
    rpc::types::TransactionRequest,
};
use tracing::{debug, info};

use crate::{build::Artifact, errors::ScriptError, tx::client::RpcProvider};

/// A confirmed contract creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
    /// Block the creation transaction was included in
    pub block_number: u64,
    pub gas_used: u64,
    /// Effective gas price paid, in wei
    pub gas_price: u128,
}

/// Deploy a compiled contract and wait for its creation to be mined
pub async fn deploy_contract(
    artifact: &Artifact,
    client: &RpcProvider,
) -> Result<Deployment, ScriptError> {
    let tx_request = TransactionRequest::default().with_deploy_code(artifact.bytecode.clone());

    let pending_tx = client
        .send_transaction(tx_request)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
    info!(
        "Pending {} creation... {}",
        artifact.contract_name,
        pending_tx.tx_hash()
    );

    let receipt = pending_tx
        .with_required_confirmations(1)
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "creation transaction {} reverted",
            receipt.transaction_hash
        )));
    }
    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(String::from("no contract address in receipt"))
    })?;
    let block_number = receipt.block_number.ok_or_else(|| {
        ScriptError::ContractDeployment(String::from("no block number in receipt"))
    })?;

    Ok(Deployment {
        address,
        tx_hash: receipt.transaction_hash,
        block_number,
        gas_used: receipt.gas_used,
        gas_price: receipt.effective_gas_price,
    })
}

/// Block height at which a transaction mined in `tx_block` has `confirmations` confirmations
pub fn confirmation_height(tx_block: u64, confirmations: u64) -> u64 {
    // Inclusion counts as the first confirmation
    tx_block + confirmations.saturating_sub(1)
}

/// Poll the chain height until the transaction mined in `tx_block` has enough
/// confirmations, returning the height observed last
pub async fn wait_for_confirmations(
    client: &RpcProvider,
    tx_block: u64,
    confirmations: u64,
    poll_interval: Duration,
) -> Result<u64, ScriptError> {
    // The transaction is already mined here and a receipt watcher returns as soon as a
    // receipt exists, so depth is counted from the chain height instead
    let target = confirmation_height(tx_block, confirmations);
    loop {
        let current = client
            .get_block_number()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if current >= target {
            return Ok(current);
        }

        debug!("At block {}, waiting for block {}", current, target);
        tokio::time::sleep(poll_interval).await;
    }
}
