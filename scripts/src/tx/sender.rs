use alloy::{
    primitives::{Address, U256},
    rpc::types::TransactionReceipt,
};
use tracing::info;

use crate::{
    errors::ScriptError,
    tx::{abi::ISimpleStorage, client::RpcProvider},
};

/// Store a new value, waiting for `confirmations` blocks before returning
pub async fn send_store(
    contract_address: Address,
    value: U256,
    confirmations: u64,
    client: RpcProvider,
) -> Result<TransactionReceipt, ScriptError> {
    let contract = ISimpleStorage::new(contract_address, client);

    // Send it
    let pending_tx = contract
        .store(value)
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    info!("Pending store transaction... {}", pending_tx.tx_hash());

    // Wait for the transaction to be included.
    let receipt = pending_tx
        .with_required_confirmations(confirmations)
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "store transaction {} reverted",
            receipt.transaction_hash
        )));
    }
    info!(
        "Store tx done on block: {}",
        receipt.block_number.unwrap_or_default()
    );

    Ok(receipt)
}
