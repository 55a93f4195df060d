use alloy::primitives::{Address, U256};

use crate::{
    errors::ScriptError,
    tx::{abi::ISimpleStorage, client::RpcProvider},
};

/// Read the value currently held by a SimpleStorage contract
pub async fn retrieve(contract_address: Address, client: RpcProvider) -> Result<U256, ScriptError> {
    // Build our contract
    let contract = ISimpleStorage::new(contract_address, client);

    // Read the smart contract
    contract
        .retrieve()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
}
