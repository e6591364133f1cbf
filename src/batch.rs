//! Batched-transaction encoding against the MultiSend entry points.

use alloy_primitives::U256;
use alloy_sol_types::SolCall;

use crate::abi::IMultiSend;
use crate::errors::InputError;
use crate::registry::ContractRegistry;
use crate::types::{OperationType, TransactionRequest};

/// Pack an ordered list of calls into one self-delegating batch.
///
/// Input order is execution order: a later entry only executes if every
/// earlier entry in the batch succeeded. An empty list encodes to a legal
/// no-op batch.
pub fn encode_multi_send(
    registry: &ContractRegistry,
    transactions: &[TransactionRequest],
) -> TransactionRequest {
    TransactionRequest {
        to: registry.multi_send,
        value: U256::ZERO,
        data: multi_send_data(transactions).into(),
        // Delegated so the inner calls read as if issued by the account itself.
        operation: OperationType::DelegateCall,
    }
}

/// Call-only batch for relayer submission. Rejects inner delegate calls,
/// mirroring the MultiSendCallOnly contract.
pub fn encode_multi_send_call_only(
    registry: &ContractRegistry,
    transactions: &[TransactionRequest],
) -> Result<TransactionRequest, InputError> {
    if transactions
        .iter()
        .any(|tx| tx.operation == OperationType::DelegateCall)
    {
        return Err(InputError::DelegateCallInBatch);
    }
    Ok(TransactionRequest {
        to: registry.multi_send_call_only,
        value: U256::ZERO,
        data: multi_send_data(transactions).into(),
        operation: OperationType::Call,
    })
}

/// `operation (1) || to (20) || value (32) || len(data) (32) || data`,
/// concatenated in input order, wrapped in a `multiSend` call.
fn multi_send_data(transactions: &[TransactionRequest]) -> Vec<u8> {
    let mut packed = Vec::new();
    for tx in transactions {
        packed.push(tx.operation as u8);
        packed.extend_from_slice(tx.to.as_slice());
        packed.extend_from_slice(&tx.value.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(tx.data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(&tx.data);
    }
    IMultiSend::multiSendCall {
        transactions: packed.into(),
    }
    .abi_encode()
}
