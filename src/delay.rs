//! Two-phase propose/dispatch protocol over the Delay modifier.
//!
//! Propose queues an inner transaction behind the timelock; dispatch executes
//! the head of the queue once the cooldown has elapsed. The on-chain contract
//! hashes the queued entry, so dispatch calldata must reproduce the inner
//! transaction byte-for-byte — both phases are therefore derived from one
//! shared builder instead of being reconstructed independently. Cooldown and
//! expiration themselves are enforced on-chain only.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;

use crate::abi::IDelay;
use crate::deployments::AccountTopology;
use crate::errors::Error;
use crate::providers::TypedDataSigner;
use crate::registry::ContractRegistry;
use crate::typed_data::{build_modifier_tx_with_salt, resolve_salt};
use crate::types::TransactionRequest;

/// How the propose signature is laid out in calldata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignerKind {
    /// Externally-owned account: plain 65-byte ECDSA signature.
    Eoa,
    /// ERC-1271 contract wallet at the given address.
    ContractWallet(Address),
}

/// Shared inner-transaction builder for both phases.
///
/// `execTransactionFromModule(to, value, data, operation)` calldata; this is
/// the exact byte string the Delay contract hashes into its queue entry.
pub fn exec_from_module_data(inner: &TransactionRequest) -> Vec<u8> {
    IDelay::execTransactionFromModuleCall {
        to: inner.to,
        value: inner.value,
        data: inner.data.clone(),
        operation: inner.operation as u8,
    }
    .abi_encode()
}

/// Build the propose-phase transaction targeting the account's predicted
/// Delay modifier.
///
/// The signing callback is invoked exactly once. The final calldata appends
/// the replay salt and signature to the `execTransactionFromModule` bytes in
/// the layout the modifier's signature checker expects for the signer kind.
pub fn populate_delay_enqueue<S: TypedDataSigner>(
    registry: &ContractRegistry,
    account: Address,
    chain_id: u64,
    inner: &TransactionRequest,
    salt: Option<&str>,
    kind: SignerKind,
    signer: &S,
) -> Result<TransactionRequest, Error> {
    let delay = AccountTopology::new(registry, account).delay();
    let salt = resolve_salt(salt)?;
    let exec_data = exec_from_module_data(inner);

    let message = build_modifier_tx_with_salt(delay, chain_id, &exec_data, salt);
    let signature = signer.sign_typed_data(&message)?;

    let data = match kind {
        SignerKind::Eoa => eoa_calldata(exec_data, salt, &signature),
        SignerKind::ContractWallet(wallet) => {
            contract_calldata(exec_data, salt, &signature, wallet)
        }
    };
    Ok(TransactionRequest::call(delay, data))
}

/// Build the dispatch-phase transaction, re-supplying the exact inner
/// transaction used at propose time. No signature or salt is needed: the
/// contract tracks queue position internally and rejects any dispatch whose
/// inner bytes fail its hash check.
pub fn populate_delay_dispatch(
    registry: &ContractRegistry,
    account: Address,
    inner: &TransactionRequest,
) -> TransactionRequest {
    let delay = AccountTopology::new(registry, account).delay();
    let data = IDelay::executeNextTxCall {
        to: inner.to,
        value: inner.value,
        data: inner.data.clone(),
        operation: inner.operation as u8,
    }
    .abi_encode();
    TransactionRequest::call(delay, data)
}

/// `execFromModuleCalldata || salt || signature`
fn eoa_calldata(exec_data: Vec<u8>, salt: B256, signature: &[u8]) -> Vec<u8> {
    let mut buf = exec_data;
    buf.extend_from_slice(salt.as_slice());
    buf.extend_from_slice(signature);
    buf
}

/// `execFromModuleCalldata || signature || salt || r || s || v` where
/// `r` is the signer contract left-padded to 32 bytes, `s` is the byte
/// offset of the signature within the buffer and `v = 0` marks a contract
/// signature.
fn contract_calldata(
    exec_data: Vec<u8>,
    salt: B256,
    signature: &[u8],
    wallet: Address,
) -> Vec<u8> {
    let mut buf = exec_data;
    let signature_offset = buf.len();
    buf.extend_from_slice(signature);
    buf.extend_from_slice(salt.as_slice());
    buf.extend_from_slice(wallet.into_word().as_slice());
    buf.extend_from_slice(&U256::from(signature_offset).to_be_bytes::<32>());
    buf.push(0u8);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use k256::ecdsa::{signature::Signer, Signature, SigningKey};
    use std::cell::Cell;

    use crate::errors::ProviderError;
    use crate::typed_data::TypedMessage;
    use crate::types::OperationType;

    /// ECDSA test signer over the precomputed EIP-712 digest, counting how
    /// often it is invoked.
    struct TestSigner {
        key: SigningKey,
        calls: Cell<usize>,
    }

    impl TestSigner {
        fn new() -> Self {
            TestSigner {
                key: SigningKey::from_slice(&[0x42u8; 32]).unwrap(),
                calls: Cell::new(0),
            }
        }
    }

    impl TypedDataSigner for TestSigner {
        fn sign_typed_data(&self, message: &TypedMessage) -> Result<Vec<u8>, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            let signature: Signature = self.key.sign(message.digest.as_slice());
            let mut bytes = signature.to_vec();
            bytes.push(27);
            Ok(bytes)
        }
    }

    struct RejectingSigner;

    impl TypedDataSigner for RejectingSigner {
        fn sign_typed_data(&self, _message: &TypedMessage) -> Result<Vec<u8>, ProviderError> {
            Err(ProviderError::Rejected("key locked".into()))
        }
    }

    fn inner_tx() -> TransactionRequest {
        TransactionRequest {
            to: address!("1234123412341234123412341234123412341234"),
            value: U256::ZERO,
            data: Vec::new().into(),
            operation: OperationType::Call,
        }
    }

    const SALT: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    #[test]
    fn propose_signs_exactly_once_and_targets_the_delay_module() {
        let registry = ContractRegistry::default();
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let signer = TestSigner::new();

        let proposed = populate_delay_enqueue(
            &registry,
            account,
            100,
            &inner_tx(),
            Some(SALT),
            SignerKind::Eoa,
            &signer,
        )
        .unwrap();

        assert_eq!(signer.calls.get(), 1);
        assert_eq!(proposed.to, AccountTopology::new(&registry, account).delay());
        // exec calldata, then salt, then the 65-byte signature.
        let exec_data = exec_from_module_data(&inner_tx());
        assert_eq!(&proposed.data[..exec_data.len()], exec_data.as_slice());
        assert_eq!(proposed.data.len(), exec_data.len() + 32 + 65);
    }

    #[test]
    fn dispatch_reproduces_the_proposed_inner_transaction() {
        let registry = ContractRegistry::default();
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let inner = inner_tx();

        let dispatch = populate_delay_dispatch(&registry, account, &inner);
        let call = IDelay::executeNextTxCall::abi_decode(&dispatch.data, true).unwrap();
        assert_eq!(call.to, inner.to);
        assert_eq!(call.value, inner.value);
        assert_eq!(call.data.as_ref(), inner.data.as_ref());
        assert_eq!(call.operation, inner.operation as u8);

        // Mutating the inner value between phases is detectable by payload
        // comparison, standing in for the on-chain hash-mismatch rejection.
        let mut mutated = inner.clone();
        mutated.value = U256::from(1u64);
        let drifted = populate_delay_dispatch(&registry, account, &mutated);
        assert_ne!(dispatch.data, drifted.data);
    }

    #[test]
    fn contract_wallet_layout_marks_a_contract_signature() {
        let registry = ContractRegistry::default();
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let wallet = address!("c0dec0dec0dec0dec0dec0dec0dec0dec0dec0de");
        let signer = TestSigner::new();

        let proposed = populate_delay_enqueue(
            &registry,
            account,
            100,
            &inner_tx(),
            Some(SALT),
            SignerKind::ContractWallet(wallet),
            &signer,
        )
        .unwrap();

        let exec_data = exec_from_module_data(&inner_tx());
        let data = proposed.data.as_ref();
        // exec calldata || signature(65) || salt(32) || r(32) || s(32) || v(1)
        assert_eq!(data.len(), exec_data.len() + 65 + 32 + 32 + 32 + 1);
        assert_eq!(data[data.len() - 1], 0, "v byte marks a contract signature");

        let r = &data[data.len() - 65..data.len() - 33];
        assert_eq!(r, wallet.into_word().as_slice());

        let s = U256::from_be_slice(&data[data.len() - 33..data.len() - 1]);
        assert_eq!(s, U256::from(exec_data.len()), "s points at the signature");
    }

    #[test]
    fn signer_rejection_propagates_unchanged() {
        let registry = ContractRegistry::default();
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let err = populate_delay_enqueue(
            &registry,
            account,
            100,
            &inner_tx(),
            Some(SALT),
            SignerKind::Eoa,
            &RejectingSigner,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::Provider(ProviderError::Rejected("key locked".into()))
        );
    }

    #[test]
    fn malformed_salt_fails_before_signing() {
        let registry = ContractRegistry::default();
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let signer = TestSigner::new();
        let err = populate_delay_enqueue(
            &registry,
            account,
            100,
            &inner_tx(),
            Some("deadbeef"),
            SignerKind::Eoa,
            &signer,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
        assert_eq!(signer.calls.get(), 0, "no signing on construction errors");
    }
}
