//! Relay-ready calldata for deploying and configuring a topology.
//!
//! Deployment goes through the public factories and can be submitted by
//! anyone; configuration must be executed by the account itself and is
//! therefore returned as a batch to be routed through `execTransaction`
//! with an owner signature over the corresponding `SafeTx` payload.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

use crate::abi::{ISafe, ISafeProxyFactory};
use crate::batch::{encode_multi_send, encode_multi_send_call_only};
use crate::deployments::{
    account_setup_initializer, bouncer_setup_calldata, delay_setup_calldata,
    populate_module_deployment, roles_setup_calldata, AccountKind, AccountTopology,
};
use crate::errors::InputError;
use crate::registry::ContractRegistry;
use crate::types::TransactionRequest;

/// Sentinel head of the Safe owner linked list, used by `swapOwner`.
const SENTINEL_OWNERS: Address = Address::with_last_byte(1);

/// Account creation through the proxy factory. The salt nonce committed
/// here is the same constant the address derivation hashes, so the proxy
/// lands exactly on the predicted address.
pub fn populate_account_creation(
    registry: &ContractRegistry,
    owners: &[Address],
    threshold: u64,
    kind: AccountKind,
) -> TransactionRequest {
    let initializer = account_setup_initializer(registry, owners, threshold);
    let data = ISafeProxyFactory::createProxyWithNonceCall {
        singleton: registry.safe_mastercopy,
        initializer: initializer.into(),
        saltNonce: U256::from_be_bytes(kind.creation_nonce().0),
    }
    .abi_encode();
    TransactionRequest::call(registry.safe_proxy_factory, data)
}

/// One call-only batch deploying the delay, roles and bouncer proxies for
/// an account. Safe to submit from any relayer.
pub fn populate_topology_deployment(
    registry: &ContractRegistry,
    account: Address,
) -> Result<TransactionRequest, InputError> {
    let topology = AccountTopology::new(registry, account);
    let deployments = vec![
        populate_module_deployment(
            registry,
            registry.delay_mastercopy,
            delay_setup_calldata(account),
        ),
        populate_module_deployment(
            registry,
            registry.bouncer_mastercopy,
            bouncer_setup_calldata(account),
        ),
        populate_module_deployment(
            registry,
            registry.roles_mastercopy,
            roles_setup_calldata(account, topology.bouncer()),
        ),
    ];
    encode_multi_send_call_only(registry, &deployments)
}

/// The account's self-configuration batch: enable both modules, set the
/// delay cooldown and hand the owner slot to the placeholder. Returned as
/// a delegate-call multisend to be executed through the account; sign the
/// matching `SafeTx` payload and wrap it with [`populate_exec_transaction`].
pub fn populate_account_configuration(
    registry: &ContractRegistry,
    account: Address,
    current_owner: Address,
    cooldown: u64,
) -> TransactionRequest {
    let topology = AccountTopology::new(registry, account);
    let delay = topology.delay();

    let calls = vec![
        TransactionRequest::call(
            account,
            ISafe::enableModuleCall { module: delay }.abi_encode(),
        ),
        TransactionRequest::call(
            account,
            ISafe::enableModuleCall {
                module: topology.roles(),
            }
            .abi_encode(),
        ),
        TransactionRequest::call(
            delay,
            crate::abi::IDelay::setTxCooldownCall {
                cooldown: U256::from(cooldown),
            }
            .abi_encode(),
        ),
        TransactionRequest::call(
            account,
            ISafe::swapOwnerCall {
                prevOwner: SENTINEL_OWNERS,
                oldOwner: current_owner,
                newOwner: registry.placeholder_owner,
            }
            .abi_encode(),
        ),
    ];
    encode_multi_send(registry, &calls)
}

/// Wrap a signed inner transaction into `execTransaction` calldata against
/// the account. Gas fields mirror the signed `SafeTx` payload: all zero.
pub fn populate_exec_transaction(
    account: Address,
    inner: &TransactionRequest,
    signatures: Vec<u8>,
) -> TransactionRequest {
    let data = ISafe::execTransactionCall {
        to: inner.to,
        value: inner.value,
        data: inner.data.clone(),
        operation: inner.operation as u8,
        safeTxGas: U256::ZERO,
        baseGas: U256::ZERO,
        gasPrice: U256::ZERO,
        gasToken: Address::ZERO,
        refundReceiver: Address::ZERO,
        signatures: signatures.into(),
    }
    .abi_encode();
    TransactionRequest::call(account, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    use crate::types::OperationType;

    #[test]
    fn creation_commits_to_the_predicted_address_inputs() {
        let registry = ContractRegistry::default();
        let owner = address!("1111111111111111111111111111111111111111");

        let creation =
            populate_account_creation(&registry, &[owner], 1, AccountKind::Primary);
        assert_eq!(creation.to, registry.safe_proxy_factory);

        let call =
            ISafeProxyFactory::createProxyWithNonceCall::abi_decode(&creation.data, true)
                .unwrap();
        assert_eq!(call.singleton, registry.safe_mastercopy);
        assert_eq!(
            call.initializer.as_ref(),
            account_setup_initializer(&registry, &[owner], 1).as_slice()
        );
        assert_eq!(
            call.saltNonce,
            U256::from_be_bytes(AccountKind::Primary.creation_nonce().0)
        );
    }

    #[test]
    fn topology_deployment_is_a_call_only_batch() {
        let registry = ContractRegistry::default();
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let batch = populate_topology_deployment(&registry, account).unwrap();
        assert_eq!(batch.to, registry.multi_send_call_only);
        assert_eq!(batch.operation, OperationType::Call);
    }

    #[test]
    fn configuration_batch_is_self_delegated() {
        let registry = ContractRegistry::default();
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let owner = address!("1111111111111111111111111111111111111111");
        let batch = populate_account_configuration(&registry, account, owner, 180);
        assert_eq!(batch.to, registry.multi_send);
        assert_eq!(batch.operation, OperationType::DelegateCall);
    }

    #[test]
    fn exec_transaction_reproduces_the_signed_fields() {
        let account = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
        let inner = TransactionRequest {
            to: address!("2222222222222222222222222222222222222222"),
            value: U256::from(5u64),
            data: vec![0x01].into(),
            operation: OperationType::DelegateCall,
        };
        let wrapped = populate_exec_transaction(account, &inner, vec![0xaa; 65]);
        let call = ISafe::execTransactionCall::abi_decode(&wrapped.data, true).unwrap();
        assert_eq!(call.to, inner.to);
        assert_eq!(call.value, inner.value);
        assert_eq!(call.operation, 1);
        assert_eq!(call.safeTxGas, U256::ZERO);
        assert_eq!(call.signatures.len(), 65);
    }
}
