//! Capability traits injected by the caller.
//!
//! Signing and chain reads are the only two points where this crate touches
//! the outside world. Both are synchronous single-shot calls; cancellation,
//! timeouts and retry policy belong to the implementations.

use alloy_primitives::Address;

use crate::errors::ProviderError;
use crate::typed_data::TypedMessage;

/// Signs EIP-712 payloads on behalf of the caller.
///
/// Invoked exactly once per propose call and never on dispatch. The returned
/// bytes must verify under the target chain's typed-data scheme for the
/// signer kind in use (a 65-byte ECDSA signature for an EOA, an ERC-1271
/// blob for a contract wallet).
pub trait TypedDataSigner {
    fn sign_typed_data(&self, message: &TypedMessage) -> Result<Vec<u8>, ProviderError>;
}

/// Single read against current chain state.
///
/// There is no block-consistency guarantee across separate calls, which is
/// why the integrity evaluator bundles all of its reads into one aggregate
/// request.
pub trait ReadProvider {
    fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, ProviderError>;
}
