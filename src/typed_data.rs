//! Typed signing payloads and EIP-712 digest computation.
//!
//! Two message families are produced: `SafeTx` (account transactions,
//! replay-protected by the account's sequential nonce) and `ModuleTx`
//! (modifier transactions, replay-protected by a 32-byte salt so that
//! independent delayed proposals can coexist out of order).

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::InputError;
use crate::types::TransactionRequest;

/// One field of an EIP-712 struct type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypedDataField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// EIP-712 domain restricted to the fields the target contracts bind:
/// chain id and verifying contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypedDomain {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(rename = "verifyingContract")]
    pub verifying_contract: Address,
}

/// Canonical `eth_signTypedData_v4` payload.
///
/// Immutable once built. Serializes to the JSON shape wallet RPCs expect;
/// the precomputed digest is carried alongside (not serialized) so EOA
/// signers need not re-derive the type encodings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypedMessage {
    pub domain: TypedDomain,
    #[serde(rename = "primaryType")]
    pub primary_type: &'static str,
    pub types: BTreeMap<&'static str, Vec<TypedDataField>>,
    pub message: Value,
    #[serde(skip)]
    pub digest: B256,
}

fn field(name: &'static str, kind: &'static str) -> TypedDataField {
    TypedDataField { name, kind }
}

fn domain_fields() -> Vec<TypedDataField> {
    vec![field("chainId", "uint256"), field("verifyingContract", "address")]
}

/// `keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")`
/// over the restricted domain, shared by both message families.
fn domain_separator(chain_id: u64, verifying_contract: Address) -> B256 {
    let domain_type_hash =
        keccak256(b"EIP712Domain(uint256 chainId,address verifyingContract)");
    let mut buf = Vec::with_capacity(32 * 3);
    buf.extend_from_slice(domain_type_hash.as_slice());
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(verifying_contract.into_word().as_slice());
    keccak256(buf)
}

fn eip712_digest(separator: B256, struct_hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(b"\x19\x01");
    buf.extend_from_slice(separator.as_slice());
    buf.extend_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

/// EIP-712 digest of an account transaction.
pub fn account_tx_digest(
    safe: Address,
    chain_id: u64,
    tx: &TransactionRequest,
    nonce: U256,
) -> B256 {
    let type_hash = keccak256(
        b"SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)",
    );
    let mut buf = Vec::with_capacity(32 * 11);
    buf.extend_from_slice(type_hash.as_slice());
    buf.extend_from_slice(tx.to.into_word().as_slice());
    buf.extend_from_slice(&tx.value.to_be_bytes::<32>());
    buf.extend_from_slice(keccak256(&tx.data).as_slice());
    buf.extend_from_slice(&U256::from(tx.operation as u8).to_be_bytes::<32>());
    // safeTxGas, baseGas, gasPrice, gasToken, refundReceiver are pinned to zero.
    buf.extend_from_slice(&[0u8; 32 * 5]);
    buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    eip712_digest(domain_separator(chain_id, safe), keccak256(buf))
}

/// EIP-712 digest of a modifier transaction.
pub fn modifier_tx_digest(modifier: Address, chain_id: u64, data: &[u8], salt: B256) -> B256 {
    let type_hash = keccak256(b"ModuleTx(bytes data,bytes32 salt)");
    let mut buf = Vec::with_capacity(32 * 3);
    buf.extend_from_slice(type_hash.as_slice());
    buf.extend_from_slice(keccak256(data).as_slice());
    buf.extend_from_slice(salt.as_slice());
    eip712_digest(domain_separator(chain_id, modifier), keccak256(buf))
}

/// Build the signing payload for an account transaction. The nonce is the
/// account's sequential counter; tracking it is the caller's concern.
pub fn build_account_tx(
    safe: Address,
    chain_id: u64,
    tx: &TransactionRequest,
    nonce: U256,
) -> TypedMessage {
    let mut types = BTreeMap::new();
    types.insert("EIP712Domain", domain_fields());
    types.insert(
        "SafeTx",
        vec![
            field("to", "address"),
            field("value", "uint256"),
            field("data", "bytes"),
            field("operation", "uint8"),
            field("safeTxGas", "uint256"),
            field("baseGas", "uint256"),
            field("gasPrice", "uint256"),
            field("gasToken", "address"),
            field("refundReceiver", "address"),
            field("nonce", "uint256"),
        ],
    );
    TypedMessage {
        domain: TypedDomain {
            chain_id,
            verifying_contract: safe,
        },
        primary_type: "SafeTx",
        types,
        message: json!({
            "to": tx.to.to_string(),
            "value": tx.value.to_string(),
            "data": format!("0x{}", hex::encode(&tx.data)),
            "operation": tx.operation as u8,
            "safeTxGas": "0",
            "baseGas": "0",
            "gasPrice": "0",
            "gasToken": Address::ZERO.to_string(),
            "refundReceiver": Address::ZERO.to_string(),
            "nonce": nonce.to_string(),
        }),
        digest: account_tx_digest(safe, chain_id, tx, nonce),
    }
}

/// Build the signing payload for a modifier transaction from an
/// already-validated salt.
pub fn build_modifier_tx_with_salt(
    modifier: Address,
    chain_id: u64,
    data: &[u8],
    salt: B256,
) -> TypedMessage {
    let mut types = BTreeMap::new();
    types.insert("EIP712Domain", domain_fields());
    types.insert(
        "ModuleTx",
        vec![field("data", "bytes"), field("salt", "bytes32")],
    );
    TypedMessage {
        domain: TypedDomain {
            chain_id,
            verifying_contract: modifier,
        },
        primary_type: "ModuleTx",
        types,
        message: json!({
            "data": format!("0x{}", hex::encode(data)),
            "salt": salt.to_string(),
        }),
        digest: modifier_tx_digest(modifier, chain_id, data, salt),
    }
}

/// Build the signing payload for a modifier transaction, validating the
/// salt shape at construction time. A missing salt defaults to a
/// timestamp-derived value so proposals made at different times never
/// collide; an explicit salt makes a submission intentionally idempotent.
pub fn build_modifier_tx(
    modifier: Address,
    chain_id: u64,
    data: &[u8],
    salt: Option<&str>,
) -> Result<TypedMessage, InputError> {
    let salt = resolve_salt(salt)?;
    Ok(build_modifier_tx_with_salt(modifier, chain_id, data, salt))
}

/// Validate a salt string: exactly 32 bytes of hex, `0x` prefix optional.
pub fn parse_salt(raw: &str) -> Result<B256, InputError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.len() != 64 {
        return Err(InputError::InvalidSalt(raw.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| InputError::InvalidSalt(raw.to_string()))?;
    Ok(B256::from_slice(&bytes))
}

/// Parse the caller's salt or fall back to the timestamp-derived default.
pub fn resolve_salt(salt: Option<&str>) -> Result<B256, InputError> {
    match salt {
        Some(raw) => parse_salt(raw),
        None => Ok(default_salt()),
    }
}

/// 32-byte salt derived from the current wall clock (millisecond unix time,
/// big-endian in the low bytes).
pub fn default_salt() -> B256 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    B256::from(U256::from(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use crate::types::OperationType;

    fn sample_tx() -> TransactionRequest {
        TransactionRequest {
            to: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            value: U256::from(7u64),
            data: vec![0xde, 0xad].into(),
            operation: OperationType::Call,
        }
    }

    #[test]
    fn salt_shape_is_validated_at_construction() {
        let modifier = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        assert!(matches!(
            build_modifier_tx(modifier, 100, &[0x01], Some("not-32-bytes")),
            Err(InputError::InvalidSalt(_))
        ));

        let bare = "aa".repeat(32);
        let prefixed = format!("0x{bare}");
        assert!(build_modifier_tx(modifier, 100, &[0x01], Some(&bare)).is_ok());
        assert!(build_modifier_tx(modifier, 100, &[0x01], Some(&prefixed)).is_ok());
        // 32 bytes of non-hex is still rejected.
        assert!(parse_salt(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn account_tx_digest_binds_the_nonce() {
        let safe = address!("cccccccccccccccccccccccccccccccccccccccc");
        let tx = sample_tx();
        let a = account_tx_digest(safe, 100, &tx, U256::from(0u64));
        let b = account_tx_digest(safe, 100, &tx, U256::from(1u64));
        assert_ne!(a, b);
        assert_eq!(a, account_tx_digest(safe, 100, &tx, U256::from(0u64)));
    }

    #[test]
    fn modifier_tx_digest_binds_salt_and_domain() {
        let modifier = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let salt_a = B256::repeat_byte(0x01);
        let salt_b = B256::repeat_byte(0x02);
        let base = modifier_tx_digest(modifier, 100, &[0xab], salt_a);
        assert_ne!(base, modifier_tx_digest(modifier, 100, &[0xab], salt_b));
        assert_ne!(base, modifier_tx_digest(modifier, 101, &[0xab], salt_a));
    }

    #[test]
    fn account_tx_serializes_to_typed_data_json() {
        let safe = address!("cccccccccccccccccccccccccccccccccccccccc");
        let message = build_account_tx(safe, 100, &sample_tx(), U256::from(3u64));
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["primaryType"], "SafeTx");
        assert_eq!(value["domain"]["chainId"], 100);
        assert_eq!(value["message"]["data"], "0xdead");
        assert_eq!(value["message"]["nonce"], "3");
        assert_eq!(value["message"]["safeTxGas"], "0");
        assert_eq!(value["types"]["SafeTx"][0]["name"], "to");
        // The digest travels out of band, never inside the payload.
        assert!(value.get("digest").is_none());
    }

    #[test]
    fn modifier_tx_message_carries_the_salt() {
        let modifier = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let salt = "11".repeat(32);
        let message = build_modifier_tx(modifier, 100, &[0x01, 0x02], Some(&salt)).unwrap();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["primaryType"], "ModuleTx");
        assert_eq!(
            value["message"]["salt"],
            format!("0x{}", "11".repeat(32))
        );
    }
}
