//! Core data model shared across the kit.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Serialize, Serializer};

use crate::errors::InputError;

/// Operation type of a single call, matching the Safe `operation` byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OperationType {
    Call = 0,
    DelegateCall = 1,
}

impl Serialize for OperationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A ready-to-broadcast `{to, value, data, operation}` payload.
///
/// Every `populate_*` function in this crate returns one of these;
/// submission, gas estimation and confirmation live outside the crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: OperationType,
}

impl TransactionRequest {
    /// Plain call with no value attached.
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        TransactionRequest {
            to,
            value: U256::ZERO,
            data: data.into(),
            operation: OperationType::Call,
        }
    }
}

/// Parse an address string, enforcing the EIP-55 checksum when the input
/// is mixed-case. Single-case inputs carry no checksum and are accepted
/// as plain hex.
pub fn parse_address(raw: &str) -> Result<Address, InputError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(InputError::InvalidAddress(raw.to_string()));
    }
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower {
        return Address::parse_checksummed(format!("0x{digits}"), None)
            .map_err(|_| InputError::InvalidAddress(raw.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| InputError::InvalidAddress(raw.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn parses_lowercase_addresses() {
        let parsed = parse_address("0xca11bde05977b3631167028862be2a173976ca11").unwrap();
        assert_eq!(parsed, address!("ca11bde05977b3631167028862be2a173976ca11"));
    }

    #[test]
    fn enforces_checksum_on_mixed_case() {
        // Valid EIP-55 checksum for the Multicall3 deployment.
        assert!(parse_address("0xcA11bde05977b3631167028862bE2a173976CA11").is_ok());
        // One flipped case makes the checksum invalid.
        assert!(parse_address("0xCa11bde05977b3631167028862bE2a173976CA11").is_err());
    }

    #[test]
    fn rejects_short_and_garbage_input() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("not-an-address").is_err());
    }

    #[test]
    fn operation_serializes_as_byte() {
        assert_eq!(serde_json::to_string(&OperationType::Call).unwrap(), "0");
        assert_eq!(serde_json::to_string(&OperationType::DelegateCall).unwrap(), "1");
    }
}
