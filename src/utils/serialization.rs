// src/utils/serialization.rs
//! Serialization utilities for ledger payloads.
//!
//! Provides:
//! - JSON encoding of domain objects sent as chaincode arguments
//! - Base64 decoding of the `payload` field of chaincode responses
//! - JSON decoding of decoded payloads into domain objects
//!
//! Every failure is reported as a transaction error: a payload that cannot be
//! decoded means the chaincode answered with something other than expected.

use crate::error::{LedgerError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Serializes a value to a JSON string.
///
/// # Errors
/// Returns [`LedgerError::Transaction`] if the value cannot be serialized.
pub fn serialize<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(data).map_err(LedgerError::transaction)
}

/// Deserializes a value from a JSON string.
///
/// # Errors
/// Returns [`LedgerError::Transaction`] if the JSON does not match `T`.
pub fn deserialize<T: DeserializeOwned>(data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(LedgerError::transaction)
}

/// Decodes a standard Base64 string into UTF-8 text.
///
/// # Errors
/// Returns [`LedgerError::Transaction`] if:
/// - the input is not valid Base64
/// - the decoded bytes are not valid UTF-8
pub fn decode_base64(encoded: &str) -> Result<String> {
    let bytes = base64::decode(encoded.trim()).map_err(LedgerError::transaction)?;
    String::from_utf8(bytes).map_err(LedgerError::transaction)
}

/// Encodes UTF-8 text as standard Base64.
pub fn encode_base64(text: &str) -> String {
    base64::encode(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        id: String,
        count: u32,
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("eyJpZCI6ImEifQ==").unwrap(), r#"{"id":"a"}"#);
        assert_eq!(decode_base64("").unwrap(), "");
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(matches!(
            decode_base64("not base64!!"),
            Err(LedgerError::Transaction { .. })
        ));
        // 0xff 0xfe is valid Base64 but not UTF-8
        assert!(matches!(
            decode_base64("//4="),
            Err(LedgerError::Transaction { .. })
        ));
    }

    #[test]
    fn test_deserialize_mismatch_is_transaction_error() {
        let result: Result<Sample> = deserialize(r#"{"id": 5}"#);
        assert!(matches!(result, Err(LedgerError::Transaction { .. })));
    }

    #[test]
    fn test_json_through_base64() {
        let sample = Sample { id: "vc-1".to_string(), count: 3 };
        let encoded = encode_base64(&serialize(&sample).unwrap());
        let decoded: Sample = deserialize(&decode_base64(&encoded).unwrap()).unwrap();
        assert_eq!(decoded, sample);
    }
}
