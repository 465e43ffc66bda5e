// src/models/credential.rs
//! Verifiable Credential metadata as recorded on the ledger.
//!
//! The ledger never stores credentials themselves, only metadata about them
//! (issuer, subject, schema, validity and status), so that verifiers can check
//! whether a presented credential is still usable.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Status of a Verifiable Credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VcStatus {
    Active,
    Inactive,
    Revoked,
}

impl VcStatus {
    /// Wire value passed to the chaincode.
    pub fn raw_value(&self) -> &'static str {
        match self {
            VcStatus::Active => "ACTIVE",
            VcStatus::Inactive => "INACTIVE",
            VcStatus::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for VcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_value())
    }
}

impl FromStr for VcStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(VcStatus::Active),
            "INACTIVE" => Ok(VcStatus::Inactive),
            "REVOKED" => Ok(VcStatus::Revoked),
            other => Err(LedgerError::illegal_argument(format!("unknown VC status: {other}"))),
        }
    }
}

/// Metadata of an issued Verifiable Credential.
///
/// `issuer`, `credential_schema` and the other nested members are kept as raw
/// JSON; their schema belongs to the credential data model, not to the ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VcMeta {
    /// Unique credential identifier.
    /// Example: "urn:uuid:123e4567-e89b-12d3-a456-426614174000"
    pub id: String,

    #[serde(default)]
    pub issuer: Value,

    /// DID of the credential subject.
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub credential_schema: Value,

    pub status: VcStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VcMeta {
    /// Creates metadata with the given id and subject in the `Active` state.
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            issuer: Value::Null,
            subject: subject.into(),
            credential_schema: Value::Null,
            status: VcStatus::Active,
            issuance_date: None,
            valid_from: None,
            valid_until: None,
            format_version: None,
            language: None,
            extra: Map::new(),
        }
    }
}
