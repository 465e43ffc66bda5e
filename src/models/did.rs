// src/models/did.rs
//! DID Document data model as recorded on the ledger.
//!
//! The chaincode owns the full document schema; this crate only needs the
//! fields it routes on and must never drop anything else. Every struct
//! therefore keeps unrecognised members in a flattened `extra` map.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a registered DID Document.
///
/// `Activated` and `Deactivated` are reversible in-service states.
/// `Revoked` and `Terminated` are terminal and recorded through the
/// revocation path of the chaincode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DidDocStatus {
    Activated,
    Deactivated,
    Revoked,
    Terminated,
}

impl DidDocStatus {
    /// Wire value passed to the chaincode.
    pub fn raw_value(&self) -> &'static str {
        match self {
            DidDocStatus::Activated => "ACTIVATED",
            DidDocStatus::Deactivated => "DEACTIVATED",
            DidDocStatus::Revoked => "REVOKED",
            DidDocStatus::Terminated => "TERMINATED",
        }
    }

    /// Whether the change is a one-way revocation rather than a service toggle.
    pub fn is_revocation(&self) -> bool {
        matches!(self, DidDocStatus::Revoked | DidDocStatus::Terminated)
    }
}

impl fmt::Display for DidDocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_value())
    }
}

impl FromStr for DidDocStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVATED" => Ok(DidDocStatus::Activated),
            "DEACTIVATED" => Ok(DidDocStatus::Deactivated),
            "REVOKED" => Ok(DidDocStatus::Revoked),
            "TERMINATED" => Ok(DidDocStatus::Terminated),
            other => Err(LedgerError::illegal_argument(format!(
                "unknown DID document status: {other}"
            ))),
        }
    }
}

/// Role of the entity registering a DID Document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    Tas,
    Wallet,
    Issuer,
    Verifier,
    WalletProvider,
    AppProvider,
    ListProvider,
    OpProvider,
    KycProvider,
    NotificationProvider,
    LogProvider,
    PortalProvider,
    DelegationProvider,
    StorageProvider,
    BackupProvider,
    Etc,
}

impl RoleType {
    const ALL: [RoleType; 16] = [
        RoleType::Tas,
        RoleType::Wallet,
        RoleType::Issuer,
        RoleType::Verifier,
        RoleType::WalletProvider,
        RoleType::AppProvider,
        RoleType::ListProvider,
        RoleType::OpProvider,
        RoleType::KycProvider,
        RoleType::NotificationProvider,
        RoleType::LogProvider,
        RoleType::PortalProvider,
        RoleType::DelegationProvider,
        RoleType::StorageProvider,
        RoleType::BackupProvider,
        RoleType::Etc,
    ];

    /// Wire value passed to the chaincode.
    pub fn raw_value(&self) -> &'static str {
        match self {
            RoleType::Tas => "Tas",
            RoleType::Wallet => "Wallet",
            RoleType::Issuer => "Issuer",
            RoleType::Verifier => "Verifier",
            RoleType::WalletProvider => "WalletProvider",
            RoleType::AppProvider => "AppProvider",
            RoleType::ListProvider => "ListProvider",
            RoleType::OpProvider => "OpProvider",
            RoleType::KycProvider => "KycProvider",
            RoleType::NotificationProvider => "NotificationProvider",
            RoleType::LogProvider => "LogProvider",
            RoleType::PortalProvider => "PortalProvider",
            RoleType::DelegationProvider => "DelegationProvider",
            RoleType::StorageProvider => "StorageProvider",
            RoleType::BackupProvider => "BackupProvider",
            RoleType::Etc => "Etc",
        }
    }
}

impl FromStr for RoleType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.raw_value().eq_ignore_ascii_case(s))
            .ok_or_else(|| LedgerError::illegal_argument(format!("unknown role type: {s}")))
    }
}

/// A DID Document as returned by the ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// The DID the document describes, e.g. `did:omn:issuer`.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,

    /// Members not modelled here (verification methods, proofs, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A DID Document submitted for registration together with the proofs of
/// the controller that invoked it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvokedDidDoc {
    /// Multibase-encoded DID Document.
    pub did_doc: String,

    #[serde(default)]
    pub proof: Value,

    #[serde(default)]
    pub controller: Value,

    #[serde(default)]
    pub nonce: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A DID Document together with its current ledger status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocAndStatus {
    pub document: DidDocument,
    pub status: DidDocStatus,

    /// Set once the document has been terminated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated_time: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
