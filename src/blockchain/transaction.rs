// src/blockchain/transaction.rs
//! Chaincode function names and the request/response records exchanged with
//! the dispatcher.

use crate::error::{LedgerError, Result};
use crate::utils::serialization::{decode_base64, deserialize};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Functions exposed by the installed chaincode.
///
/// The wire names must match the chaincode exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    /// Maintenance: removes one index.
    RemoveIndex,
    /// Maintenance: removes every index.
    RemoveAll,
    CreateDidDoc,
    GetDidDocument,
    /// Toggles a DID Document between ACTIVATED and DEACTIVATED.
    UpdateDidDocStatusInService,
    /// Moves a DID Document to REVOKED or TERMINATED.
    UpdateDidDocStatusRevocation,
    GetVcMetadata,
    CreateVcMetadata,
    UpdateVcStatus,
}

impl FunctionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionName::RemoveIndex => "remove",
            FunctionName::RemoveAll => "removeAll",
            FunctionName::CreateDidDoc => "document_registDidDoc",
            FunctionName::GetDidDocument => "document_getDidDoc",
            FunctionName::UpdateDidDocStatusInService => "document_updateDidDocStatusInService",
            FunctionName::UpdateDidDocStatusRevocation => "document_updateDidDocStatusRevocation",
            FunctionName::GetVcMetadata => "vcMeta_getVcMetadata",
            FunctionName::CreateVcMetadata => "vcMeta_registVcMetadata",
            FunctionName::UpdateVcStatus => "vcMeta_updateVcStatus",
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chaincode call.
///
/// Queries are evaluated without touching ledger state; invocations are
/// submitted for ordering and commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub function: FunctionName,
    pub arguments: Vec<String>,
    pub is_query: bool,
}

impl TransactionRequest {
    pub fn query<I, S>(function: FunctionName, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function,
            arguments: arguments.into_iter().map(Into::into).collect(),
            is_query: true,
        }
    }

    pub fn invoke<I, S>(function: FunctionName, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function,
            arguments: arguments.into_iter().map(Into::into).collect(),
            is_query: false,
        }
    }
}

/// Envelope returned by the chaincode.
///
/// `payload` is Base64; once decoded it holds the JSON of the domain object
/// the called function produces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionResponse {
    pub status: i32,
    pub message: String,
    pub payload: String,
}

impl TransactionResponse {
    /// Parses the raw bytes returned by a gateway.
    ///
    /// # Errors
    /// Returns [`LedgerError::Transaction`] if the bytes are not UTF-8 JSON
    /// of the envelope shape.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(raw).map_err(LedgerError::transaction)?;
        deserialize(text)
    }

    /// Base64-decodes the payload into its JSON text.
    pub fn decode_payload(&self) -> Result<String> {
        decode_base64(&self.payload)
    }

    /// Decodes the payload into a domain object.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        deserialize(&self.decode_payload()?)
    }
}
