// src/error.rs
//! Error taxonomy for the ledger client.
//!
//! Every public operation reports failures through [`LedgerError`]. Low-level
//! causes (I/O, HTTP, timeouts, malformed payloads) are wrapped into one of a
//! small closed set of kinds, each carrying a stable machine-readable code.

use std::fmt;
use thiserror::Error;

/// Boxed underlying cause wrapped by [`LedgerError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Prefix shared by every error code issued by this crate.
const PREFIX_CODE: &str = "SSDKBCS";

/// Stable error codes for the failure kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A gateway session could not be created or acquired.
    ConnectionError,
    /// The remote function invocation or evaluation failed.
    TransactionError,
    /// A DID key URL could not be parsed.
    DidKeyUrlParsingError,
}

impl ErrorCode {
    /// Full code, e.g. `SSDKBCS00001`.
    pub fn code(&self) -> String {
        let suffix = match self {
            ErrorCode::ConnectionError => "00001",
            ErrorCode::TransactionError => "00002",
            ErrorCode::DidKeyUrlParsingError => "00003",
        };
        format!("{PREFIX_CODE}{suffix}")
    }

    /// Human readable message for the code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ConnectionError => "Failed to connect to fabric network",
            ErrorCode::TransactionError => "Failed to execute smart contract transaction",
            ErrorCode::DidKeyUrlParsingError => "Invalid did key url",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode: {}, Message: {}", self.code(), self.message())
    }
}

/// Errors returned by the ledger client.
///
/// `Connection`, `Transaction` and `MalformedIdentifier` wrap the underlying
/// cause. `IllegalArgument` is raised before any network call when a caller
/// violates an operation's preconditions.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{}, Reason: {source}", ErrorCode::ConnectionError)]
    Connection {
        #[source]
        source: BoxError,
    },

    #[error("{}, Reason: {source}", ErrorCode::TransactionError)]
    Transaction {
        #[source]
        source: BoxError,
    },

    #[error("{}, Reason: {source}", ErrorCode::DidKeyUrlParsingError)]
    MalformedIdentifier {
        #[source]
        source: BoxError,
    },

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
}

impl LedgerError {
    pub fn connection(cause: impl Into<BoxError>) -> Self {
        LedgerError::Connection { source: cause.into() }
    }

    pub fn transaction(cause: impl Into<BoxError>) -> Self {
        LedgerError::Transaction { source: cause.into() }
    }

    pub fn malformed_identifier(cause: impl Into<BoxError>) -> Self {
        LedgerError::MalformedIdentifier { source: cause.into() }
    }

    pub fn illegal_argument(message: impl Into<String>) -> Self {
        LedgerError::IllegalArgument(message.into())
    }

    /// Stable error code, or `None` for precondition violations.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            LedgerError::Connection { .. } => Some(ErrorCode::ConnectionError),
            LedgerError::Transaction { .. } => Some(ErrorCode::TransactionError),
            LedgerError::MalformedIdentifier { .. } => Some(ErrorCode::DidKeyUrlParsingError),
            LedgerError::IllegalArgument(_) => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
