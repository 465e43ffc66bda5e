// src/contracts/mod.rs
//! Ledger client facade.
//!
//! [`ContractApi`] is the public contract applications program against. Each
//! operation becomes exactly one chaincode call; failures are always one of
//! the [`LedgerError`](crate::error::LedgerError) kinds.
//!
//! Clients are obtained through [`ContractFactory::create`], which picks the
//! implementation for a [`BlockchainType`].

pub mod credential_registry;
pub mod did_registry;
pub mod fabric;

use crate::blockchain::config::FabricConfig;
use crate::error::{LedgerError, Result};
use crate::models::credential::{VcMeta, VcStatus};
use crate::models::did::{DidDocAndStatus, DidDocStatus, DidDocument, InvokedDidDoc, RoleType};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use credential_registry::CredentialRegistry;
pub use did_registry::DidRegistry;
pub use fabric::FabricContractApi;

/// Operations on DID Documents and VC Metadata stored on a ledger.
#[async_trait]
pub trait ContractApi: Send + Sync {
    /// Registers a DID Document for a provider acting as `role`.
    async fn register_did_doc(&self, document: &InvokedDidDoc, role: RoleType) -> Result<()>;

    /// Resolves `did:<method>:<id>[?versionId=<v>]` to a document and its status.
    async fn get_did_doc(&self, did_key_url: &str) -> Result<DidDocAndStatus>;

    /// Changes the status to anything but `TERMINATED`.
    async fn update_did_doc_status(
        &self,
        did_key_url: &str,
        status: DidDocStatus,
    ) -> Result<DidDocument>;

    /// Terminates a document at the given time. Only `TERMINATED` is accepted.
    async fn update_did_doc_status_with_time(
        &self,
        did_key_url: &str,
        status: DidDocStatus,
        terminated_time: NaiveDateTime,
    ) -> Result<DidDocument>;

    async fn register_vc_metadata(&self, meta: &VcMeta) -> Result<()>;

    async fn get_vc_metadata(&self, vc_id: &str) -> Result<VcMeta>;

    async fn update_vc_status(&self, vc_id: &str, status: VcStatus) -> Result<()>;

    /// Releases every network session. Later calls fail with a connection error.
    fn close(&self);
}

/// Ledger platforms a client can be created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockchainType {
    Fabric,
}

impl BlockchainType {
    pub fn raw_value(&self) -> &'static str {
        match self {
            BlockchainType::Fabric => "fabric",
        }
    }
}

impl fmt::Display for BlockchainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_value())
    }
}

impl FromStr for BlockchainType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fabric" => Ok(BlockchainType::Fabric),
            other => Err(LedgerError::illegal_argument(format!(
                "unsupported blockchain type: {other}"
            ))),
        }
    }
}

type Constructor = fn(&FabricConfig) -> Result<Arc<dyn ContractApi>>;

fn fabric(config: &FabricConfig) -> Result<Arc<dyn ContractApi>> {
    Ok(Arc::new(FabricContractApi::new(config)?))
}

const CONSTRUCTORS: &[(BlockchainType, Constructor)] = &[(BlockchainType::Fabric, fabric)];

/// Creates ledger clients by platform.
pub struct ContractFactory;

impl ContractFactory {
    /// Builds a new client for `blockchain`.
    ///
    /// Every call returns an independent client with its own session pool.
    ///
    /// # Errors
    /// - [`LedgerError::IllegalArgument`] if no implementation is registered
    /// - [`LedgerError::Connection`] if the client cannot be set up
    pub fn create(blockchain: BlockchainType, config: &FabricConfig) -> Result<Arc<dyn ContractApi>> {
        let (_, constructor) = CONSTRUCTORS
            .iter()
            .find(|(kind, _)| *kind == blockchain)
            .ok_or_else(|| {
                LedgerError::illegal_argument(format!("no ledger client for {blockchain}"))
            })?;
        constructor(config)
    }
}
