// src/contracts/credential_registry.rs
//! Credential Registry chaincode interface.
//!
//! Provides a high-level API for the VC Metadata records kept on the ledger.
//! Supports registering metadata, looking it up by credential id and changing
//! the credential status.

use crate::blockchain::dispatcher::TransactionDispatcher;
use crate::blockchain::gateway::GatewayFactory;
use crate::blockchain::transaction::{FunctionName, TransactionRequest};
use crate::error::Result;
use crate::models::credential::{VcMeta, VcStatus};
use crate::utils::serialization::serialize;
use log::info;
use std::sync::Arc;

/// Credential Registry chaincode wrapper.
///
/// This struct provides methods to interact with the VC Metadata functions:
/// - Register new credential metadata
/// - Look up metadata by credential id
/// - Update the credential status
///
/// # Type Parameters
/// * `F` - Factory producing the gateway sessions the calls run on
pub struct CredentialRegistry<F: GatewayFactory> {
    /// Shared dispatcher, also used by the DID registry
    dispatcher: Arc<TransactionDispatcher<F>>,
}

impl<F: GatewayFactory> CredentialRegistry<F> {
    /// Creates a new CredentialRegistry instance.
    ///
    /// # Arguments
    /// * `dispatcher` - Dispatcher bound to the OpenDID chaincode
    pub fn new(dispatcher: Arc<TransactionDispatcher<F>>) -> Self {
        CredentialRegistry { dispatcher }
    }

    /// Registers credential metadata on the ledger.
    ///
    /// # Arguments
    /// * `meta` - Metadata of the issued credential
    ///
    /// # Errors
    /// Returns a transaction error if the submit fails or is not committed
    /// within the commit timeout.
    pub async fn register(&self, meta: &VcMeta) -> Result<()> {
        let request = TransactionRequest::invoke(FunctionName::CreateVcMetadata, [serialize(meta)?]);
        self.dispatcher.execute(&request).await?;
        info!("registered VC metadata {}", meta.id);
        Ok(())
    }

    /// Looks up credential metadata.
    ///
    /// # Arguments
    /// * `vc_id` - Credential identifier
    ///
    /// # Returns
    /// The metadata decoded from the chaincode payload
    pub async fn get(&self, vc_id: &str) -> Result<VcMeta> {
        let request = TransactionRequest::query(FunctionName::GetVcMetadata, [vc_id]);
        self.dispatcher.execute(&request).await?.payload_as()
    }

    /// Changes the status of a credential.
    ///
    /// # Arguments
    /// * `vc_id` - Credential identifier
    /// * `status` - New status
    pub async fn update_status(&self, vc_id: &str, status: VcStatus) -> Result<()> {
        let request =
            TransactionRequest::invoke(FunctionName::UpdateVcStatus, [vc_id, status.raw_value()]);
        self.dispatcher.execute(&request).await?;
        info!("VC {vc_id} is now {status}");
        Ok(())
    }
}
