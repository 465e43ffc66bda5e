// src/contracts/fabric.rs
//! Hyperledger Fabric implementation of [`ContractApi`].
//!
//! Wires the identity, gateway factory, pool and dispatcher together from a
//! [`FabricConfig`], then routes every facade call through the DID and
//! credential registries that share the one dispatcher.

use crate::blockchain::config::FabricConfig;
use crate::blockchain::dispatcher::TransactionDispatcher;
use crate::blockchain::gateway::{GatewayFactory, HttpGatewayFactory};
use crate::blockchain::identity::X509Identity;
use crate::blockchain::pool::{GatewayPool, PoolStatus};
use crate::blockchain::transaction::{FunctionName, TransactionRequest, TransactionResponse};
use crate::contracts::credential_registry::CredentialRegistry;
use crate::contracts::did_registry::DidRegistry;
use crate::contracts::ContractApi;
use crate::error::Result;
use crate::models::credential::{VcMeta, VcStatus};
use crate::models::did::{DidDocAndStatus, DidDocStatus, DidDocument, InvokedDidDoc, RoleType};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::sync::Arc;

/// Ledger client for a Fabric network.
///
/// # Type Parameters
/// * `F` - Gateway factory; [`HttpGatewayFactory`] outside of tests
pub struct FabricContractApi<F: GatewayFactory = HttpGatewayFactory> {
    dispatcher: Arc<TransactionDispatcher<F>>,
    dids: DidRegistry<F>,
    credentials: CredentialRegistry<F>,
}

impl FabricContractApi<HttpGatewayFactory> {
    /// Builds a client from configuration.
    ///
    /// Reads the certificate and private key immediately; gateway sessions
    /// are connected lazily on first use.
    ///
    /// # Errors
    /// Returns a connection error if the identity files cannot be read or
    /// the pool policy is invalid.
    pub fn new(config: &FabricConfig) -> Result<Self> {
        let identity = X509Identity::from_config(config)?;
        info!(
            "connecting as {} to {}/{}",
            identity.msp_id(),
            config.network_name,
            config.chaincode_name
        );
        let factory = HttpGatewayFactory::from_config(identity, config);
        Self::with_factory(factory, config)
    }
}

impl<F: GatewayFactory> FabricContractApi<F> {
    /// Builds a client on a custom gateway factory.
    pub fn with_factory(factory: F, config: &FabricConfig) -> Result<Self> {
        let pool = GatewayPool::new(factory, config.pool.clone())?;
        let dispatcher = Arc::new(TransactionDispatcher::new(pool, config.contract_binding()));
        Ok(Self {
            dids: DidRegistry::new(Arc::clone(&dispatcher)),
            credentials: CredentialRegistry::new(Arc::clone(&dispatcher)),
            dispatcher,
        })
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.dispatcher.pool_status()
    }

    /// Maintenance: removes one world-state index.
    pub async fn remove_index(&self, index: &str) -> Result<TransactionResponse> {
        warn!("removing ledger index {index}");
        let request = TransactionRequest::invoke(FunctionName::RemoveIndex, [index]);
        self.dispatcher.execute(&request).await
    }

    /// Maintenance: removes every world-state index.
    pub async fn remove_all(&self) -> Result<TransactionResponse> {
        warn!("removing all ledger indexes");
        let request = TransactionRequest::invoke(FunctionName::RemoveAll, Vec::<String>::new());
        self.dispatcher.execute(&request).await
    }
}

#[async_trait]
impl<F: GatewayFactory> ContractApi for FabricContractApi<F> {
    async fn register_did_doc(&self, document: &InvokedDidDoc, role: RoleType) -> Result<()> {
        self.dids.register(document, role).await
    }

    async fn get_did_doc(&self, did_key_url: &str) -> Result<DidDocAndStatus> {
        self.dids.get(did_key_url).await
    }

    async fn update_did_doc_status(
        &self,
        did_key_url: &str,
        status: DidDocStatus,
    ) -> Result<DidDocument> {
        self.dids.update_status(did_key_url, status).await
    }

    async fn update_did_doc_status_with_time(
        &self,
        did_key_url: &str,
        status: DidDocStatus,
        terminated_time: NaiveDateTime,
    ) -> Result<DidDocument> {
        self.dids
            .update_status_with_time(did_key_url, status, terminated_time)
            .await
    }

    async fn register_vc_metadata(&self, meta: &VcMeta) -> Result<()> {
        self.credentials.register(meta).await
    }

    async fn get_vc_metadata(&self, vc_id: &str) -> Result<VcMeta> {
        self.credentials.get(vc_id).await
    }

    async fn update_vc_status(&self, vc_id: &str, status: VcStatus) -> Result<()> {
        self.credentials.update_status(vc_id, status).await
    }

    fn close(&self) {
        info!("closing ledger client");
        self.dispatcher.close();
    }
}
