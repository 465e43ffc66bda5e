// src/blockchain/dispatcher.rs
//! Transaction dispatcher.
//!
//! Sends one [`TransactionRequest`] over a pooled gateway session:
//! - queries are evaluated on a peer without ordering or commit
//! - invocations are submitted and wait for the commit acknowledgment
//!
//! The session is returned to the pool on every exit path, and the raw reply
//! is decoded into a [`TransactionResponse`].

use crate::blockchain::config::ContractBinding;
use crate::blockchain::gateway::{Gateway, GatewayFactory};
use crate::blockchain::pool::{GatewayPool, PoolStatus};
use crate::blockchain::transaction::{TransactionRequest, TransactionResponse};
use crate::error::{LedgerError, Result};
use log::{debug, warn};

/// Executes chaincode transactions against a fixed contract binding.
pub struct TransactionDispatcher<F: GatewayFactory> {
    pool: GatewayPool<F>,
    contract: ContractBinding,
}

impl<F: GatewayFactory> TransactionDispatcher<F> {
    pub fn new(pool: GatewayPool<F>, contract: ContractBinding) -> Self {
        Self { pool, contract }
    }

    pub fn contract(&self) -> &ContractBinding {
        &self.contract
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Runs a transaction and decodes the response envelope.
    ///
    /// # Errors
    /// - [`LedgerError::Connection`] if no session can be obtained
    /// - [`LedgerError::Transaction`] if the call fails, times out, or the
    ///   reply is not a valid envelope
    pub async fn execute(&self, request: &TransactionRequest) -> Result<TransactionResponse> {
        let function = request.function.as_str();
        debug!(
            "{} {function} with {} argument(s)",
            if request.is_query { "evaluate" } else { "submit" },
            request.arguments.len()
        );

        let raw = {
            let gateway = self.pool.borrow().await?;
            let result = if request.is_query {
                gateway.evaluate(&self.contract, function, &request.arguments).await
            } else {
                gateway.submit(&self.contract, function, &request.arguments).await
            };
            // The session goes back to the pool here, success or not.
            drop(gateway);
            result
        };
        self.pool.ensure_min_idle().await;

        let raw = raw.map_err(|e| {
            warn!("{function} failed: {e}");
            LedgerError::transaction(e)
        })?;
        TransactionResponse::from_bytes(&raw)
    }

    /// Releases every pooled session. Later calls fail with a connection error.
    pub fn close(&self) {
        self.pool.close();
    }
}
