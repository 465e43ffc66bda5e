// src/contracts/did_registry.rs
//! DID Document chaincode interface.
//!
//! Registers DID Documents, resolves them by DID key URL and drives their
//! status transitions.
//!
//! # Status transitions
//! | Target        | Chaincode function                      | Third argument     |
//! |---------------|-----------------------------------------|--------------------|
//! | `ACTIVATED`   | `document_updateDidDocStatusInService`  | version id         |
//! | `DEACTIVATED` | `document_updateDidDocStatusInService`  | version id         |
//! | `REVOKED`     | `document_updateDidDocStatusRevocation` | empty string       |
//! | `TERMINATED`  | `document_updateDidDocStatusRevocation` | termination time   |
//!
//! `TERMINATED` always needs a termination time and is only accepted by
//! [`DidRegistry::update_status_with_time`]; every other status is only
//! accepted by [`DidRegistry::update_status`].

use crate::blockchain::dispatcher::TransactionDispatcher;
use crate::blockchain::gateway::GatewayFactory;
use crate::blockchain::transaction::{FunctionName, TransactionRequest};
use crate::error::{LedgerError, Result};
use crate::models::did::{DidDocAndStatus, DidDocStatus, DidDocument, InvokedDidDoc, RoleType};
use crate::utils::did_url::DidKeyUrl;
use crate::utils::serialization::serialize;
use chrono::{NaiveDateTime, Timelike};
use log::info;
use std::sync::Arc;

/// ISO-8601 local date-time as the chaincode expects it: seconds are
/// omitted when both they and the fraction are zero (`2024-05-01T10:30`).
fn format_terminated_time(time: &NaiveDateTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format("%Y-%m-%dT%H:%M").to_string()
    } else {
        time.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

/// DID Document operations on the ledger.
pub struct DidRegistry<F: GatewayFactory> {
    dispatcher: Arc<TransactionDispatcher<F>>,
}

impl<F: GatewayFactory> DidRegistry<F> {
    pub fn new(dispatcher: Arc<TransactionDispatcher<F>>) -> Self {
        Self { dispatcher }
    }

    /// Registers a DID Document, or updates it without touching its status.
    pub async fn register(&self, document: &InvokedDidDoc, role: RoleType) -> Result<()> {
        let request = TransactionRequest::invoke(
            FunctionName::CreateDidDoc,
            [serialize(document)?, role.raw_value().to_string()],
        );
        self.dispatcher.execute(&request).await?;
        info!("registered DID document as {}", role.raw_value());
        Ok(())
    }

    /// Resolves a DID key URL to the document and its status.
    ///
    /// An empty version id in the URL selects the latest version.
    pub async fn get(&self, did_key_url: &str) -> Result<DidDocAndStatus> {
        let url = DidKeyUrl::parse(did_key_url)?;
        let request = TransactionRequest::query(
            FunctionName::GetDidDocument,
            [url.did(), url.version_id()],
        );
        self.dispatcher.execute(&request).await?.payload_as()
    }

    /// Moves a document to `ACTIVATED`, `DEACTIVATED` or `REVOKED`.
    ///
    /// # Errors
    /// Returns [`LedgerError::IllegalArgument`] for `TERMINATED`, before any
    /// network call; use [`DidRegistry::update_status_with_time`] instead.
    pub async fn update_status(&self, did_key_url: &str, status: DidDocStatus) -> Result<DidDocument> {
        if status == DidDocStatus::Terminated {
            return Err(LedgerError::illegal_argument(
                "TERMINATED status requires a terminatedTime",
            ));
        }
        let url = DidKeyUrl::parse(did_key_url)?;

        let request = if status.is_revocation() {
            TransactionRequest::invoke(
                FunctionName::UpdateDidDocStatusRevocation,
                [url.did(), status.raw_value(), ""],
            )
        } else {
            TransactionRequest::invoke(
                FunctionName::UpdateDidDocStatusInService,
                [url.did(), status.raw_value(), url.version_id()],
            )
        };

        let document = self.dispatcher.execute(&request).await?.payload_as()?;
        info!("{} is now {status}", url.did());
        Ok(document)
    }

    /// Moves a document to `TERMINATED` at `terminated_time`.
    ///
    /// # Errors
    /// Returns [`LedgerError::IllegalArgument`] for any other status, before
    /// any network call.
    pub async fn update_status_with_time(
        &self,
        did_key_url: &str,
        status: DidDocStatus,
        terminated_time: NaiveDateTime,
    ) -> Result<DidDocument> {
        if status != DidDocStatus::Terminated {
            return Err(LedgerError::illegal_argument(
                "Only TERMINATED status changes are allowed.",
            ));
        }
        let url = DidKeyUrl::parse(did_key_url)?;

        let terminated_time = format_terminated_time(&terminated_time);
        let request = TransactionRequest::invoke(
            FunctionName::UpdateDidDocStatusRevocation,
            [url.did(), status.raw_value(), terminated_time.as_str()],
        );

        let document = self.dispatcher.execute(&request).await?.payload_as()?;
        info!("{} terminated at {terminated_time}", url.did());
        Ok(document)
    }
}
