// src/blockchain/mock.rs
//! In-memory gateway used by unit tests.
//!
//! Records every call, answers with queued responses and counts how many
//! sessions were created and destroyed.

use crate::blockchain::config::ContractBinding;
use crate::blockchain::gateway::{Gateway, GatewayError, GatewayFactory};
use crate::utils::serialization::encode_base64;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub gateway_id: usize,
    pub submitted: bool,
    pub contract: ContractBinding,
    pub function: String,
    pub args: Vec<String>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    responses: VecDeque<Result<Bytes, String>>,
    created: usize,
    destroyed: usize,
    fail_create: bool,
}

#[derive(Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<MockState>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> MockFactory {
        MockFactory { ledger: self.clone() }
    }

    /// Queues a successful envelope whose payload is `payload` as JSON.
    pub fn respond_with<T: Serialize>(&self, payload: &T) {
        let json = serde_json::to_string(payload).unwrap();
        let envelope = serde_json::json!({
            "status": 200,
            "message": "OK",
            "payload": encode_base64(&json),
        });
        self.respond_raw(envelope.to_string());
    }

    pub fn respond_raw(&self, body: impl Into<String>) {
        let body: String = body.into();
        self.state.lock().responses.push_back(Ok(Bytes::from(body)));
    }

    pub fn respond_error(&self, message: impl Into<String>) {
        self.state.lock().responses.push_back(Err(message.into()));
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.lock().fail_create = fail;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn created(&self) -> usize {
        self.state.lock().created
    }

    pub fn destroyed(&self) -> usize {
        self.state.lock().destroyed
    }

    fn record(
        &self,
        gateway_id: usize,
        submitted: bool,
        contract: &ContractBinding,
        function: &str,
        args: &[String],
    ) -> Result<Bytes, GatewayError> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall {
            gateway_id,
            submitted,
            contract: contract.clone(),
            function: function.to_string(),
            args: args.to_vec(),
        });
        match state.responses.pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(body)) => Err(GatewayError::Rejected {
                function: function.to_string(),
                status: 500,
                body,
            }),
            None => Ok(Bytes::from_static(
                br#"{"status":200,"message":"OK","payload":""}"#,
            )),
        }
    }
}

pub struct MockGateway {
    id: usize,
    ledger: MockLedger,
}

impl MockGateway {
    pub fn id(&self) -> usize {
        self.id
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn evaluate(
        &self,
        contract: &ContractBinding,
        function: &str,
        args: &[String],
    ) -> Result<Bytes, GatewayError> {
        self.ledger.record(self.id, false, contract, function, args)
    }

    async fn submit(
        &self,
        contract: &ContractBinding,
        function: &str,
        args: &[String],
    ) -> Result<Bytes, GatewayError> {
        self.ledger.record(self.id, true, contract, function, args)
    }

    fn close(&mut self) {
        self.ledger.state.lock().destroyed += 1;
    }
}

pub struct MockFactory {
    ledger: MockLedger,
}

#[async_trait]
impl GatewayFactory for MockFactory {
    type Gateway = MockGateway;

    async fn create(&self) -> Result<MockGateway, GatewayError> {
        let mut state = self.ledger.state.lock();
        if state.fail_create {
            return Err(GatewayError::InvalidConfig("peer unreachable".to_string()));
        }
        state.created += 1;
        Ok(MockGateway {
            id: state.created,
            ledger: self.ledger.clone(),
        })
    }
}
