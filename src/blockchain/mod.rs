// src/blockchain/mod.rs
//! Ledger client core: configuration, gateway sessions, pooling and
//! transaction dispatch.

pub mod config;
pub mod dispatcher;
pub mod gateway;
pub mod identity;
pub mod pool;
pub mod transaction;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{ContractBinding, FabricConfig, PoolConfig};
pub use dispatcher::TransactionDispatcher;
pub use gateway::{Gateway, GatewayError, GatewayFactory, HttpGateway, HttpGatewayFactory};
pub use identity::X509Identity;
pub use pool::{GatewayPool, PoolStatus, PooledGateway};
pub use transaction::{FunctionName, TransactionRequest, TransactionResponse};
