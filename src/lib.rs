// src/lib.rs

//! # DID Ledger Client
//!
//! Client-side facade for registering, resolving and updating DID Documents
//! and Verifiable Credential metadata on a Hyperledger Fabric network.
//!
//! ## Architecture Overview
//! 1. **Contracts Layer**: [`ContractApi`] facade, DID and credential registries
//! 2. **Blockchain Layer**: transaction dispatcher, gateway pool and HTTP gateway sessions
//! 3. **Models**: DID Document and VC Metadata value objects
//! 4. **Utilities**: DID key URL parsing and payload (de)serialization
//!
//! ## Example
//! ```no_run
//! use did_ledger_client::{BlockchainType, ContractApi, ContractFactory, FabricConfig};
//!
//! # async fn run() -> did_ledger_client::Result<()> {
//! let config = FabricConfig::load("config/ledger.toml")?;
//! let client = ContractFactory::create(BlockchainType::Fabric, &config)?;
//! let resolved = client.get_did_doc("did:omn:issuer?versionId=1").await?;
//! println!("{} is {}", resolved.document.id, resolved.status);
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod blockchain;    // Fabric gateway sessions, pooling and dispatch
pub mod contracts;     // Public facade
pub mod error;         // Error taxonomy
pub mod models;        // Data structures
pub mod utils;         // Helper functions

pub use blockchain::config::{FabricConfig, PoolConfig};
pub use contracts::{BlockchainType, ContractApi, ContractFactory, FabricContractApi};
pub use error::{ErrorCode, LedgerError, Result};
pub use utils::did_url::DidKeyUrl;
