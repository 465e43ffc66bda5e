// src/models/mod.rs
//! Domain value objects exchanged with the ledger.

pub mod credential;
pub mod did;

pub use credential::{VcMeta, VcStatus};
pub use did::{DidDocAndStatus, DidDocStatus, DidDocument, InvokedDidDoc, RoleType};
