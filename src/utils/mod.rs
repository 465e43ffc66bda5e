// src/utils/mod.rs
//! Helper functions shared by the ledger client.

pub mod did_url;
pub mod serialization;
