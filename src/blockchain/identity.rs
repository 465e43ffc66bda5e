// src/blockchain/identity.rs
//! X.509 client identity used to authenticate gateway sessions.

use crate::blockchain::config::FabricConfig;
use crate::error::{LedgerError, Result};
use std::fmt;
use std::fs;
use std::path::Path;

const PEM_BEGIN: &str = "-----BEGIN ";

/// Certificate and private key of the client, tied to its MSP.
///
/// Loaded once when the client is built and shared by every session the
/// pool creates.
#[derive(Clone)]
pub struct X509Identity {
    msp_id: String,
    certificate_pem: String,
    private_key_pem: String,
}

impl X509Identity {
    pub fn new(
        msp_id: impl Into<String>,
        certificate_pem: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Result<Self> {
        let identity = Self {
            msp_id: msp_id.into(),
            certificate_pem: certificate_pem.into(),
            private_key_pem: private_key_pem.into(),
        };
        ensure_pem("certificate", &identity.certificate_pem)?;
        ensure_pem("private key", &identity.private_key_pem)?;
        Ok(identity)
    }

    /// Reads the certificate and key files named by the configuration.
    ///
    /// # Errors
    /// Returns [`LedgerError::Connection`] if either file cannot be read or
    /// does not contain a PEM block.
    pub fn from_config(config: &FabricConfig) -> Result<Self> {
        let certificate = read_file(&config.certificate_file_path)?;
        let private_key = read_file(&config.private_key_file_path)?;
        Self::new(config.msp_id.clone(), certificate, private_key)
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }

    /// Signing key. The REST gateway signs on the client's behalf, so
    /// [`HttpGateway`](crate::blockchain::gateway::HttpGateway) never sends it.
    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }
}

// Never print key material.
impl fmt::Debug for X509Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509Identity")
            .field("msp_id", &self.msp_id)
            .finish_non_exhaustive()
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        LedgerError::connection(format!("failed to read {}: {e}", path.display()))
    })
}

fn ensure_pem(what: &str, content: &str) -> Result<()> {
    if content.contains(PEM_BEGIN) {
        Ok(())
    } else {
        Err(LedgerError::connection(format!("{what} is not PEM encoded")))
    }
}
