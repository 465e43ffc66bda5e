// src/blockchain/config.rs
//! Fabric network configuration.
//!
//! Holds the identity and topology settings needed to open gateway sessions
//! together with the pool sizing policy. Settings can be built from a flat
//! property map (`mspId`, `fabric.configFilePath`, ...) or loaded from a
//! configuration file through the `config` crate.

use crate::error::{LedgerError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment overrides, e.g. `DID_LEDGER__FABRIC__MSP_ID`.
const ENV_PREFIX: &str = "DID_LEDGER";
/// Optional prefix used by property files, e.g. `fabric.mspId`.
const PROPERTY_PREFIX: &str = "fabric.";

fn default_commit_timeout_secs() -> u64 {
    7
}

/// Sizing policy for the gateway pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on sessions, idle and borrowed together.
    pub max_total: usize,
    /// Idle sessions kept warm when possible.
    pub min_idle: usize,
    /// Idle sessions beyond this count are closed when returned.
    pub max_idle: usize,
    /// How long a borrower waits on an exhausted pool before failing.
    pub max_wait_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_total: 10,
            min_idle: 2,
            max_idle: 5,
            max_wait_ms: 30_000,
        }
    }
}

impl PoolConfig {
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    /// Checks `min_idle <= max_idle <= max_total` and `max_total > 0`.
    pub fn validate(&self) -> Result<()> {
        if self.max_total == 0 {
            return Err(LedgerError::connection("pool max_total must be positive"));
        }
        if self.max_idle > self.max_total {
            return Err(LedgerError::connection(format!(
                "pool max_idle ({}) exceeds max_total ({})",
                self.max_idle, self.max_total
            )));
        }
        if self.min_idle > self.max_idle {
            return Err(LedgerError::connection(format!(
                "pool min_idle ({}) exceeds max_idle ({})",
                self.min_idle, self.max_idle
            )));
        }
        Ok(())
    }
}

/// Connection settings for a Fabric network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricConfig {
    /// Membership service provider id of the client organisation.
    pub msp_id: String,
    /// Network topology descriptor.
    pub config_file_path: PathBuf,
    pub private_key_file_path: PathBuf,
    pub certificate_file_path: PathBuf,
    /// Channel the chaincode is deployed on.
    pub network_name: String,
    pub chaincode_name: String,
    /// Seconds a submit waits for the commit acknowledgment.
    #[serde(default = "default_commit_timeout_secs")]
    pub commit_timeout_secs: u64,
    #[serde(default)]
    pub pool: PoolConfig,
}

impl FabricConfig {
    /// Loads the `[fabric]` table from a configuration file.
    ///
    /// Any format understood by the `config` crate works (TOML, JSON, YAML,
    /// INI); the format is picked from the file extension. Values can be
    /// overridden by `DID_LEDGER__FABRIC__<KEY>` environment variables.
    ///
    /// # Errors
    /// Returns [`LedgerError::Connection`] if the file cannot be read, a key is
    /// missing, or the pool policy is inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(LedgerError::connection)?;

        let config: FabricConfig = settings.get("fabric").map_err(LedgerError::connection)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration from a flat property map.
    ///
    /// Keys may be given bare (`mspId`) or with the `fabric.` prefix
    /// (`fabric.mspId`). Pool settings keep their defaults.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let lookup = |key: &str| -> Result<String> {
            properties
                .get(key)
                .or_else(|| properties.get(&format!("{PROPERTY_PREFIX}{key}")))
                .map(|value| value.trim().to_string())
                .ok_or_else(|| LedgerError::connection(format!("missing property '{key}'")))
        };

        let config = Self {
            msp_id: lookup("mspId")?,
            config_file_path: lookup("configFilePath")?.into(),
            private_key_file_path: lookup("privateKeyFilePath")?.into(),
            certificate_file_path: lookup("certificateFilePath")?.into(),
            network_name: lookup("networkName")?,
            chaincode_name: lookup("chaincodeName")?,
            commit_timeout_secs: default_commit_timeout_secs(),
            pool: PoolConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.commit_timeout_secs)
    }

    /// The channel/chaincode pair every transaction is sent to.
    pub fn contract_binding(&self) -> ContractBinding {
        ContractBinding {
            network_name: self.network_name.clone(),
            chaincode_name: self.chaincode_name.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("msp_id", self.msp_id.as_str()),
            ("network_name", self.network_name.as_str()),
            ("chaincode_name", self.chaincode_name.as_str()),
        ] {
            if value.is_empty() {
                return Err(LedgerError::connection(format!("'{key}' must not be empty")));
            }
        }
        self.pool.validate()
    }
}

/// Logical network and contract a gateway session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractBinding {
    pub network_name: String,
    pub chaincode_name: String,
}
