// src/main.rs

//! # DID Ledger Client - Command Line Entry Point
//!
//! Small operator tool over the ledger client facade. Resolves and updates
//! DID Documents and VC Metadata on a Fabric network.
//!
//! ## Usage
//! ```text
//! did-ledger get-did <did-key-url>
//! did-ledger update-did-status <did-key-url> <status> [terminated-time]
//! did-ledger get-vc <vc-id>
//! did-ledger update-vc-status <vc-id> <status>
//! ```
//!
//! ## Environment Variables
//! - `DID_LEDGER_CONFIG`: (Optional) configuration file (default: config/ledger.toml)
//! - `DID_LEDGER__FABRIC__<KEY>`: (Optional) overrides a `[fabric]` setting
//! - `RUST_LOG`: (Optional) log filter, e.g. `did_ledger_client=debug`

use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use did_ledger_client::models::{DidDocStatus, VcStatus};
use did_ledger_client::{BlockchainType, ContractApi, ContractFactory, FabricConfig};
use dotenv::dotenv;
use log::error;
use serde::Serialize;
use std::process::ExitCode;

const DEFAULT_CONFIG_PATH: &str = "config/ledger.toml";

const USAGE: &str = "usage:
  did-ledger get-did <did-key-url>
  did-ledger update-did-status <did-key-url> <status> [terminated-time]
  did-ledger get-vc <vc-id>
  did-ledger update-vc-status <vc-id> <status>";

/// A parsed command line.
#[derive(Debug, PartialEq)]
enum Command {
    GetDid(String),
    UpdateDidStatus {
        url: String,
        status: DidDocStatus,
        terminated_time: Option<NaiveDateTime>,
    },
    GetVc(String),
    UpdateVcStatus {
        id: String,
        status: VcStatus,
    },
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            ["get-did", url] => Command::GetDid(url.to_string()),
            ["update-did-status", url, status] => Command::UpdateDidStatus {
                url: url.to_string(),
                status: status.parse()?,
                terminated_time: None,
            },
            ["update-did-status", url, status, time] => Command::UpdateDidStatus {
                url: url.to_string(),
                status: status.parse()?,
                terminated_time: Some(parse_time(time)?),
            },
            ["get-vc", id] => Command::GetVc(id.to_string()),
            ["update-vc-status", id, status] => Command::UpdateVcStatus {
                id: id.to_string(),
                status: status.parse()?,
            },
            _ => bail!("{USAGE}"),
        };
        Ok(command)
    }
}

fn parse_time(value: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("invalid terminated time '{value}', expected YYYY-MM-DDTHH:MM[:SS]"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(client: &dyn ContractApi, command: Command) -> anyhow::Result<()> {
    match command {
        Command::GetDid(url) => print_json(&client.get_did_doc(&url).await?),
        Command::UpdateDidStatus {
            url,
            status,
            terminated_time: Some(time),
        } => print_json(&client.update_did_doc_status_with_time(&url, status, time).await?),
        Command::UpdateDidStatus { url, status, .. } => {
            print_json(&client.update_did_doc_status(&url, status).await?)
        }
        Command::GetVc(id) => print_json(&client.get_vc_metadata(&id).await?),
        Command::UpdateVcStatus { id, status } => {
            client.update_vc_status(&id, status).await?;
            println!("{id} is now {status}");
            Ok(())
        }
    }
}

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Parse the command line
/// 3. Build the Fabric client (sessions connect lazily)
/// 4. Run the command and release every session
#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config_path =
        std::env::var("DID_LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = FabricConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path}"))?;

    let client = ContractFactory::create(BlockchainType::Fabric, &config)?;
    let result = run(client.as_ref(), command).await;
    client.close();
    result
}
