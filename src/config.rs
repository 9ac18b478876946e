use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::ledger::DEFAULT_NODE_URL;
use crate::rpc_utils::HttpSettings;

/// msgx - read and write the on-chain message for an account
///
/// Pass an address (or a URL/path whose first segment is an address) to view
/// that account read-only. Without one, the configured wallet's own account is
/// shown and can be edited.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "msgx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "On-chain message viewer/editor", long_about = None)]
pub struct CliArgs {
    /// Address override or page location (e.g. "0xABC", "/0xABC", "https://host/0xABC")
    pub location: Option<String>,

    /// Fullnode REST endpoint
    #[arg(long, env = "APTOS_NODE_URL")]
    pub node_url: Option<String>,

    /// REST request timeout in milliseconds (1000-60000)
    #[arg(long, env = "RPC_TIMEOUT_MS")]
    pub rpc_timeout_ms: Option<u64>,

    /// Retries for HTTP 429/5xx on reads (0-10)
    #[arg(long, env = "RPC_RETRIES")]
    pub rpc_retries: Option<u32>,

    /// JSON key file for the local wallet ({"private_key": "0x..", "account_address": "0x.."})
    #[arg(long, env = "MSGX_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Submit this text as the new message, then show the refreshed view
    #[arg(long = "set", value_name = "TEXT")]
    pub set_message: Option<String>,

    /// Print the view as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Max gas units for submitted transactions (1-2000000)
    #[arg(long, env = "MAX_GAS_AMOUNT")]
    pub max_gas_amount: Option<u64>,

    /// Gas unit price in octas (1-1000000)
    #[arg(long, env = "GAS_UNIT_PRICE")]
    pub gas_unit_price: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasSettings {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
}

impl Default for GasSettings {
    fn default() -> Self {
        GasSettings {
            max_gas_amount: 10_000,
            gas_unit_price: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub location: String,
    pub node_url: String,
    pub rpc_timeout_ms: u64,
    pub rpc_retries: u32,
    pub credentials: Option<PathBuf>,
    pub set_message: Option<String>,
    pub json: bool,
    pub gas: GasSettings,
}

impl Default for Config {
    fn default() -> Self {
        let http = HttpSettings::default();
        Config {
            location: String::new(),
            node_url: DEFAULT_NODE_URL.to_string(),
            rpc_timeout_ms: http.timeout_ms,
            rpc_retries: http.retries,
            credentials: None,
            set_message: None,
            json: false,
            gas: GasSettings::default(),
        }
    }
}

impl Config {
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            timeout_ms: self.rpc_timeout_ms,
            retries: self.rpc_retries,
        }
    }

    pub fn print_summary(&self) {
        log::info!("msgx configuration:");
        log::info!("  Node URL: {}", self.node_url);
        log::info!("  RPC Timeout: {}ms", self.rpc_timeout_ms);
        log::info!("  RPC Retries: {}", self.rpc_retries);
        if self.location.is_empty() {
            log::info!("  Mode: owner (wallet identity)");
        } else {
            log::info!("  Location: {}", self.location);
        }
        if let Some(path) = &self.credentials {
            log::info!("  Credentials: {}", path.display());
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Load configuration from CLI args and environment variables
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

pub fn from_args(args: CliArgs) -> Result<Config> {
    let defaults = Config::default();

    let node_url = args.node_url.unwrap_or(defaults.node_url);
    validate_url(&node_url, "APTOS_NODE_URL")?;

    let rpc_timeout_ms = validate_in_range(
        args.rpc_timeout_ms.unwrap_or(defaults.rpc_timeout_ms),
        1000,
        60000,
        "RPC_TIMEOUT_MS",
    )?;
    let rpc_retries = validate_in_range(
        args.rpc_retries.unwrap_or(defaults.rpc_retries),
        0,
        10,
        "RPC_RETRIES",
    )?;
    let max_gas_amount = validate_in_range(
        args.max_gas_amount.unwrap_or(defaults.gas.max_gas_amount),
        1,
        2_000_000,
        "MAX_GAS_AMOUNT",
    )?;
    let gas_unit_price = validate_in_range(
        args.gas_unit_price.unwrap_or(defaults.gas.gas_unit_price),
        1,
        1_000_000,
        "GAS_UNIT_PRICE",
    )?;

    let location = args.location.unwrap_or_default();
    if args.set_message.is_some() && crate::router::parse(&location).is_read_only() {
        return Err(anyhow!(
            "--set cannot be combined with an address override (read-only view)"
        ));
    }

    Ok(Config {
        location,
        node_url,
        rpc_timeout_ms,
        rpc_retries,
        credentials: args.credentials,
        set_message: args.set_message,
        json: args.json,
        gas: GasSettings {
            max_gas_amount,
            gas_unit_price,
        },
    })
}
