//! Run configuration loading and validation
//!
//! The configuration is a TOML file:
//!
//! ```toml
//! env = "testnet"
//! token = "AIR-123"
//! decimals = 8
//! batch_size = 100
//! batch_interval_secs = 5
//! report_file = "report.csv"
//!
//! [sender]
//! address = "tbnb1..."
//! key = "..."
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use secrecy::SecretString;
use serde::Deserialize;
use tracing::info;

use crate::address::{parse_address, redact_middle};
use crate::amount::MAX_DECIMALS;
use crate::client::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{Error, Result};
use crate::plan::MAX_BATCH_SIZE;
use crate::types::Network;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["airdrop.toml", "config/airdrop.toml"];
pub const DEFAULT_INPUT_FILE: &str = "input.json";
pub const DEFAULT_BATCH_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_VERIFY_DELAY_SECS: u64 = 1;

fn default_decimals() -> u32 {
    8
}

/// Configuration file as written by the operator
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub env: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default)]
    pub batch_size: i64,
    #[serde(default)]
    pub batch_interval_secs: i64,
    #[serde(default)]
    pub report_file: Option<PathBuf>,
    #[serde(default)]
    pub input_file: Option<PathBuf>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub verify_delay_secs: Option<u64>,
    pub sender: SenderConfig,
}

/// Sender identity and key material
#[derive(Debug, Clone, Deserialize)]
pub struct SenderConfig {
    pub address: String,
    #[serde(default)]
    pub rpc_user: Option<String>,
    pub key: SecretString,
}

/// Validated configuration for one airdrop run
#[derive(Debug, Clone)]
pub struct AirdropConfig {
    pub network: Network,
    pub endpoint: String,
    pub token: String,
    pub decimals: u32,
    pub batch_size: usize,
    pub batch_interval: Duration,
    pub verify_delay: Duration,
    pub request_timeout: Duration,
    pub report_file: PathBuf,
    pub input_file: PathBuf,
    pub sender: SenderConfig,
}

/// Candidate locations searched when no explicit path is given
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("airdrop-engine").join("airdrop.toml"));
    }
    paths
}

/// Load the raw configuration from `path`, or the first default location that exists
pub fn load_config(path: Option<PathBuf>) -> Result<RawConfig> {
    let candidates = match path {
        Some(p) => vec![p],
        None => default_config_paths(),
    };

    for candidate in &candidates {
        if let Some(config) = try_load_file(candidate)? {
            return Ok(config);
        }
    }

    Err(Error::Config(format!(
        "no configuration file found (looked in {})",
        candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

fn try_load_file(path: &Path) -> Result<Option<RawConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read config at {}: {}", path.display(), e))
    })?;

    parse_config(&contents)
        .map(Some)
        .map_err(|e| Error::Config(format!("failed to parse config at {}: {}", path.display(), e)))
}

/// Parse configuration text
pub fn parse_config(contents: &str) -> Result<RawConfig> {
    toml::from_str(contents).map_err(|e| Error::Config(e.message().to_string()))
}

impl AirdropConfig {
    /// Validate a raw configuration and fill in defaults
    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let network: Network = raw.env.parse()?;

        let token = raw.token.trim().to_string();
        if token.is_empty() {
            return Err(Error::Config("token must be specified".to_string()));
        }

        if raw.decimals > MAX_DECIMALS {
            return Err(Error::Config(format!(
                "decimals must be at most {}",
                MAX_DECIMALS
            )));
        }

        if raw.batch_size <= 0 || raw.batch_size > MAX_BATCH_SIZE as i64 {
            return Err(Error::Config(format!(
                "batch_size must be greater than 0 and at most {}",
                MAX_BATCH_SIZE
            )));
        }

        let batch_interval_secs = if raw.batch_interval_secs <= 0 {
            DEFAULT_BATCH_INTERVAL_SECS
        } else {
            raw.batch_interval_secs as u64
        };

        let sender_address = raw.sender.address.trim().to_string();
        parse_address(&sender_address, network)
            .map_err(|e| Error::Config(format!("invalid sender address: {}", e)))?;

        let report_file = match raw.report_file {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => default_report_file(),
        };

        let endpoint = raw
            .endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| network.default_endpoint().to_string());

        Ok(Self {
            network,
            endpoint,
            token,
            decimals: raw.decimals,
            batch_size: raw.batch_size as usize,
            batch_interval: Duration::from_secs(batch_interval_secs),
            verify_delay: Duration::from_secs(
                raw.verify_delay_secs.unwrap_or(DEFAULT_VERIFY_DELAY_SECS),
            ),
            request_timeout: raw
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            report_file,
            input_file: raw
                .input_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE)),
            sender: SenderConfig {
                address: sender_address,
                ..raw.sender
            },
        })
    }

    /// Log the effective settings; key material is never printed
    pub fn log(&self) {
        info!(target: "config", "env: {}", self.network);
        info!(target: "config", "endpoint: {}", self.endpoint);
        info!(target: "config", "token: {}", self.token);
        info!(target: "config", "decimals: {}", self.decimals);
        info!(target: "config", "batch size: {}", self.batch_size);
        info!(target: "config", "batch interval (s): {}", self.batch_interval.as_secs());
        info!(target: "config", "sender: {}", redact_middle(&self.sender.address, 8, 6));
        info!(target: "config", "report file: {}", self.report_file.display());
    }
}

fn default_report_file() -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    PathBuf::from(format!("report.{}", secs))
}
