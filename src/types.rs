//! Common types and data structures for the airdrop engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Ledger environment the airdrop runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Prod,
}

impl Network {
    /// Default node endpoint for this network
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Network::Testnet => "https://testnet-dex.binance.org",
            Network::Prod => "https://dex.binance.org",
        }
    }

    /// Bech32 human-readable part expected on addresses of this network
    pub fn address_hrp(&self) -> &'static str {
        match self {
            Network::Testnet => "tbnb",
            Network::Prod => "bnb",
        }
    }

    /// Chain identifier sent along with submissions
    pub fn chain_id(&self) -> &'static str {
        match self {
            Network::Testnet => "Binance-Chain-Ganges",
            Network::Prod => "Binance-Chain-Tigris",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Prod => "prod",
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "prod" => Ok(Network::Prod),
            _ => Err(Error::Config("env must be testnet or prod".to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (recipient, amount) pair in base units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverTransfer {
    pub recipient: String,
    pub amount: u64,
}

impl ReceiverTransfer {
    pub fn new(recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            recipient: recipient.into(),
            amount,
        }
    }
}

/// One output of a multi-output transfer, with the recipient in wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutput {
    /// Hex-encoded address payload
    pub to: String,
    pub amount: u64,
}

/// Transaction as reported by the ledger when looked up by hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransactionRecord {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Token balance entry of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    /// Free (spendable) amount in base units
    pub free: u64,
    #[serde(default)]
    pub locked: u64,
    #[serde(default)]
    pub frozen: u64,
}
