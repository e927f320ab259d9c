//! JSON-RPC wire structures for the ledger node

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{TokenBalance, TransferOutput};

/// RPC request structure
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

/// RPC response structure
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

impl<T> RpcResponse<T> {
    /// Unwrap the result, turning an RPC error object into `Error::Rpc`
    pub(crate) fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(Error::Rpc(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        self.result
            .ok_or_else(|| Error::Rpc("RPC response missing result".to_string()))
    }
}

/// RPC error structure
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Account state returned by `account`
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(default)]
    pub sequence: u64,
    #[serde(default)]
    pub balances: Vec<TokenBalance>,
}

impl Account {
    /// Free balance of `symbol`, zero when the account holds none
    pub fn free_balance(&self, symbol: &str) -> u64 {
        self.balances
            .iter()
            .find(|balance| balance.symbol == symbol)
            .map(|balance| balance.free)
            .unwrap_or(0)
    }
}

/// Multi-output transfer request for `broadcast_transfer`
///
/// The node signs with the key bound to `from`; all outputs land atomically
/// in one transaction or not at all.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastTransfer {
    pub from: String,
    pub chain_id: String,
    pub token: String,
    pub outputs: Vec<TransferOutput>,
    /// Wait for the node to accept or reject the broadcast before returning
    pub sync: bool,
}

/// Result of `broadcast_transfer`
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastResult {
    #[serde(default)]
    pub hash: String,
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub log: Option<String>,
}

impl BroadcastResult {
    /// Hash of an accepted transfer; rejections and hash-less results are errors
    pub fn into_hash(self) -> Result<String> {
        if !self.ok || self.code != 0 {
            return Err(Error::Rpc(format!(
                "transaction rejected (code {}): {}",
                self.code,
                self.log.unwrap_or_default()
            )));
        }
        if self.hash.is_empty() {
            return Err(Error::Rpc("broadcast returned no transaction hash".to_string()));
        }
        Ok(self.hash)
    }
}

fn default_ok() -> bool {
    true
}
