//! JSON-RPC client for the ledger node
use std::time::Duration;

use async_trait::async_trait;
use rand::random;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::AirdropConfig;
use crate::error::{Error, Result};
use crate::ledger::LedgerClient;
use crate::rpc::{Account, BroadcastResult, BroadcastTransfer, RpcRequest, RpcResponse};
use crate::types::{Network, TransactionRecord, TransferOutput};

/// Default per-request deadline
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// RPC client for a ledger node that signs on behalf of the sender.
///
/// Every request carries a deadline, so an unresponsive node surfaces as an
/// error instead of stalling the run.
pub struct RpcClient {
    endpoint: String,
    http: reqwest::Client,
    auth: Option<SecretString>,
    sender: Option<String>,
    network: Network,
}

impl RpcClient {
    /// Create a new RPC client without authentication.
    pub fn new(endpoint: impl Into<String>, network: Network, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            auth: None,
            sender: None,
            network,
        })
    }

    /// Build the client described by a validated configuration
    pub fn from_config(config: &AirdropConfig) -> Result<Self> {
        let client = Self::new(
            config.endpoint.clone(),
            config.network,
            config.request_timeout,
        )?
        .with_sender(config.sender.address.clone());

        Ok(match config.sender.rpc_user {
            Some(ref user) => client.with_basic_auth(user, &config.sender.key),
            None => client.with_key(&config.sender.key),
        })
    }

    /// Authenticate with HTTP basic auth, `user:key`.
    pub fn with_basic_auth(mut self, user: &str, key: &SecretString) -> Self {
        use base64::Engine;
        let credentials = format!("{}:{}", user, key.expose_secret());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.auth = Some(SecretString::new(format!("Basic {}", encoded)));
        self
    }

    /// Authenticate with a bearer key.
    pub fn with_key(mut self, key: &SecretString) -> Self {
        self.auth = Some(SecretString::new(format!("Bearer {}", key.expose_secret())));
        self
    }

    /// Bind the client to the sending account.
    pub fn with_sender(mut self, address: impl Into<String>) -> Self {
        self.sender = Some(address.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Call a JSON-RPC method and deserialize the result into the requested type.
    pub async fn call<T, P>(&self, method: &str, params: P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let params = serde_json::to_value(params)?;
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: random::<u64>(),
            method: method.to_string(),
            params,
        };
        debug!(method, id = request.id, "rpc call");

        let mut req = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .header("Content-Type", "application/json");

        if let Some(ref auth) = self.auth {
            req = req.header("Authorization", auth.expose_secret().as_str());
        }

        let response = req.send().await?;
        check_status(response.status())?;

        let rpc_response: RpcResponse<T> = response.json().await?;
        rpc_response.into_result()
    }

    /// Get account state, including all token balances.
    pub async fn get_account(&self, address: &str) -> Result<Account> {
        self.call("account", serde_json::json!([address])).await
    }

    /// Broadcast a signed multi-output transfer from the bound sender.
    pub async fn broadcast_transfer(
        &self,
        token: &str,
        outputs: Vec<TransferOutput>,
        sync: bool,
    ) -> Result<BroadcastResult> {
        let from = self
            .sender
            .clone()
            .ok_or_else(|| Error::InvalidParameter("RPC client has no sender bound".to_string()))?;

        let request = BroadcastTransfer {
            from,
            chain_id: self.network.chain_id().to_string(),
            token: token.to_string(),
            outputs,
            sync,
        };
        self.call("broadcast_transfer", serde_json::json!([request]))
            .await
    }

    /// Get a transaction by hash.
    pub async fn get_transaction(&self, hash: &str) -> Result<TransactionRecord> {
        self.call("tx", serde_json::json!([hash])).await
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if !status.is_success() {
        return Err(Error::Rpc(format!(
            "RPC request failed with status: {}",
            status
        )));
    }
    Ok(())
}

#[async_trait]
impl LedgerClient for RpcClient {
    async fn account_balance(&self, address: &str, token: &str) -> Result<u64> {
        let account = self.get_account(address).await?;
        Ok(account.free_balance(token))
    }

    async fn submit_transfer(
        &self,
        token: &str,
        outputs: Vec<TransferOutput>,
        sync: bool,
    ) -> Result<String> {
        self.broadcast_transfer(token, outputs, sync)
            .await?
            .into_hash()
    }

    async fn transaction(&self, hash: &str) -> Result<TransactionRecord> {
        self.get_transaction(hash).await
    }
}
