//! Ledger access used by the engine stages

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{TransactionRecord, TransferOutput};

/// Remote ledger operations the airdrop needs.
///
/// Implementations are bound to a single sender: `submit_transfer` always
/// spends from the account the client was built for.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Free balance of `token` held by `address`, in base units
    async fn account_balance(&self, address: &str, token: &str) -> Result<u64>;

    /// Submit all outputs as one atomic transfer and return its hash.
    ///
    /// With `sync` set the call blocks until the node has accepted or
    /// rejected the broadcast.
    async fn submit_transfer(
        &self,
        token: &str,
        outputs: Vec<TransferOutput>,
        sync: bool,
    ) -> Result<String>;

    /// Look up a transaction by hash
    async fn transaction(&self, hash: &str) -> Result<TransactionRecord>;
}
