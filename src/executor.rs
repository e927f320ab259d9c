//! Batch submission
//!
//! Tasks are submitted strictly one after another: the ledger sequences
//! transactions per sender, so only one can be in flight at a time. A failed
//! task is recorded and skipped; it never stops the tasks after it.

use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::address::to_wire_address;
use crate::error::{Error, Result};
use crate::ledger::LedgerClient;
use crate::plan::{ExecutionTask, RunContext, SubmissionState};
use crate::types::{Network, TransferOutput};

/// Submits every task of a run as one atomic multi-output transfer
pub struct BatchExecutor<'a> {
    client: &'a dyn LedgerClient,
    interval: Duration,
}

impl<'a> BatchExecutor<'a> {
    /// Create an executor that waits `interval` before every submission
    pub fn new(client: &'a dyn LedgerClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Submit all tasks in order and return the context with every task
    /// terminal (hash or error).
    pub async fn execute(&self, mut context: RunContext) -> RunContext {
        let network = context.config.network;
        let total = context.tasks.len();
        context.started_at = Some(OffsetDateTime::now_utc());

        for task in context.tasks.iter_mut() {
            sleep(self.interval).await;
            task.submission = self.submit(task, network).await;

            match &task.submission {
                SubmissionState::Submitted { hash } => {
                    info!(batch = task.index, total, tx = %hash, "Complete with tx {}", hash);
                }
                SubmissionState::Failed(e) => {
                    warn!(batch = task.index, total, "Failed with exception {}", e);
                }
                SubmissionState::Pending => {}
            }
        }

        context.completed_at = Some(OffsetDateTime::now_utc());
        context
    }

    async fn submit(&self, task: &ExecutionTask, network: Network) -> SubmissionState {
        let outputs = match resolve_outputs(task, network) {
            Ok(outputs) => outputs,
            Err(e) => return SubmissionState::Failed(e),
        };

        match self.client.submit_transfer(&task.token, outputs, true).await {
            Ok(hash) if hash.is_empty() => SubmissionState::Failed(Error::Rpc(
                "ledger accepted the transfer without a transaction hash".to_string(),
            )),
            Ok(hash) => SubmissionState::Submitted { hash },
            Err(e) => SubmissionState::Failed(e),
        }
    }
}

/// Convert a task's transfers into wire outputs.
///
/// One malformed recipient fails the whole task.
pub fn resolve_outputs(task: &ExecutionTask, network: Network) -> Result<Vec<TransferOutput>> {
    task.transfers
        .iter()
        .map(|transfer| {
            Ok(TransferOutput {
                to: to_wire_address(&transfer.recipient, network)?,
                amount: transfer.amount,
            })
        })
        .collect()
}
