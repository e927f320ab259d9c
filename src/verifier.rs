//! Post-submission confirmation
//!
//! Broadcast acceptance only means the node took the transaction. This pass
//! looks every submitted hash up again to see which batches actually landed.
//! It is read-only: nothing is resubmitted or cancelled.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::ledger::LedgerClient;
use crate::plan::{RunContext, VerificationState};

pub struct ConfirmationVerifier<'a> {
    client: &'a dyn LedgerClient,
    delay: Duration,
}

impl<'a> ConfirmationVerifier<'a> {
    /// Create a verifier that waits `delay` before each lookup
    pub fn new(client: &'a dyn LedgerClient, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Look up every submitted task once; tasks without a hash are left untouched.
    pub async fn verify(&self, mut context: RunContext) -> RunContext {
        for task in context.tasks.iter_mut() {
            let Some(hash) = task.transaction_hash().map(str::to_owned) else {
                continue;
            };

            sleep(self.delay).await;
            task.verification = match self.client.transaction(&hash).await {
                Ok(record) if !record.hash.is_empty() => {
                    info!(batch = task.index, tx = %hash, height = ?record.height, "transaction affirmed");
                    VerificationState::Affirmed
                }
                Ok(_) => {
                    warn!(batch = task.index, tx = %hash, "lookup returned no transaction hash");
                    VerificationState::Unconfirmed
                }
                Err(e) => {
                    warn!(batch = task.index, tx = %hash, "verification failed: {}", e);
                    VerificationState::Failed(e)
                }
            };
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ledger::MockLedgerClient;
    use crate::plan::{ExecutionTask, RunConfiguration, SubmissionState};
    use crate::types::{Network, ReceiverTransfer, TransactionRecord};

    fn context(states: Vec<SubmissionState>) -> RunContext {
        let tasks = states
            .into_iter()
            .enumerate()
            .map(|(i, state)| {
                let mut task =
                    ExecutionTask::new(i, "AIR-123", vec![ReceiverTransfer::new(format!("r{i}"), 1)]);
                task.submission = state;
                task
            })
            .collect::<Vec<_>>();
        let config = RunConfiguration {
            network: Network::Testnet,
            token: "AIR-123".to_string(),
            decimals: 0,
            batch_size: 1,
            batch_interval: Duration::ZERO,
            verify_delay: Duration::ZERO,
            total_sum: tasks.len() as u64,
            receiver_count: tasks.len(),
        };
        RunContext::new(config, "sender", tasks)
    }

    fn submitted(hash: &str) -> SubmissionState {
        SubmissionState::Submitted {
            hash: hash.to_string(),
        }
    }

    fn found(hash: &str) -> TransactionRecord {
        TransactionRecord {
            hash: hash.to_string(),
            height: Some(42),
            code: Some(0),
        }
    }

    #[tokio::test]
    async fn test_only_submitted_tasks_are_looked_up_once() {
        let ctx = context(vec![
            submitted("H1"),
            SubmissionState::Failed(Error::Rpc("rejected".to_string())),
            submitted("H3"),
        ]);

        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_transaction()
            .withf(|hash| hash == "H1")
            .times(1)
            .returning(|h| Ok(found(h)));
        ledger
            .expect_transaction()
            .withf(|hash| hash == "H3")
            .times(1)
            .returning(|h| Ok(found(h)));

        let ctx = ConfirmationVerifier::new(&ledger, Duration::ZERO)
            .verify(ctx)
            .await;

        assert!(ctx.tasks[0].affirmed());
        assert!(!ctx.tasks[1].affirmed());
        assert!(ctx.tasks[1].verification_error().is_none());
        assert!(matches!(ctx.tasks[1].verification, VerificationState::NotChecked));
        assert!(ctx.tasks[2].affirmed());
    }

    #[tokio::test]
    async fn test_lookup_error_is_recorded_and_run_continues() {
        let ctx = context(vec![submitted("H1"), submitted("H2")]);

        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_transaction()
            .withf(|hash| hash == "H1")
            .times(1)
            .returning(|_| Err(Error::Rpc("tx not found".to_string())));
        ledger
            .expect_transaction()
            .withf(|hash| hash == "H2")
            .times(1)
            .returning(|h| Ok(found(h)));

        let ctx = ConfirmationVerifier::new(&ledger, Duration::ZERO)
            .verify(ctx)
            .await;

        assert!(!ctx.tasks[0].affirmed());
        assert!(ctx.tasks[0].verification_error().is_some());
        assert_eq!(ctx.tasks[0].transaction_hash(), Some("H1"));
        assert!(ctx.tasks[1].affirmed());
    }

    #[tokio::test]
    async fn test_empty_record_hash_is_not_affirmed() {
        let ctx = context(vec![submitted("H1")]);
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_transaction()
            .returning(|_| Ok(TransactionRecord::default()));

        let ctx = ConfirmationVerifier::new(&ledger, Duration::ZERO)
            .verify(ctx)
            .await;

        assert!(!ctx.tasks[0].affirmed());
        assert!(ctx.tasks[0].verification_error().is_none());
        assert!(matches!(ctx.tasks[0].verification, VerificationState::Unconfirmed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_before_each_lookup() {
        let ctx = context(vec![submitted("H1"), submitted("H2")]);
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_transaction()
            .times(2)
            .returning(|h| Ok(found(h)));

        let started = tokio::time::Instant::now();
        ConfirmationVerifier::new(&ledger, Duration::from_secs(1))
            .verify(ctx)
            .await;
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
