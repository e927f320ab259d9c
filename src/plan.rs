//! Execution planning
//!
//! Splits the receiver list into ordered, fixed-size batches and gates the
//! run on the sender holding enough of the token to pay every batch.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::AirdropConfig;
use crate::error::{Error, Result};
use crate::ledger::LedgerClient;
use crate::types::{Network, ReceiverTransfer};

/// Upper bound on outputs in a single transfer transaction
pub const MAX_BATCH_SIZE: usize = 1000;

/// Where a task stands after the submission stage
#[derive(Debug, Default)]
pub enum SubmissionState {
    #[default]
    Pending,
    Submitted { hash: String },
    Failed(Error),
}

/// Where a task stands after the confirmation stage
#[derive(Debug, Default)]
pub enum VerificationState {
    #[default]
    NotChecked,
    /// The ledger returned the transaction
    Affirmed,
    /// The lookup succeeded but carried no transaction hash
    Unconfirmed,
    Failed(Error),
}

/// One batch: a single atomic multi-output transfer
#[derive(Debug)]
pub struct ExecutionTask {
    pub index: usize,
    pub token: String,
    pub transfers: Vec<ReceiverTransfer>,
    pub submission: SubmissionState,
    pub verification: VerificationState,
}

impl ExecutionTask {
    pub fn new(index: usize, token: impl Into<String>, transfers: Vec<ReceiverTransfer>) -> Self {
        Self {
            index,
            token: token.into(),
            transfers,
            submission: SubmissionState::Pending,
            verification: VerificationState::NotChecked,
        }
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        match &self.submission {
            SubmissionState::Submitted { hash } => Some(hash),
            _ => None,
        }
    }

    pub fn submission_error(&self) -> Option<&Error> {
        match &self.submission {
            SubmissionState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn verification_error(&self) -> Option<&Error> {
        match &self.verification {
            VerificationState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn affirmed(&self) -> bool {
        matches!(self.verification, VerificationState::Affirmed)
    }

    /// Hash or error has been recorded
    pub fn is_terminal(&self) -> bool {
        !matches!(self.submission, SubmissionState::Pending)
    }

    /// Sum of all transfer amounts in base units
    pub fn total_amount(&self) -> u64 {
        self.transfers.iter().map(|t| t.amount).sum()
    }
}

/// Settings fixed for the whole run
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub network: Network,
    pub token: String,
    pub decimals: u32,
    pub batch_size: usize,
    pub batch_interval: Duration,
    pub verify_delay: Duration,
    pub total_sum: u64,
    pub receiver_count: usize,
}

impl RunConfiguration {
    pub fn from_config(config: &AirdropConfig, total_sum: u64, receiver_count: usize) -> Self {
        Self {
            network: config.network,
            token: config.token.clone(),
            decimals: config.decimals,
            batch_size: config.batch_size,
            batch_interval: config.batch_interval,
            verify_delay: config.verify_delay,
            total_sum,
            receiver_count,
        }
    }
}

/// Everything one airdrop run owns, handed from stage to stage by value
#[derive(Debug)]
pub struct RunContext {
    pub config: RunConfiguration,
    pub sender: String,
    pub tasks: Vec<ExecutionTask>,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
}

impl RunContext {
    pub fn new(config: RunConfiguration, sender: impl Into<String>, tasks: Vec<ExecutionTask>) -> Self {
        Self {
            config,
            sender: sender.into(),
            tasks,
            started_at: None,
            completed_at: None,
        }
    }
}

/// Partition `receivers` into batches of at most `batch_size`.
///
/// Fails when the balance cannot cover `total_required`, when there is
/// nothing to send, or when the batch size is outside `1..=MAX_BATCH_SIZE`.
/// Task `i` holds receivers `[i*b, min((i+1)*b, n))`, in input order.
pub fn build_plan(
    token: &str,
    receivers: &[ReceiverTransfer],
    batch_size: usize,
    sender_available_balance: u64,
    total_required: u64,
) -> Result<Vec<ExecutionTask>> {
    if sender_available_balance < total_required {
        return Err(Error::InsufficientBalance {
            available: sender_available_balance,
            required: total_required,
        });
    }
    if receivers.is_empty() {
        return Err(Error::EmptyReceiverSet);
    }
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        return Err(Error::InvalidBatchSize(batch_size));
    }

    let tasks: Vec<ExecutionTask> = receivers
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| ExecutionTask::new(index, token, chunk.to_vec()))
        .collect();

    debug!(
        receivers = receivers.len(),
        batch_size,
        tasks = tasks.len(),
        "built execution plan"
    );
    Ok(tasks)
}

/// Prepares a run: looks up the sender balance and builds the task list
pub struct PlanBuilder<'a> {
    client: &'a dyn LedgerClient,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(client: &'a dyn LedgerClient) -> Self {
        Self { client }
    }

    /// Build the run context, failing before any submission if the sender
    /// cannot pay for the whole airdrop.
    pub async fn prepare(
        &self,
        config: &AirdropConfig,
        receivers: &[ReceiverTransfer],
        total_required: u64,
    ) -> Result<RunContext> {
        if receivers.is_empty() {
            return Err(Error::EmptyReceiverSet);
        }

        let sender = config.sender.address.as_str();
        let balance = self.client.account_balance(sender, &config.token).await?;
        info!(
            balance,
            required = total_required,
            token = %config.token,
            "sender balance"
        );

        let tasks = build_plan(
            &config.token,
            receivers,
            config.batch_size,
            balance,
            total_required,
        )?;
        info!(
            tasks = tasks.len(),
            receivers = receivers.len(),
            "execution plan ready"
        );

        let run_config = RunConfiguration::from_config(config, total_required, receivers.len());
        Ok(RunContext::new(run_config, sender, tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MockLedgerClient;

    fn receivers(n: usize) -> Vec<ReceiverTransfer> {
        (0..n)
            .map(|i| ReceiverTransfer::new(format!("addr{i}"), i as u64 + 1))
            .collect()
    }

    fn flatten(tasks: &[ExecutionTask]) -> Vec<ReceiverTransfer> {
        tasks.iter().flat_map(|t| t.transfers.clone()).collect()
    }

    #[test]
    fn test_partition_is_complete_and_ordered() {
        for n in 1..=25 {
            for b in 1..=12 {
                let input = receivers(n);
                let tasks = build_plan("T", &input, b, u64::MAX, 0).unwrap();
                assert_eq!(tasks.len(), n.div_ceil(b), "n={n} b={b}");
                assert_eq!(flatten(&tasks), input, "n={n} b={b}");
                for (i, task) in tasks.iter().enumerate() {
                    assert_eq!(task.index, i);
                    assert!(!task.transfers.is_empty());
                    assert!(task.transfers.len() <= b);
                }
            }
        }
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_empty_task() {
        let tasks = build_plan("T", &receivers(6), 3, 100, 0).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].transfers.len(), 3);
    }

    #[test]
    fn test_final_partial_batch_is_sized_correctly() {
        let tasks = build_plan("T", &receivers(7), 3, 100, 0).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].transfers, vec![ReceiverTransfer::new("addr6", 7)]);
    }

    #[test]
    fn test_balance_gate_boundary() {
        let input = receivers(3);
        assert!(build_plan("T", &input, 2, 390, 390).is_ok());
        assert!(build_plan("T", &input, 2, 391, 390).is_ok());
        let err = build_plan("T", &input, 2, 389, 390).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientBalance {
                available: 389,
                required: 390
            }
        ));
    }

    #[test]
    fn test_empty_receiver_set_is_an_error() {
        assert!(matches!(
            build_plan("T", &[], 10, 0, 0),
            Err(Error::EmptyReceiverSet)
        ));
    }

    #[test]
    fn test_batch_size_bounds() {
        let input = receivers(2);
        assert!(matches!(
            build_plan("T", &input, 0, 10, 0),
            Err(Error::InvalidBatchSize(0))
        ));
        assert!(build_plan("T", &input, MAX_BATCH_SIZE, 10, 0).is_ok());
        assert!(build_plan("T", &input, MAX_BATCH_SIZE + 1, 10, 0).is_err());
    }

    #[test]
    fn test_worked_example() {
        let input = vec![
            ReceiverTransfer::new("A", 100),
            ReceiverTransfer::new("B", 250),
            ReceiverTransfer::new("C", 40),
        ];
        let tasks = build_plan("AIR-123", &input, 2, 1000, 390).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].transfers, input[..2].to_vec());
        assert_eq!(tasks[1].transfers, input[2..].to_vec());
        assert_eq!(tasks[0].total_amount(), 350);
        assert!(tasks.iter().all(|t| t.token == "AIR-123" && !t.is_terminal()));
    }

    #[test]
    fn test_task_accessors_follow_state() {
        let mut task = ExecutionTask::new(0, "T", receivers(1));
        assert_eq!(task.transaction_hash(), None);
        assert!(!task.affirmed());

        task.submission = SubmissionState::Submitted {
            hash: "H1".to_string(),
        };
        task.verification = VerificationState::Affirmed;
        assert_eq!(task.transaction_hash(), Some("H1"));
        assert!(task.submission_error().is_none());
        assert!(task.affirmed());
        assert!(task.is_terminal());
    }

    fn config_for(batch_size: usize) -> AirdropConfig {
        use crate::address::{encode_address, ADDRESS_LEN};
        use crate::config::parse_config;

        let sender = encode_address(&[5u8; ADDRESS_LEN], Network::Testnet).unwrap();
        let text = format!(
            "env = \"testnet\"\ntoken = \"AIR-123\"\nbatch_size = {batch_size}\n[sender]\naddress = \"{sender}\"\nkey = \"k\"\n"
        );
        AirdropConfig::from_raw(parse_config(&text).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_prepare_checks_balance_through_ledger() {
        let config = config_for(2);
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_account_balance()
            .times(1)
            .returning(|_, _| Ok(1000));

        let input = receivers(3);
        let context = PlanBuilder::new(&ledger)
            .prepare(&config, &input, 6)
            .await
            .unwrap();

        assert_eq!(context.tasks.len(), 2);
        assert_eq!(context.sender, config.sender.address);
        assert_eq!(context.config.total_sum, 6);
        assert_eq!(context.config.receiver_count, 3);
        assert!(context.started_at.is_none());
    }

    #[tokio::test]
    async fn test_prepare_rejects_insufficient_balance() {
        let config = config_for(2);
        let mut ledger = MockLedgerClient::new();
        ledger.expect_account_balance().returning(|_, _| Ok(5));

        let err = PlanBuilder::new(&ledger)
            .prepare(&config, &receivers(3), 6)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));
    }

    #[tokio::test]
    async fn test_prepare_with_no_receivers_skips_network() {
        let config = config_for(2);
        let mut ledger = MockLedgerClient::new();
        ledger.expect_account_balance().never();

        let err = PlanBuilder::new(&ledger)
            .prepare(&config, &[], 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyReceiverSet));
    }
}
