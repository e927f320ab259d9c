//! # Airdrop Engine
//!
//! Batched, throttled and auditable token airdrops against a remote ledger.
//!
//! A run goes through three stages, each taking the [`plan::RunContext`] by
//! value and handing it on:
//!
//! - **Planning**: split receivers into fixed-size batches and refuse to start
//!   if the sender cannot pay for all of them
//! - **Execution**: submit one atomic multi-output transfer per batch, in order,
//!   at a fixed rate; a failed batch is recorded and the run moves on
//! - **Verification**: look every submitted hash up again to see which batches
//!   actually landed
//!
//! ## Example
//!
//! ```no_run
//! use airdrop_engine::amount::{normalize, read_raw_transfers};
//! use airdrop_engine::client::RpcClient;
//! use airdrop_engine::config::{load_config, AirdropConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AirdropConfig::from_raw(load_config(None)?)?;
//! let raw = read_raw_transfers(&config.input_file)?;
//! let (receivers, total) = normalize(&raw, config.decimals)?;
//!
//! let client = RpcClient::from_config(&config)?;
//! let context = airdrop_engine::run(&config, &client, &receivers, total).await?;
//! airdrop_engine::report::write_report(&config.report_file, &context)?;
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod amount;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod plan;
pub mod report;
pub mod rpc;
pub mod types;
pub mod verifier;

pub use error::{Error, Result};

/// Re-export commonly used types
pub use types::*;

pub use executor::BatchExecutor;
pub use ledger::LedgerClient;
pub use plan::{build_plan, ExecutionTask, PlanBuilder, RunContext};
pub use verifier::ConfirmationVerifier;

use config::AirdropConfig;

/// Plan, execute and verify a whole airdrop.
///
/// Only planning errors (empty receiver set, insufficient balance, failed
/// balance lookup) are returned; everything after that is recorded on the
/// individual tasks of the returned context.
pub async fn run(
    config: &AirdropConfig,
    client: &dyn LedgerClient,
    receivers: &[ReceiverTransfer],
    total_required: u64,
) -> Result<RunContext> {
    let context = PlanBuilder::new(client)
        .prepare(config, receivers, total_required)
        .await?;

    let context = BatchExecutor::new(client, config.batch_interval)
        .execute(context)
        .await;

    let context = ConfirmationVerifier::new(client, config.verify_delay)
        .verify(context)
        .await;

    Ok(context)
}
