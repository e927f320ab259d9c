//! Airdrop CLI - Command-line interface for the airdrop engine
//!
//! Loads the run configuration and receiver list, then plans, submits and
//! verifies the airdrop batches and writes an audit report.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use airdrop_engine::amount::{format_base_units, normalize, read_raw_transfers};
use airdrop_engine::client::RpcClient;
use airdrop_engine::config::{load_config, AirdropConfig};
use airdrop_engine::ledger::LedgerClient;
use airdrop_engine::plan::{build_plan, PlanBuilder};
use airdrop_engine::report::{write_report, RunSummary};
use airdrop_engine::types::ReceiverTransfer;

#[derive(Parser)]
#[command(name = "airdrop-cli")]
#[command(about = "Batched token airdrops with post-submission verification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to airdrop.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the airdrop: plan, submit every batch, verify and write the report
    Run {
        /// Receiver list, overrides input_file from the configuration
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Report path, overrides report_file from the configuration
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Show the batch layout without submitting anything
    Plan {
        /// Receiver list, overrides input_file from the configuration
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Skip the balance lookup
        #[arg(long)]
        offline: bool,
    },
    /// Show the sender balance for the configured token
    Balance,
    /// Look up a transaction by hash
    Tx {
        /// Transaction hash
        hash: String,
    },
}

fn load(cli: &Cli) -> anyhow::Result<AirdropConfig> {
    let raw = load_config(cli.config.clone()).context("loading configuration")?;
    let config = AirdropConfig::from_raw(raw).context("validating configuration")?;
    config.log();
    Ok(config)
}

fn load_receivers(
    config: &AirdropConfig,
    input: Option<&PathBuf>,
) -> anyhow::Result<(Vec<ReceiverTransfer>, u64)> {
    let path = input.unwrap_or(&config.input_file);
    let raw = read_raw_transfers(path)
        .with_context(|| format!("reading receivers from {}", path.display()))?;
    let (receivers, total) = normalize(&raw, config.decimals).context("normalizing amounts")?;
    if receivers.is_empty() {
        anyhow::bail!("there must be at least one receiver");
    }
    tracing::info!(
        receivers = receivers.len(),
        total = %format_base_units(total, config.decimals),
        "loaded receivers"
    );
    Ok((receivers, total))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .init();
    }

    let config = load(&cli)?;
    let client = RpcClient::from_config(&config).context("creating RPC client")?;

    match &cli.command {
        Commands::Run { input, report } => {
            let (receivers, total) = load_receivers(&config, input.as_ref())?;

            let context = airdrop_engine::run(&config, &client, &receivers, total)
                .await
                .context("airdrop aborted before submission")?;

            let report_path = report.clone().unwrap_or_else(|| config.report_file.clone());
            write_report(&report_path, &context)
                .with_context(|| format!("writing report to {}", report_path.display()))?;

            let summary = RunSummary::from_context(&context);
            println!("Airdrop Complete");
            println!("================");
            println!("Batches: {}", summary.tasks);
            println!("Submitted: {}", summary.submitted);
            println!("Failed: {}", summary.failed);
            println!("Affirmed: {}", summary.affirmed);
            println!("Unverified: {}", summary.unverified);
            println!("Report: {}", report_path.display());

            if summary.failed > 0 || summary.unverified > 0 {
                eprintln!("⚠ Some batches need attention, see the report for details.");
            }
        }
        Commands::Plan { input, offline } => {
            let (receivers, total) = load_receivers(&config, input.as_ref())?;

            let tasks = if *offline {
                build_plan(&config.token, &receivers, config.batch_size, total, total)?
            } else {
                PlanBuilder::new(&client)
                    .prepare(&config, &receivers, total)
                    .await?
                    .tasks
            };

            println!("Execution Plan");
            println!("==============");
            println!("Token: {}", config.token);
            println!("Receivers: {}", receivers.len());
            println!("Total: {}", format_base_units(total, config.decimals));
            println!("Batches: {}", tasks.len());
            for task in &tasks {
                println!(
                    "  #{:<4} receivers: {:<5} amount: {}",
                    task.index,
                    task.transfers.len(),
                    format_base_units(task.total_amount(), config.decimals)
                );
            }
        }
        Commands::Balance => {
            let account = client
                .get_account(&config.sender.address)
                .await
                .context("fetching sender account")?;
            println!("Sender Balance");
            println!("==============");
            println!("Endpoint: {}", client.endpoint());
            println!("Network: {}", client.network());
            println!("Address: {}", account.address);
            println!("Sequence: {}", account.sequence);
            println!(
                "Balance: {} {}",
                format_base_units(account.free_balance(&config.token), config.decimals),
                config.token
            );
        }
        Commands::Tx { hash } => match client.transaction(hash).await {
            Ok(record) => {
                println!("Hash: {}", record.hash);
                match record.height {
                    Some(height) => println!("Height: {}", height),
                    None => println!("Height: pending"),
                }
                if let Some(code) = record.code {
                    println!("Code: {}", code);
                }
            }
            Err(e) => {
                eprintln!("Error fetching transaction: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
