//! Run reporting
//
use std::path::Path;
//
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
//
use crate::amount::format_base_units;
use crate::error::Result;
use crate::plan::RunContext;
//
/// Task counts for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
	pub tasks: usize,
	pub submitted: usize,
	pub failed: usize,
	pub affirmed: usize,
	pub unverified: usize,
}
//
impl RunSummary {
	pub fn from_context(context: &RunContext) -> Self {
		let mut summary = RunSummary {
			tasks: context.tasks.len(),
			..Default::default()
		};
		for task in &context.tasks {
			if task.transaction_hash().is_some() {
				summary.submitted += 1;
				if task.affirmed() {
					summary.affirmed += 1;
				} else {
					summary.unverified += 1;
				}
			}
			if task.submission_error().is_some() {
				summary.failed += 1;
			}
		}
		summary
	}
}
//
fn timestamp(value: Option<OffsetDateTime>) -> String {
	value
		.and_then(|t| t.format(&Rfc3339).ok())
		.unwrap_or_default()
}
//
fn csv_field(value: impl ToString) -> String {
	value.to_string().replace(',', ";").replace('\n', " ")
}
//
/// Render the run as CSV for audits.
///
/// Columns: batch, token, receivers, amount, tx_hash, submission_error, affirmed, verification_error
pub fn render_csv(context: &RunContext) -> String {
	let mut out = String::from(
		"batch,token,receivers,amount,tx_hash,submission_error,affirmed,verification_error\n",
	);
	for task in &context.tasks {
		out.push_str(&format!(
			"{},{},{},{},{},{},{},{}\n",
			task.index,
			csv_field(&task.token),
			task.transfers.len(),
			format_base_units(task.total_amount(), context.config.decimals),
			task.transaction_hash().unwrap_or_default(),
			task.submission_error().map(csv_field).unwrap_or_default(),
			task.affirmed(),
			task.verification_error().map(csv_field).unwrap_or_default(),
		));
	}
	//
	let summary = RunSummary::from_context(context);
	out.push_str(&format!("# sender: {}\n", context.sender));
	out.push_str(&format!("# started_at: {}\n", timestamp(context.started_at)));
	out.push_str(&format!("# completed_at: {}\n", timestamp(context.completed_at)));
	out.push_str(&format!(
		"# tasks: {}, submitted: {}, failed: {}, affirmed: {}, unverified: {}\n",
		summary.tasks, summary.submitted, summary.failed, summary.affirmed, summary.unverified
	));
	out
}
//
/// Write the CSV report to `path`.
pub fn write_report(path: impl AsRef<Path>, context: &RunContext) -> Result<()> {
	std::fs::write(path, render_csv(context))?;
	Ok(())
}
//
#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use crate::plan::{build_plan, RunConfiguration, SubmissionState, VerificationState};
	use crate::types::{Network, ReceiverTransfer};
	use std::time::Duration;
	//
	fn finished_run() -> RunContext {
		let receivers = vec![
			ReceiverTransfer::new("A", 100),
			ReceiverTransfer::new("B", 250),
			ReceiverTransfer::new("C", 40),
		];
		let mut tasks = build_plan("AIR-123", &receivers, 2, 1000, 390).unwrap();
		tasks[0].submission = SubmissionState::Submitted { hash: "H1".to_string() };
		tasks[0].verification = VerificationState::Affirmed;
		tasks[1].submission = SubmissionState::Failed(Error::Rpc("rejected, bad sequence".to_string()));
		//
		let config = RunConfiguration {
			network: Network::Testnet,
			token: "AIR-123".to_string(),
			decimals: 2,
			batch_size: 2,
			batch_interval: Duration::ZERO,
			verify_delay: Duration::ZERO,
			total_sum: 390,
			receiver_count: 3,
		};
		let mut context = RunContext::new(config, "tbnb1sender", tasks);
		context.started_at = Some(time::macros::datetime!(2024-01-02 03:04:05 UTC));
		context.completed_at = Some(time::macros::datetime!(2024-01-02 03:05:00 UTC));
		context
	}
	//
	#[test]
	fn test_summary_counts() {
		let summary = RunSummary::from_context(&finished_run());
		assert_eq!(
			summary,
			RunSummary { tasks: 2, submitted: 1, failed: 1, affirmed: 1, unverified: 0 }
		);
	}
	//
	#[test]
	fn test_render_csv_rows() {
		let csv = render_csv(&finished_run());
		let lines: Vec<&str> = csv.lines().collect();
		assert!(lines[0].starts_with("batch,token,receivers"));
		assert_eq!(lines[1], "0,AIR-123,2,3.5,H1,,true,");
		assert_eq!(lines[2], "1,AIR-123,1,0.4,,RPC error: rejected; bad sequence,false,");
		assert!(csv.contains("# started_at: 2024-01-02T03:04:05Z"));
		assert!(csv.contains("failed: 1"));
	}
}
