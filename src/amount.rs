//! Decimal amount normalization
//!
//! Input amounts arrive as human-readable decimal strings ("1.23"). The ledger
//! only deals in integer base units, so every amount is scaled by
//! `10^decimals`. Fractional digits beyond the precision are truncated, never
//! rounded; missing ones are zero-padded.
//!
//! ```
//! use airdrop_engine::amount::to_base_units;
//!
//! assert_eq!(to_base_units("1.23", 4).unwrap(), 12300);
//! assert_eq!(to_base_units("1.23456", 4).unwrap(), 12345);
//! assert_eq!(to_base_units("5", 2).unwrap(), 500);
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::ReceiverTransfer;

/// Highest precision accepted; 10^19 no longer fits into a u64
pub const MAX_DECIMALS: u32 = 18;

/// Raw transfer entry as found in the input file
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransfer {
    #[serde(rename = "To", alias = "to")]
    pub to: String,
    #[serde(rename = "Amount", alias = "amount")]
    pub amount: String,
    #[serde(rename = "BlockNumber", alias = "blockNumber", default)]
    pub block_number: Option<String>,
    #[serde(rename = "Hash", alias = "hash", default)]
    pub hash: Option<String>,
}

/// Read the JSON array of raw transfers from `path`
pub fn read_raw_transfers(path: impl AsRef<Path>) -> Result<Vec<RawTransfer>> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read input file {}: {}", path.display(), e))
    })?;
    let raw: Vec<RawTransfer> = serde_json::from_str(&data)?;
    Ok(raw)
}

/// Convert a decimal string into base units at the given precision
pub fn to_base_units(value: &str, decimals: u32) -> Result<u64> {
    if decimals > MAX_DECIMALS {
        return Err(Error::Amount(format!(
            "decimal precision {} exceeds maximum of {}",
            decimals, MAX_DECIMALS
        )));
    }

    let value = value.trim();
    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (value, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::Amount(format!("invalid amount '{}'", value)));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::Amount(format!("invalid amount '{}'", value)));
    }

    let precision = decimals as usize;
    let mut digits = String::with_capacity(int_part.len() + precision);
    digits.push_str(int_part);
    if frac_part.len() >= precision {
        digits.push_str(&frac_part[..precision]);
    } else {
        digits.push_str(frac_part);
        digits.extend(std::iter::repeat('0').take(precision - frac_part.len()));
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }

    digits
        .parse::<u64>()
        .map_err(|_| Error::Amount(format!("amount '{}' overflows base units", value)))
}

/// Render base units back as a decimal string (trailing zeros trimmed)
pub fn format_base_units(amount: u64, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u128.pow(decimals);
    let int_part = amount as u128 / scale;
    let frac_part = amount as u128 % scale;
    if frac_part == 0 {
        return int_part.to_string();
    }
    let frac = format!("{:0width$}", frac_part, width = decimals as usize);
    format!("{}.{}", int_part, frac.trim_end_matches('0'))
}

/// Normalize raw transfers into base-unit receivers plus their total
pub fn normalize(raw: &[RawTransfer], decimals: u32) -> Result<(Vec<ReceiverTransfer>, u64)> {
    let mut sum: u64 = 0;
    let mut receivers = Vec::with_capacity(raw.len());

    for (idx, entry) in raw.iter().enumerate() {
        let amount = to_base_units(&entry.amount, decimals)
            .map_err(|e| Error::Amount(format!("receiver {} ({}): {}", idx, entry.to, e)))?;
        sum = sum.checked_add(amount).ok_or_else(|| {
            Error::Amount("total airdrop amount overflows base units".to_string())
        })?;
        receivers.push(ReceiverTransfer::new(entry.to.trim(), amount));
    }

    Ok((receivers, sum))
}
