//! Address parsing and validation using the bech32 crate

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

use crate::error::{Error, Result};
use crate::types::Network;

/// Length of an account address payload in bytes
pub const ADDRESS_LEN: usize = 20;

/// Parse a bech32 account address and return its raw payload
///
/// Only the classic Bech32 checksum is accepted, in either all-lower or
/// all-upper case. The human-readable part must match the network the
/// airdrop runs on.
pub fn parse_address(address: &str, network: Network) -> Result<Vec<u8>> {
    let checked = CheckedHrpstring::new::<Bech32>(address)
        .map_err(|e| Error::Address(format!("Failed to parse address {}: {}", address, e)))?;

    let prefix = checked.hrp().to_lowercase();
    if prefix != network.address_hrp() {
        return Err(Error::Address(format!(
            "Address {} has prefix '{}', expected '{}' for {}",
            address,
            prefix,
            network.address_hrp(),
            network
        )));
    }

    let payload: Vec<u8> = checked.byte_iter().collect();

    if payload.len() != ADDRESS_LEN {
        return Err(Error::Address(format!(
            "Address {} decodes to {} bytes, expected {}",
            address,
            payload.len(),
            ADDRESS_LEN
        )));
    }

    Ok(payload)
}

/// Resolve an address into the hex wire form used by transfer outputs
pub fn to_wire_address(address: &str, network: Network) -> Result<String> {
    parse_address(address, network).map(hex::encode)
}

/// Validate an address format without keeping the payload
pub fn is_valid_address(address: &str, network: Network) -> bool {
    parse_address(address, network).is_ok()
}

/// Encode a raw payload as an address of the given network
pub fn encode_address(payload: &[u8], network: Network) -> Result<String> {
    let hrp = Hrp::parse(network.address_hrp())
        .map_err(|e| Error::Address(format!("Invalid address prefix: {}", e)))?;
    bech32::encode::<Bech32>(hrp, payload)
        .map_err(|e| Error::Address(format!("Failed to encode address: {}", e)))
}

/// Redact an address or key for safe display/logging.
///
/// Keeps the first N and last M visible characters, replaces the middle with '…'.
pub fn redact_middle(input: &str, keep_start: usize, keep_end: usize) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= keep_start + keep_end + 1 {
        return input.to_string();
    }
    let start: String = chars[..keep_start].iter().collect();
    let end: String = chars[chars.len() - keep_end..].iter().collect();
    format!("{start}…{end}")
}
