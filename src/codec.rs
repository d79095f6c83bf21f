use anyhow::{anyhow, Result};

use crate::error::TesterError;

/// Length in bytes of the fixed-width address label.
pub const LABEL_LEN: usize = 15;

/// Format a probe address as the fixed-width first label of the query name:
/// four zero-padded octets joined by hyphens, e.g. "198-018-000-042".
///
/// The fixed width is what makes in-place patching of the query template
/// possible: every address renders to exactly `LABEL_LEN` bytes.
pub fn probe_label(addr: u32) -> String {
	let [a, b, c, d] = addr.to_be_bytes();
	format!("{:03}-{:03}-{:03}-{:03}", a, b, c, d)
}

/// Fully-qualified probe name for sequence number `n`.
pub fn probe_name(base_ip: u32, n: u32, domain: &str) -> String {
	format!("{}.{}.", probe_label(base_ip | n), domain)
}

/// Parse an address label back into the probe address it encodes.
///
/// The inverse of `probe_label`: exactly four hyphen-separated integers,
/// each fitting in an octet. Anything else is a malformed label.
pub fn parse_label(label: &str) -> Result<u32, TesterError> {
	let mut octets = [0u8; 4];
	let mut parts = label.split('-');
	for octet in octets.iter_mut() {
		*octet = parts
			.next()
			.and_then(|p| p.parse().ok())
			.ok_or_else(|| TesterError::MalformedLabel(label.to_string()))?;
	}
	if parts.next().is_some() {
		return Err(TesterError::MalformedLabel(label.to_string()));
	}
	Ok(u32::from_be_bytes(octets))
}

/// Bit mask selecting the sequence-number bits below the fixed prefix.
///
/// Computed in 64-bit arithmetic so both boundary prefixes are defined:
/// prefix 0 masks the whole address, prefix 32 leaves no index bits.
pub fn index_mask(prefix_len: u8) -> u32 {
	debug_assert!(prefix_len <= 32);
	((1u64 << (32 - u64::from(prefix_len))) - 1) as u32
}

/// Recover the sequence number embedded in a probe address.
pub fn sequence_number(addr: u32, prefix_len: u8, total: u32) -> Result<u32, TesterError> {
	let index = addr & index_mask(prefix_len);
	if index >= total {
		return Err(TesterError::IndexOutOfRange { index, total });
	}
	Ok(index)
}

/// Parse a probe subnet argument in "base/prefix" form, e.g. "198.18.0.0/16".
///
/// The prefix counts the fixed high bits; the remaining low bits carry the
/// query sequence number and must be zero in the base address.
pub fn parse_subnet(input: &str) -> Result<(u32, u8)> {
	let trimmed = input.trim();
	let (base, prefix) = trimmed
		.split_once('/')
		.ok_or_else(|| anyhow!("subnet '{}' must be in base/prefix form", trimmed))?;
	let base: std::net::Ipv4Addr = base
		.parse()
		.map_err(|e| anyhow!("invalid base address '{}': {}", base, e))?;
	let prefix: u8 = prefix
		.parse()
		.map_err(|e| anyhow!("invalid prefix length '{}': {}", prefix, e))?;
	if prefix > 32 {
		return Err(anyhow!("prefix length /{} is out of range", prefix));
	}
	let base = u32::from(base);
	if base & index_mask(prefix) != 0 {
		return Err(anyhow!("subnet '{}' has host bits set below /{}", trimmed, prefix));
	}
	Ok((base, prefix))
}
