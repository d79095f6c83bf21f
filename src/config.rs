use std::net::SocketAddr;
use std::time::Duration;

/// Run configuration, immutable once the tester is constructed.
#[derive(Debug, Clone)]
pub struct TesterConfig {
	/// DUT address and port; every query goes here and every response must
	/// come back from here.
	pub server: SocketAddr,
	/// Base IPv4 value whose low bits carry the query sequence number.
	pub base_ip: u32,
	/// Number of high bits of the base address that stay fixed.
	pub prefix_len: u8,
	/// Total number of queries to send.
	pub requests: u32,
	/// Number of queries transmitted per scheduler tick.
	pub burst_size: u32,
	/// Delay between bursts.
	pub burst_delay: Duration,
	/// Receive timeout for one socket read.
	pub receive_timeout: Duration,
	/// Probe domain suffix appended after the address label.
	pub domain: String,
}

impl TesterConfig {
	/// Number of scheduler ticks needed to send every query.
	pub fn num_bursts(&self) -> u32 {
		self.requests.div_ceil(self.burst_size)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(requests: u32, burst_size: u32) -> TesterConfig {
		TesterConfig {
			server: "[::1]:53".parse().unwrap(),
			base_ip: 0xC612_0000,
			prefix_len: 16,
			requests,
			burst_size,
			burst_delay: Duration::from_millis(100),
			receive_timeout: Duration::from_secs(1),
			domain: "dns64perf.test".to_string(),
		}
	}

	#[test]
	fn test_num_bursts_exact_and_partial() {
		assert_eq!(config(4, 2).num_bursts(), 2);
		assert_eq!(config(5, 2).num_bursts(), 3);
		assert_eq!(config(1, 10).num_bursts(), 1);
	}
}
