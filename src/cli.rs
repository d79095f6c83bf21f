use clap::Parser;

/// DNS64 gateway benchmark tool
#[derive(Parser, Debug)]
#[command(name = "dns64-bench")]
#[command(about = "Measure DNS64 gateway performance over UDP")]
pub struct Cli {
	/// IPv6 address of the DNS64 gateway under test
	pub server: std::net::Ipv6Addr,

	/// UDP port of the gateway
	#[arg(short = 'p', long = "port", default_value = "53")]
	pub port: u16,

	/// Probe subnet as base/prefix; the bits below the prefix carry the
	/// query sequence number
	#[arg(long = "subnet", default_value = "198.18.0.0/16")]
	pub subnet: String,

	/// Total number of queries to send
	#[arg(short = 'n', long = "requests", default_value = "1000")]
	pub requests: u32,

	/// Number of queries per burst
	#[arg(short = 'b', long = "burst-size", default_value = "10")]
	pub burst_size: u32,

	/// Delay between bursts in milliseconds
	#[arg(long = "burst-delay", default_value = "100")]
	pub burst_delay: u64,

	/// Receive timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "2000")]
	pub timeout: u64,

	/// Probe domain suffix appended after the address label
	#[arg(long = "domain", default_value = "dns64perf.test")]
	pub domain: String,

	/// Output file for per-query results
	#[arg(short = 'o', long = "output", default_value = "dns64perf-results.csv")]
	pub output: String,
}
