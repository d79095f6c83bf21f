mod cli;
mod codec;
mod config;
mod dns;
mod error;
mod output;
mod stats;
mod tester;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::bail;
use clap::Parser;

use crate::cli::Cli;
use crate::config::TesterConfig;
use crate::stats::TestReport;
use crate::tester::DnsTester;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let cli = Cli::parse();

	let (base_ip, prefix_len) = codec::parse_subnet(&cli.subnet)?;
	if cli.requests == 0 {
		bail!("at least one request is required");
	}
	if cli.burst_size == 0 {
		bail!("burst size must be at least 1");
	}
	if cli.burst_delay == 0 {
		bail!("burst delay must be at least 1 ms");
	}
	let index_space = u64::from(codec::index_mask(prefix_len)) + 1;
	if u64::from(cli.requests) > index_space {
		bail!(
			"subnet /{} leaves room for only {} probe addresses, {} requested",
			prefix_len,
			index_space,
			cli.requests,
		);
	}

	let config = TesterConfig {
		server: SocketAddr::new(IpAddr::V6(cli.server), cli.port),
		base_ip,
		prefix_len,
		requests: cli.requests,
		burst_size: cli.burst_size,
		burst_delay: Duration::from_millis(cli.burst_delay),
		receive_timeout: Duration::from_millis(cli.timeout),
		domain: cli.domain.clone(),
	};

	output::print_config_summary(&config);

	println!("Running benchmark...");
	let tester = DnsTester::new(config.clone()).await?;
	let run = tester.run().await?;

	let report = TestReport::from_slots(&run.slots);
	output::print_report(&report);

	output::write_results(&cli.output, &config, &run.slots, run.epoch)?;
	println!("Results written to: {}", cli.output);

	Ok(())
}
