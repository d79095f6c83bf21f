use std::fs::File;
use std::io::Write;
use std::net::Ipv4Addr;
use std::time::Instant;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::codec::probe_name;
use crate::config::TesterConfig;
use crate::error::TesterError;
use crate::stats::TestReport;
use crate::tester::QuerySlot;

/// Print a summary of the run configuration before starting.
pub fn print_config_summary(config: &TesterConfig) {
	println!("DNS64 Benchmark Configuration");
	println!("=============================");
	println!("Server:         [{}]:{}", config.server.ip(), config.server.port());
	println!("Probe subnet:   {}/{}", Ipv4Addr::from(config.base_ip), config.prefix_len);
	println!("Probe domain:   {}", config.domain);
	println!("Requests:       {}", config.requests);
	println!("Burst size:     {}", config.burst_size);
	println!("Burst delay:    {} ms", config.burst_delay.as_millis());
	println!("Recv timeout:   {} ms", config.receive_timeout.as_millis());
	println!();
}

/// Print the result summary as a formatted table.
pub fn print_report(report: &TestReport) {
	let (mean, stddev) = match (report.mean_rtt_ns, report.stddev_rtt_ns) {
		(Some(mean), Some(sd)) => {
			(format!("{:.2} ms", mean / 1e6), format!("{:.2} ms", sd / 1e6))
		}
		_ => ("no data".to_string(), "no data".to_string()),
	};

	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table.set_header(vec!["Metric", "Value"]);
	table.add_row(vec!["Sent queries".to_string(), report.total.to_string()]);
	table.add_row(vec![
		"Received answers".to_string(),
		format!("{} ({:.2}%)", report.num_received, report.received_pct()),
	]);
	table.add_row(vec![
		"Valid answers".to_string(),
		format!("{} ({:.2}%)", report.num_answered, report.answered_pct()),
	]);
	table.add_row(vec!["Mean RTT".to_string(), mean]);
	table.add_row(vec!["RTT std deviation".to_string(), stddev]);

	println!("\nBenchmark Results");
	println!("=================\n");
	println!("{table}");
}

/// Write the run configuration and every slot's raw outcome to `path`.
///
/// A human-readable parameter preamble, then the column header, then one
/// `;`-delimited row per sequence number in increasing order. Timestamps are
/// nanoseconds since the run epoch; a query that was never sent writes 0.
pub fn write_results(
	path: &str,
	config: &TesterConfig,
	slots: &[QuerySlot],
	epoch: Instant,
) -> Result<(), TesterError> {
	let wrap = |source: std::io::Error| TesterError::Output {
		path: path.to_string(),
		source,
	};

	let mut file = File::create(path).map_err(wrap)?;
	writeln!(file, "dns64-bench test parameters").map_err(wrap)?;
	writeln!(file, "server: {}", config.server.ip()).map_err(wrap)?;
	writeln!(file, "port: {}", config.server.port()).map_err(wrap)?;
	writeln!(file, "number of requests: {}", config.requests).map_err(wrap)?;
	writeln!(file, "burst size: {}", config.burst_size).map_err(wrap)?;
	writeln!(file, "delay between bursts: {} ns", config.burst_delay.as_nanos()).map_err(wrap)?;
	writeln!(file).map_err(wrap)?;

	let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(file);
	writer.write_record(["query", "tsent [ns]", "received", "answered", "rtt [ns]"])?;
	for (n, slot) in slots.iter().enumerate() {
		let tsent = slot
			.sent_at
			.map(|t| t.duration_since(epoch).as_nanos())
			.unwrap_or(0);
		writer.write_record([
			probe_name(config.base_ip, n as u32, &config.domain),
			tsent.to_string(),
			u8::from(slot.received).to_string(),
			u8::from(slot.answered).to_string(),
			slot.rtt.as_nanos().to_string(),
		])?;
	}
	writer.flush().map_err(wrap)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	fn test_config() -> TesterConfig {
		TesterConfig {
			server: "[2001:db8::1]:53".parse().unwrap(),
			base_ip: 0xC612_0000,
			prefix_len: 16,
			requests: 4,
			burst_size: 2,
			burst_delay: Duration::from_millis(100),
			receive_timeout: Duration::from_secs(2),
			domain: "dns64perf.test".to_string(),
		}
	}

	#[test]
	fn test_artifact_layout() {
		let epoch = Instant::now();
		let slots = vec![
			QuerySlot {
				sent_at: Some(epoch + Duration::from_nanos(100)),
				received: true,
				answered: true,
				rtt: Duration::from_nanos(1500),
			},
			QuerySlot {
				sent_at: Some(epoch + Duration::from_nanos(200)),
				received: true,
				answered: false,
				rtt: Duration::from_nanos(2500),
			},
			QuerySlot {
				sent_at: Some(epoch + Duration::from_nanos(300)),
				..Default::default()
			},
			QuerySlot::default(),
		];

		let path = std::env::temp_dir().join(format!("dns64-bench-test-{}.csv", std::process::id()));
		let path = path.to_str().unwrap().to_string();
		write_results(&path, &test_config(), &slots, epoch).unwrap();

		let content = std::fs::read_to_string(&path).unwrap();
		let lines: Vec<&str> = content.lines().collect();
		// 6 preamble lines + separator + header + exactly 4 data rows
		assert_eq!(lines.len(), 12);
		assert_eq!(lines[0], "dns64-bench test parameters");
		assert_eq!(lines[6], "");
		assert_eq!(lines[7], "query;tsent [ns];received;answered;rtt [ns]");
		assert_eq!(lines[8], "198-018-000-000.dns64perf.test.;100;1;1;1500");
		assert_eq!(lines[9], "198-018-000-001.dns64perf.test.;200;1;0;2500");
		assert_eq!(lines[10], "198-018-000-002.dns64perf.test.;300;0;0;0");
		// never sent: zero timestamp, zero rtt
		assert_eq!(lines[11], "198-018-000-003.dns64perf.test.;0;0;0;0");

		std::fs::remove_file(&path).ok();
	}

	#[test]
	fn test_unwritable_destination_is_fatal() {
		let err = write_results(
			"/nonexistent-dir/results.csv",
			&test_config(),
			&[QuerySlot::default()],
			Instant::now(),
		);
		assert!(matches!(err, Err(TesterError::Output { .. })));
	}
}
