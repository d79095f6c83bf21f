use std::net::SocketAddr;

/// Errors that abort a measurement run.
///
/// Every variant is fatal: it propagates to the top level and terminates the
/// run without a report or an output artifact. Individual send failures are
/// not represented here; they are logged and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum TesterError {
	#[error("cannot bind UDP socket: {0}")]
	Bind(#[source] std::io::Error),
	#[error("error receiving response: {0}")]
	Receive(#[source] std::io::Error),
	#[error("received packet from other host than the DUT: {got} (expected {expected})")]
	UnexpectedSender { got: SocketAddr, expected: SocketAddr },
	#[error("invalid answer from server: {0}")]
	InvalidAnswer(String),
	#[error("malformed probe label '{0}'")]
	MalformedLabel(String),
	#[error("probe index {index} out of range ({total} queries configured)")]
	IndexOutOfRange { index: u32, total: u32 },
	#[error("failed to build query template: {0}")]
	Template(String),
	#[error("cannot write results to '{path}': {source}")]
	Output {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to write results: {0}")]
	Csv(#[from] csv::Error),
}
