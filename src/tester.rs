use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hickory_proto::op::Message;
use log::{debug, warn};
use tokio::net::UdpSocket;

use crate::codec;
use crate::config::TesterConfig;
use crate::dns::{is_valid_answer, QueryTemplate};
use crate::error::TesterError;

/// Per-query result record, indexed by sequence number.
///
/// `sent_at` is written once by the sender; the remaining fields are written
/// at most once by the receiver when the correlated response arrives.
#[derive(Debug, Clone, Default)]
pub struct QuerySlot {
	pub sent_at: Option<Instant>,
	pub received: bool,
	pub answered: bool,
	pub rtt: Duration,
}

/// A completed run: the finalized slot table plus the instant the run
/// started, which serves as the epoch for artifact timestamps.
#[derive(Debug)]
pub struct TestRun {
	pub slots: Vec<QuerySlot>,
	pub epoch: Instant,
}

/// The query/response correlation engine.
///
/// Construction binds the local socket and preallocates the slot table and
/// the query template; `run` drives the burst sender and the receive loop
/// concurrently until every query has been sent.
pub struct DnsTester {
	config: TesterConfig,
	socket: Arc<UdpSocket>,
	slots: Arc<Mutex<Vec<QuerySlot>>>,
	num_sent: Arc<AtomicU32>,
	template: QueryTemplate,
}

impl DnsTester {
	pub async fn new(config: TesterConfig) -> Result<Self, TesterError> {
		let socket = UdpSocket::bind("[::]:0").await.map_err(TesterError::Bind)?;
		let slots = vec![QuerySlot::default(); config.requests as usize];
		let template = QueryTemplate::new(&config.domain)?;
		Ok(Self {
			config,
			socket: Arc::new(socket),
			slots: Arc::new(Mutex::new(slots)),
			num_sent: Arc::new(AtomicU32::new(0)),
			template,
		})
	}

	/// Run the measurement to completion.
	///
	/// Spawns the burst sender, then receives on the calling task until every
	/// query has been sent and one final receive cycle has elapsed. Any fatal
	/// condition aborts the whole run; the slot table is only handed out once
	/// both sides are done with it.
	pub async fn run(self) -> Result<TestRun, TesterError> {
		let DnsTester { config, socket, slots, num_sent, template } = self;
		let epoch = Instant::now();

		let sender = tokio::spawn(send_bursts(
			config.clone(),
			Arc::clone(&socket),
			Arc::clone(&slots),
			Arc::clone(&num_sent),
			template,
		));

		match receive_loop(&config, &socket, &slots, &num_sent).await {
			Ok(()) => {
				// The loop only exits after observing that the last burst
				// went out, so the sender has already run to completion.
				let _ = sender.await;
				let slots = slots.lock().unwrap().clone();
				Ok(TestRun { slots, epoch })
			}
			Err(e) => {
				sender.abort();
				Err(e)
			}
		}
	}
}

/// Burst sender: one tick per burst period, starting immediately, up to
/// `burst_size` queries per tick with the final burst possibly partial.
///
/// A failed or short send is logged and the query still counts as sent; it
/// will simply never be received.
async fn send_bursts(
	config: TesterConfig,
	socket: Arc<UdpSocket>,
	slots: Arc<Mutex<Vec<QuerySlot>>>,
	num_sent: Arc<AtomicU32>,
	mut template: QueryTemplate,
) {
	let num_bursts = config.num_bursts();
	let mut ticker = tokio::time::interval(config.burst_delay);
	let mut next: u32 = 0;

	for burst in 0..num_bursts {
		ticker.tick().await;
		let end = (next + config.burst_size).min(config.requests);
		debug!("burst {}/{}: queries {}..{}", burst + 1, num_bursts, next, end);

		while next < end {
			template.set_probe_addr(config.base_ip | next);
			match socket.send_to(template.bytes(), config.server).await {
				Ok(len) if len == template.bytes().len() => {}
				Ok(len) => warn!(
					"short write for query {}: {} of {} bytes",
					next,
					len,
					template.bytes().len(),
				),
				Err(e) => warn!("cannot send query {}: {}", next, e),
			}
			slots.lock().unwrap()[next as usize].sent_at = Some(Instant::now());
			num_sent.fetch_add(1, Ordering::Release);
			next += 1;
		}
	}
}

/// Receive until every query has been sent.
///
/// The all-sent condition is observed before each receive so that a tail
/// query that never gets answered costs exactly one extra timeout cycle.
/// A receive timeout is not an error; everything else is fatal.
async fn receive_loop(
	config: &TesterConfig,
	socket: &UdpSocket,
	slots: &Mutex<Vec<QuerySlot>>,
	num_sent: &AtomicU32,
) -> Result<(), TesterError> {
	let mut buf = vec![0u8; 4096];
	loop {
		let all_sent = num_sent.load(Ordering::Acquire) >= config.requests;
		match tokio::time::timeout(config.receive_timeout, socket.recv_from(&mut buf)).await {
			Ok(Ok((len, src))) => {
				let received_at = Instant::now();
				handle_response(config, slots, &buf[..len], src, received_at)?;
			}
			Ok(Err(e)) => return Err(TesterError::Receive(e)),
			Err(_) => {} // timeout, re-evaluate the termination condition
		}
		if all_sent {
			return Ok(());
		}
	}
}

/// Correlate one inbound datagram back to its slot.
///
/// The sequence number is recovered from the address embedded in the echoed
/// question name; there is no transaction-ID table to consult.
fn handle_response(
	config: &TesterConfig,
	slots: &Mutex<Vec<QuerySlot>>,
	datagram: &[u8],
	src: SocketAddr,
	received_at: Instant,
) -> Result<(), TesterError> {
	// Data from anyone but the DUT must never be attributed to a query
	if src.ip() != config.server.ip() || src.port() != config.server.port() {
		return Err(TesterError::UnexpectedSender {
			got: src,
			expected: config.server,
		});
	}

	let message = Message::from_vec(datagram)
		.map_err(|e| TesterError::InvalidAnswer(format!("unparseable response: {}", e)))?;
	let question = message
		.queries()
		.first()
		.ok_or_else(|| TesterError::InvalidAnswer("qdcount == 0".to_string()))?;
	let label = question
		.name()
		.iter()
		.next()
		.ok_or_else(|| TesterError::InvalidAnswer("empty question name".to_string()))?;
	let label = std::str::from_utf8(label)
		.map_err(|_| TesterError::MalformedLabel(format!("{:?}", label)))?;

	let addr = codec::parse_label(label)?;
	let n = codec::sequence_number(addr, config.prefix_len, config.requests)?;

	let mut slots = slots.lock().unwrap();
	let slot = &mut slots[n as usize];
	slot.received = true;
	if let Some(sent_at) = slot.sent_at {
		slot.rtt = received_at.duration_since(sent_at);
	}
	slot.answered = is_valid_answer(&message);
	debug!("response for query {} after {:?}", n, slot.rtt);
	Ok(())
}
