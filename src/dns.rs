use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::{Name, RecordType};

use crate::codec::{probe_label, LABEL_LEN};
use crate::error::TesterError;

const HEADER_LEN: usize = 12;

/// Reusable DNS query buffer.
///
/// Holds one fully encoded AAAA query whose question name starts with a
/// placeholder address label; `set_probe_addr` overwrites that label in
/// place before each transmission, so the buffer is serialized exactly once
/// for the whole run. Exclusively owned by the sender.
pub struct QueryTemplate {
	buf: Vec<u8>,
	label: std::ops::Range<usize>,
}

impl QueryTemplate {
	/// Build the base query for the given probe domain suffix.
	///
	/// Header fields: id 0, opcode QUERY, recursion desired, one question of
	/// type AAAA class IN. No transaction-ID bookkeeping happens anywhere;
	/// the address label is the correlation key.
	pub fn new(domain: &str) -> Result<Self, TesterError> {
		let name = Name::from_ascii(format!("{}.{}.", probe_label(0), domain))
			.map_err(|e| TesterError::Template(format!("invalid probe domain '{}': {}", domain, e)))?;

		let mut message = Message::new();
		message.set_id(0);
		message.set_recursion_desired(true);
		message.add_query(Query::query(name, RecordType::AAAA));

		let buf = message
			.to_vec()
			.map_err(|e| TesterError::Template(format!("failed to serialize query: {}", e)))?;

		// The question name follows the fixed 12-byte header; its first byte
		// is the length of the address label.
		if buf.get(HEADER_LEN) != Some(&(LABEL_LEN as u8)) {
			return Err(TesterError::Template(
				"address label not at expected offset".to_string(),
			));
		}
		let start = HEADER_LEN + 1;
		Ok(Self {
			buf,
			label: start..start + LABEL_LEN,
		})
	}

	/// Overwrite the address label in place with the given probe address.
	pub fn set_probe_addr(&mut self, addr: u32) {
		let label = probe_label(addr);
		self.buf[self.label.clone()].copy_from_slice(label.as_bytes());
	}

	/// The encoded query, ready to send.
	pub fn bytes(&self) -> &[u8] {
		&self.buf
	}
}

/// True when a parsed response counts as a valid answer: it is a response,
/// carries the NoError status, and has at least one answer record.
pub fn is_valid_answer(message: &Message) -> bool {
	message.message_type() == MessageType::Response
		&& message.response_code() == ResponseCode::NoError
		&& message.answer_count() > 0
}

#[cfg(test)]
mod tests {
	use super::*;
	use hickory_proto::rr::rdata::AAAA;
	use hickory_proto::rr::{DNSClass, RData, Record};
	use std::net::Ipv6Addr;

	#[test]
	fn test_template_is_well_formed() {
		let template = QueryTemplate::new("dns64perf.test").unwrap();
		let message = Message::from_vec(template.bytes()).unwrap();
		assert_eq!(message.id(), 0);
		assert_eq!(message.message_type(), MessageType::Query);
		assert!(message.recursion_desired());
		assert_eq!(message.queries().len(), 1);
		let question = &message.queries()[0];
		assert_eq!(question.query_type(), RecordType::AAAA);
		assert_eq!(question.query_class(), DNSClass::IN);
		assert_eq!(
			question.name().to_ascii(),
			"000-000-000-000.dns64perf.test.",
		);
	}

	#[test]
	fn test_patch_label_in_place() {
		let mut template = QueryTemplate::new("dns64perf.test").unwrap();
		let before = template.bytes().len();

		template.set_probe_addr(0xC612_002A); // 198.18.0.42
		assert_eq!(template.bytes().len(), before);
		let message = Message::from_vec(template.bytes()).unwrap();
		assert_eq!(
			message.queries()[0].name().to_ascii(),
			"198-018-000-042.dns64perf.test.",
		);

		// A second patch replaces the first cleanly
		template.set_probe_addr(0xC612_0001);
		let message = Message::from_vec(template.bytes()).unwrap();
		assert_eq!(
			message.queries()[0].name().to_ascii(),
			"198-018-000-001.dns64perf.test.",
		);
	}

	#[test]
	fn test_valid_answer_requires_all_three_conditions() {
		let template = QueryTemplate::new("dns64perf.test").unwrap();
		let query = Message::from_vec(template.bytes()).unwrap();

		// A query is not an answer at all
		assert!(!is_valid_answer(&query));

		let mut response = query.clone();
		response.set_message_type(MessageType::Response);
		// Response without answer records
		assert!(!is_valid_answer(&response));

		let name = response.queries()[0].name().clone();
		response.add_answer(Record::from_rdata(
			name,
			60,
			RData::AAAA(AAAA(Ipv6Addr::LOCALHOST)),
		));
		assert!(is_valid_answer(&response));

		// Non-success status invalidates the answer
		response.set_response_code(ResponseCode::ServFail);
		assert!(!is_valid_answer(&response));
	}
}
