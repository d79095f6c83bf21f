use crate::tester::QuerySlot;

/// Summary statistics computed from the finalized slot table.
#[derive(Debug, Clone)]
pub struct TestReport {
	pub total: u32,
	pub num_received: u32,
	pub num_answered: u32,
	/// Mean RTT in nanoseconds over received slots; None when nothing was
	/// received, so no division by zero can ever happen.
	pub mean_rtt_ns: Option<f64>,
	/// Population standard deviation of the RTT in nanoseconds.
	pub stddev_rtt_ns: Option<f64>,
}

impl TestReport {
	/// Aggregate the slot table; RTT statistics cover received slots only.
	pub fn from_slots(slots: &[QuerySlot]) -> Self {
		let rtts: Vec<f64> = slots
			.iter()
			.filter(|s| s.received)
			.map(|s| s.rtt.as_nanos() as f64)
			.collect();
		let num_answered = slots.iter().filter(|s| s.answered).count() as u32;

		TestReport {
			total: slots.len() as u32,
			num_received: rtts.len() as u32,
			num_answered,
			mean_rtt_ns: mean(&rtts),
			stddev_rtt_ns: stddev(&rtts),
		}
	}

	pub fn received_pct(&self) -> f64 {
		percentage(self.num_received, self.total)
	}

	pub fn answered_pct(&self) -> f64 {
		percentage(self.num_answered, self.total)
	}
}

fn percentage(count: u32, total: u32) -> f64 {
	if total == 0 {
		return 0.0;
	}
	f64::from(count) / f64::from(total) * 100.0
}

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	let sum: f64 = values.iter().sum();
	Some(sum / values.len() as f64)
}

/// Calculate the population standard deviation of a slice of values.
pub fn stddev(values: &[f64]) -> Option<f64> {
	let avg = mean(values)?;
	let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
	Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	fn received_slot(rtt_ns: u64) -> QuerySlot {
		QuerySlot {
			sent_at: None,
			received: true,
			answered: true,
			rtt: Duration::from_nanos(rtt_ns),
		}
	}

	#[test]
	fn test_mean_and_stddev() {
		let values = vec![10.0, 20.0, 30.0];
		assert_eq!(mean(&values), Some(20.0));
		// Population formula: sqrt(((10-20)^2 + 0 + (30-20)^2) / 3)
		let sd = stddev(&values).unwrap();
		assert!((sd - 8.165).abs() < 0.001);
	}

	#[test]
	fn test_empty_input_yields_none() {
		let values: Vec<f64> = vec![];
		assert_eq!(mean(&values), None);
		assert_eq!(stddev(&values), None);
	}

	#[test]
	fn test_report_from_slots() {
		let slots = vec![
			received_slot(10),
			received_slot(20),
			received_slot(30),
			QuerySlot::default(),
		];
		let report = TestReport::from_slots(&slots);
		assert_eq!(report.total, 4);
		assert_eq!(report.num_received, 3);
		assert_eq!(report.num_answered, 3);
		assert_eq!(report.received_pct(), 75.0);
		assert_eq!(report.answered_pct(), 75.0);
		assert_eq!(report.mean_rtt_ns, Some(20.0));
		assert!((report.stddev_rtt_ns.unwrap() - 8.165).abs() < 0.001);
	}

	#[test]
	fn test_full_delivery_reports_100_percent() {
		let slots = vec![received_slot(10), received_slot(20)];
		let report = TestReport::from_slots(&slots);
		assert_eq!(report.received_pct(), 100.0);
		assert_eq!(report.answered_pct(), 100.0);
	}

	#[test]
	fn test_no_responses_reports_no_data() {
		let slots = vec![QuerySlot::default(); 5];
		let report = TestReport::from_slots(&slots);
		assert_eq!(report.num_received, 0);
		assert_eq!(report.mean_rtt_ns, None);
		assert_eq!(report.stddev_rtt_ns, None);
		assert_eq!(report.received_pct(), 0.0);
	}
}
