use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Orders the requests a view issues so that only the newest response is
/// applied.
#[derive(Clone, Debug, Default)]
pub struct RequestSeq(Arc<AtomicU64>);

/// Handle for one issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestSeq {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a request, superseding any in flight.
	pub fn issue(&self) -> Ticket {
		Ticket(self.0.fetch_add(1, Ordering::Relaxed) + 1)
	}

	/// Whether `ticket` is still the latest issued.
	pub fn is_current(&self, ticket: Ticket) -> bool {
		self.0.load(Ordering::Relaxed) == ticket.0
	}

	/// Drop whatever is in flight without starting anything new.
	pub fn invalidate(&self) {
		self.0.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn newest_ticket_wins() {
		let seq = RequestSeq::new();
		let first = seq.issue();
		assert!(seq.is_current(first));
		let second = seq.issue();
		assert!(!seq.is_current(first));
		assert!(seq.is_current(second));
	}

	#[test]
	fn clones_share_the_counter() {
		let seq = RequestSeq::new();
		let handle = seq.clone();
		let ticket = seq.issue();
		handle.issue();
		assert!(!seq.is_current(ticket));
	}

	#[test]
	fn invalidate_discards_in_flight() {
		let seq = RequestSeq::new();
		let ticket = seq.issue();
		seq.invalidate();
		assert!(!seq.is_current(ticket));
	}
}
