//! Re-entrancy guard for AI-driven edits.
//!
//! ```text
//! Idle ──try_begin──► Processing ──finish/drop──► Settling(until) ──until──► Idle
//! ```
//!
//! A [`GatePermit`] is handed out only while the gate is idle. Releasing the
//! permit, explicitly or by dropping it, keeps the gate closed for the settle
//! delay so a follow-up action does not land on a document that is still
//! being re-rendered.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
	Idle,
	Processing,
	Settling { until: Instant },
}

/// Shared gate; clones observe and drive the same state.
#[derive(Debug, Clone)]
pub struct ActionGate {
	state: Arc<Mutex<GateState>>,
	settle: Duration,
}

impl Default for ActionGate {
	fn default() -> Self {
		Self::new(Duration::ZERO)
	}
}

impl ActionGate {
	pub fn new(settle: Duration) -> Self {
		Self {
			state: Arc::new(Mutex::new(GateState::Idle)),
			settle,
		}
	}

	pub fn settle_delay(&self) -> Duration {
		self.settle
	}

	pub fn state(&self) -> GateState {
		self.state_at(Instant::now())
	}

	/// State as observed at `now`; an elapsed settle period reads as idle.
	pub fn state_at(&self, now: Instant) -> GateState {
		let mut state = self.state.lock();
		settle(&mut state, now);
		*state
	}

	pub fn is_busy(&self) -> bool {
		self.state() != GateState::Idle
	}

	/// Enters `Processing` if the gate is idle.
	pub fn try_begin(&self) -> Option<GatePermit> {
		self.try_begin_at(Instant::now())
	}

	pub fn try_begin_at(&self, now: Instant) -> Option<GatePermit> {
		let mut state = self.state.lock();
		settle(&mut state, now);
		if *state != GateState::Idle {
			trace!(state = ?*state, "action gate busy");
			return None;
		}
		*state = GateState::Processing;
		Some(GatePermit {
			state: self.state.clone(),
			settle: self.settle,
			released: false,
		})
	}
}

fn settle(state: &mut GateState, now: Instant) {
	if let GateState::Settling { until } = *state
		&& now >= until
	{
		*state = GateState::Idle;
	}
}

/// Exclusive right to run one action; releases the gate when dropped.
#[derive(Debug)]
#[must_use = "dropping the permit releases the gate immediately"]
pub struct GatePermit {
	state: Arc<Mutex<GateState>>,
	settle: Duration,
	released: bool,
}

impl GatePermit {
	pub fn finish(self) {
		self.finish_at(Instant::now());
	}

	pub fn finish_at(mut self, now: Instant) {
		self.release(now);
	}

	fn release(&mut self, now: Instant) {
		if self.released {
			return;
		}
		self.released = true;
		let next = if self.settle.is_zero() {
			GateState::Idle
		} else {
			GateState::Settling {
				until: now + self.settle,
			}
		};
		*self.state.lock() = next;
		trace!(state = ?next, "action gate released");
	}
}

impl Drop for GatePermit {
	fn drop(&mut self) {
		self.release(Instant::now());
	}
}
