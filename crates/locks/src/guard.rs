//! Transaction guard: rejects edits that touch registered locks.
//!
//! Every step of a proposed transaction is checked against the document as it
//! was before the transaction. A step's affected range is expressed in the
//! coordinates of the document produced by the steps before it, so it is first
//! mapped back through their inverted maps:
//!
//! ```text
//! pre-edit doc ──step 0──► doc₁ ──step 1──► doc₂ ...
//!      ▲                                     │
//!      └──── invert(maps[0..i]) ◄─── range of step i
//! ```
//!
//! The first registered lock whose enforced span touches a mapped range
//! rejects the whole transaction.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use impetus_editor::{EditorState, Plugin, PluginKey};
use impetus_primitives::{Bias, Document, Span, Transaction};
use tracing::debug;

use crate::lock::{LockId, LockSource};
use crate::registry::SharedLockRegistry;
use crate::scan::visit_locks;

/// Plugin key of the [`TransactionGuard`].
pub const GUARD_KEY: PluginKey = "lock-guard";

/// Why a transaction was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
	pub lock_id: LockId,
	pub source: LockSource,
	/// Index of the first offending step.
	pub step_index: usize,
	/// The offending range, in pre-edit coordinates.
	pub range: Span,
}

/// Callback invoked once per rejected transaction.
pub type RejectCallback = Arc<dyn Fn(&Rejection) + Send + Sync>;

/// Filters transactions against the lock registry.
pub struct TransactionGuard {
	registry: SharedLockRegistry,
	on_reject: Option<RejectCallback>,
	scans: AtomicUsize,
}

impl std::fmt::Debug for TransactionGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransactionGuard")
			.field("on_reject", &self.on_reject.is_some())
			.field("scans", &self.scan_count())
			.finish_non_exhaustive()
	}
}

impl TransactionGuard {
	pub fn new(registry: SharedLockRegistry) -> Self {
		Self {
			registry,
			on_reject: None,
			scans: AtomicUsize::new(0),
		}
	}

	pub fn with_on_reject(mut self, on_reject: Option<RejectCallback>) -> Self {
		self.on_reject = on_reject;
		self
	}

	/// Number of transactions that required a document walk.
	pub fn scan_count(&self) -> usize {
		self.scans.load(Ordering::Relaxed)
	}

	/// Finds the first registered lock `tx` would touch, without side effects.
	pub fn check(&self, tx: &Transaction, doc_before: &Document) -> Option<Rejection> {
		if !tx.doc_changed() {
			return None;
		}
		self.scans.fetch_add(1, Ordering::Relaxed);

		let registry = self.registry.read();
		let mut rejection = None;
		for (step_index, step) in tx.steps().iter().enumerate() {
			let range = step.affected_range();
			let back = tx.mapping().slice(0, step_index).invert();
			let range = Span::new(
				back.map(range.from, Bias::Left),
				back.map(range.to, Bias::Right),
			);
			let flow = visit_locks(doc_before, range, &registry, |hit| {
				if hit.registered() && hit.enforced().touches(range) {
					rejection = Some(Rejection {
						lock_id: hit.lock_id().clone(),
						source: hit.source(),
						step_index,
						range,
					});
					return ControlFlow::Break(());
				}
				ControlFlow::Continue(())
			});
			if flow.is_break() {
				break;
			}
		}
		rejection
	}

	/// Returns true if `tx` may be applied to `doc_before`.
	///
	/// On rejection the callback runs exactly once, after the registry lock is released.
	pub fn filter(&self, tx: &Transaction, doc_before: &Document) -> bool {
		let Some(rejection) = self.check(tx, doc_before) else {
			return true;
		};
		debug!(
			lock_id = %rejection.lock_id,
			source = %rejection.source,
			step = rejection.step_index,
			from = rejection.range.from,
			to = rejection.range.to,
			"edit rejected by lock"
		);
		if let Some(on_reject) = &self.on_reject {
			on_reject(&rejection);
		}
		false
	}
}

impl Plugin for TransactionGuard {
	fn key(&self) -> PluginKey {
		GUARD_KEY
	}

	fn filter_transaction(&self, tx: &Transaction, state: &EditorState) -> bool {
		self.filter(tx, state.doc())
	}
}
