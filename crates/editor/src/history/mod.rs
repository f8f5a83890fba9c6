//! Undo/redo history.
//!
//! [`History`] stores, for every recorded transaction, the steps that undo it.
//! Undo and redo are not applied by the history itself: it builds a
//! [`Transaction`] tagged with [`HISTORY_META`], and the state dispatches it
//! like any other edit (plugins may still reject it). The stacks only move
//! once that transaction is recorded.
//!
//! ```text
//! recorded edit ──► undo_stack ──(undo tx)──► redo_stack
//!                       ▲                         │
//!                       └───────(redo tx)─────────┘
//! ```
//!
//! Transactions that are not recorded (`addToHistory = false`, or refused by
//! the record filter) still change the document; stored entries are rebased
//! past them so later undos land on the right content.

use std::fmt;
use std::sync::Arc;

use impetus_primitives::{Document, Mapping, Step, StepMap, Transaction};
use tracing::{debug, trace};

/// Transaction meta: `false` keeps the transaction out of history.
pub const ADD_TO_HISTORY: &str = "addToHistory";

/// Transaction meta set on undo/redo transactions, with value [`UNDO`] or [`REDO`].
pub const HISTORY_META: &str = "history";

pub const UNDO: &str = "undo";
pub const REDO: &str = "redo";

/// Predicate deciding whether a transaction is recorded.
pub type RecordFilter = Arc<dyn Fn(&Transaction) -> bool + Send + Sync>;

/// History settings.
#[derive(Clone)]
pub struct HistoryConfig {
	/// Maximum number of undo entries kept.
	pub depth: usize,
	/// Extra record predicate, consulted after the `addToHistory` meta.
	pub record_filter: Option<RecordFilter>,
}

impl Default for HistoryConfig {
	fn default() -> Self {
		Self {
			depth: 100,
			record_filter: None,
		}
	}
}

impl fmt::Debug for HistoryConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HistoryConfig")
			.field("depth", &self.depth)
			.field("record_filter", &self.record_filter.is_some())
			.finish()
	}
}

impl HistoryConfig {
	pub fn with_depth(mut self, depth: usize) -> Self {
		self.depth = depth;
		self
	}

	pub fn with_record_filter<F>(mut self, filter: F) -> Self
	where
		F: Fn(&Transaction) -> bool + Send + Sync + 'static,
	{
		self.record_filter = Some(Arc::new(filter));
		self
	}

	/// Returns true if `tx` should be recorded.
	pub fn should_record(&self, tx: &Transaction) -> bool {
		if tx.meta_bool(ADD_TO_HISTORY) == Some(false) {
			return false;
		}
		self.record_filter.as_ref().is_none_or(|filter| filter(tx))
	}
}

/// One undoable unit: the steps that revert a recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	steps: Vec<Step>,
}

impl HistoryEntry {
	fn from_transaction(tx: &Transaction) -> Self {
		Self {
			steps: tx.inverse_steps(),
		}
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	fn build(&self, doc: &Document, direction: &'static str) -> Option<Transaction> {
		let mut tx = Transaction::new(doc);
		for step in &self.steps {
			if let Err(err) = tx.step(step.clone()) {
				debug!(direction, error = %err, "history entry no longer applies");
				return None;
			}
		}
		tx.set_meta(HISTORY_META, direction);
		Some(tx)
	}
}

/// Undo/redo stacks for one editor state.
#[derive(Debug, Clone, Default)]
pub struct History {
	config: HistoryConfig,
	undo_stack: Vec<HistoryEntry>,
	redo_stack: Vec<HistoryEntry>,
}

impl History {
	pub fn new(config: HistoryConfig) -> Self {
		Self {
			config,
			undo_stack: Vec::new(),
			redo_stack: Vec::new(),
		}
	}

	pub fn config(&self) -> &HistoryConfig {
		&self.config
	}

	/// Replaces the configuration; stored entries are kept.
	pub fn set_config(&mut self, config: HistoryConfig) {
		self.config = config;
		self.truncate();
	}

	pub fn undo_depth(&self) -> usize {
		self.undo_stack.len()
	}

	pub fn redo_depth(&self) -> usize {
		self.redo_stack.len()
	}

	pub fn undo_stack(&self) -> &[HistoryEntry] {
		&self.undo_stack
	}

	/// Records an applied transaction.
	pub fn record(&mut self, tx: &Transaction) {
		if !tx.doc_changed() {
			return;
		}
		let entry = HistoryEntry::from_transaction(tx);
		match tx.meta_str(HISTORY_META) {
			Some(UNDO) => {
				self.undo_stack.pop();
				self.redo_stack.push(entry);
				trace!(
					undo_stack = self.undo_stack.len(),
					redo_stack = self.redo_stack.len(),
					"undo recorded"
				);
			}
			Some(REDO) => {
				self.redo_stack.pop();
				self.undo_stack.push(entry);
				self.truncate();
				trace!(
					undo_stack = self.undo_stack.len(),
					redo_stack = self.redo_stack.len(),
					"redo recorded"
				);
			}
			_ if self.config.should_record(tx) => {
				self.undo_stack.push(entry);
				self.truncate();
				if !self.redo_stack.is_empty() {
					trace!(cleared = self.redo_stack.len(), "redo stack cleared");
				}
				self.redo_stack.clear();
				trace!(undo_stack = self.undo_stack.len(), "history entry pushed");
			}
			_ => self.rebase(tx),
		}
	}

	/// Builds the transaction undoing the most recent entry.
	///
	/// An entry that no longer applies to `doc` is discarded.
	pub fn undo_transaction(&mut self, doc: &Document) -> Option<Transaction> {
		let tx = self.undo_stack.last()?.build(doc, UNDO);
		if tx.is_none() {
			self.undo_stack.pop();
		}
		tx
	}

	/// Builds the transaction redoing the most recently undone entry.
	pub fn redo_transaction(&mut self, doc: &Document) -> Option<Transaction> {
		let tx = self.redo_stack.last()?.build(doc, REDO);
		if tx.is_none() {
			self.redo_stack.pop();
		}
		tx
	}

	pub fn clear(&mut self) {
		self.undo_stack.clear();
		self.redo_stack.clear();
	}

	fn truncate(&mut self) {
		if self.undo_stack.len() > self.config.depth {
			let excess = self.undo_stack.len() - self.config.depth;
			self.undo_stack.drain(..excess);
		}
	}

	/// Moves stored entries past a change that was not recorded.
	///
	/// Each stack is walked from its top, where `tx` applies directly. Entries
	/// further down live in the document as it was before the entries above
	/// them were made, so the change is carried down as a running mapping:
	///
	/// ```text
	/// below ──entry⁻¹──► above ──change──► above' ──entry'──► below'
	/// ```
	fn rebase(&mut self, tx: &Transaction) {
		if tx.mapping().is_identity() {
			return;
		}
		let before = (self.undo_stack.len(), self.redo_stack.len());
		for stack in [&mut self.undo_stack, &mut self.redo_stack] {
			let mut change = tx.mapping().clone();
			for entry in stack.iter_mut().rev() {
				let (steps, below) = rebase_steps(&entry.steps, &change);
				entry.steps = steps;
				change = below;
			}
			stack.retain(|entry| !entry.steps.is_empty());
		}
		trace!(
			undo_stack = self.undo_stack.len(),
			redo_stack = self.redo_stack.len(),
			dropped = before.0 + before.1 - self.undo_stack.len() - self.redo_stack.len(),
			"history rebased past unrecorded change"
		);
	}
}

/// Rebases a run of `steps` past `change`, a mapping of the document the run starts from.
///
/// Returns the surviving steps and the mapping of the document the original
/// run ends in. Step `i` is mapped back over the steps before it, through
/// `change`, then forward over their rebased versions; each original map is
/// mirrored with its rebased counterpart.
fn rebase_steps(steps: &[Step], change: &Mapping) -> (Vec<Step>, Mapping) {
	let mut originals: Vec<StepMap> = Vec::with_capacity(steps.len());
	let mut rebased: Vec<Option<StepMap>> = Vec::with_capacity(steps.len());
	let mut out = Vec::with_capacity(steps.len());
	for step in steps {
		let mapped = step.map(&chain(&originals, change, &rebased));
		originals.push(step.get_map());
		rebased.push(mapped.as_ref().map(Step::get_map));
		out.extend(mapped);
	}
	(out, chain(&originals, change, &rebased))
}

fn chain(originals: &[StepMap], change: &Mapping, rebased: &[Option<StepMap>]) -> Mapping {
	let mut mapping = Mapping::new();
	for map in originals.iter().rev() {
		mapping.push(map.invert());
	}
	mapping.append(change);
	for (i, map) in rebased.iter().enumerate() {
		if let Some(map) = map {
			mapping.push(*map);
			mapping.set_mirror(originals.len() - 1 - i, mapping.len() - 1);
		}
	}
	mapping
}
