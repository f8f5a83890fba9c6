use std::sync::atomic::{AtomicU64, Ordering};

use impetus_primitives::{Document, Transaction};

use crate::history::HistoryConfig;
use crate::state::{ApplyOutcome, EditorState};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an [`EditorView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl ViewId {
	fn next() -> Self {
		Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
	}
}

/// A mounted editor: an id plus the state it dispatches into.
#[derive(Debug)]
pub struct EditorView {
	id: ViewId,
	state: EditorState,
}

impl EditorView {
	pub fn new(state: EditorState) -> Self {
		Self {
			id: ViewId::next(),
			state,
		}
	}

	/// Mounts `doc` with default history.
	pub fn with_document(doc: Document) -> Self {
		Self::new(EditorState::with_history(doc, HistoryConfig::default()))
	}

	pub fn id(&self) -> ViewId {
		self.id
	}

	pub fn state(&self) -> &EditorState {
		&self.state
	}

	pub fn state_mut(&mut self) -> &mut EditorState {
		&mut self.state
	}

	pub fn doc(&self) -> &Document {
		self.state.doc()
	}

	/// Starts a transaction against the current document.
	pub fn transaction(&self) -> Transaction {
		self.state.transaction()
	}

	pub fn dispatch(&mut self, tx: Transaction) -> ApplyOutcome {
		self.state.apply(tx)
	}

	/// Dispatches the undo of the latest history entry. Returns true if applied.
	pub fn undo(&mut self) -> bool {
		let doc = self.state.doc().clone();
		match self.state.history_mut().and_then(|h| h.undo_transaction(&doc)) {
			Some(tx) => self.dispatch(tx).is_applied(),
			None => false,
		}
	}

	/// Dispatches the redo of the latest undone entry. Returns true if applied.
	pub fn redo(&mut self) -> bool {
		let doc = self.state.doc().clone();
		match self.state.history_mut().and_then(|h| h.redo_transaction(&doc)) {
			Some(tx) => self.dispatch(tx).is_applied(),
			None => false,
		}
	}
}
