//! Edits that stay out of the undo history.
//!
//! AI-originated changes are dispatched with `addToHistory = false` and an
//! [`AI_ACTION`] tag naming the kind of action. They still go through the
//! normal pipeline, so registered locks keep rejecting them.

use std::fmt;

use impetus_editor::{ADD_TO_HISTORY, EditorView, HistoryConfig};
use impetus_primitives::{Block, Pos, Slice, TextNode, Transaction};
use tracing::debug;

/// Transaction meta tagging an AI action; the value is an [`AiActionKind`] name.
pub const AI_ACTION: &str = "aiAction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiActionKind {
	Insert,
	Delete,
	Rewrite,
	Provoke,
}

impl AiActionKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Insert => "insert",
			Self::Delete => "delete",
			Self::Rewrite => "rewrite",
			Self::Provoke => "provoke",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"insert" => Some(Self::Insert),
			"delete" => Some(Self::Delete),
			"rewrite" => Some(Self::Rewrite),
			"provoke" => Some(Self::Provoke),
			_ => None,
		}
	}
}

impl fmt::Display for AiActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Content accepted by [`insert_without_undo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertContent {
	/// Plain text at an inline position.
	Text(String),
	/// Text nodes at an inline position.
	Inline(Vec<TextNode>),
	/// Blocks at a block boundary.
	Blocks(Vec<Block>),
}

impl InsertContent {
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Text(text) => text.is_empty(),
			Self::Inline(nodes) => nodes.iter().all(TextNode::is_empty),
			Self::Blocks(blocks) => blocks.is_empty(),
		}
	}

	fn into_slice(self) -> Slice {
		match self {
			Self::Text(text) => Slice::Inline(vec![TextNode::new(text)]),
			Self::Inline(nodes) => Slice::Inline(nodes),
			Self::Blocks(blocks) => Slice::Blocks(blocks),
		}
	}
}

impl From<&str> for InsertContent {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for InsertContent {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<Vec<TextNode>> for InsertContent {
	fn from(value: Vec<TextNode>) -> Self {
		Self::Inline(value)
	}
}

impl From<Vec<Block>> for InsertContent {
	fn from(value: Vec<Block>) -> Self {
		Self::Blocks(value)
	}
}

/// Marks `tx` as an AI action of `kind` and keeps it out of history.
pub fn tag_ai_action(tx: &mut Transaction, kind: AiActionKind) -> &mut Transaction {
	tx.set_meta(ADD_TO_HISTORY, false).set_meta(AI_ACTION, kind.as_str())
}

pub fn is_ai_action(tx: &Transaction) -> bool {
	tx.meta(AI_ACTION).is_some()
}

pub fn ai_action_kind(tx: &Transaction) -> Option<AiActionKind> {
	tx.meta_str(AI_ACTION).and_then(AiActionKind::parse)
}

/// Tags `tx` as `kind` and dispatches it. Returns true if it was applied.
pub fn dispatch_without_undo(view: &mut EditorView, mut tx: Transaction, kind: AiActionKind) -> bool {
	tag_ai_action(&mut tx, kind);
	let outcome = view.dispatch(tx);
	if !outcome.is_applied() {
		debug!(view = view.id().0, kind = kind.as_str(), ?outcome, "ai action not applied");
	}
	outcome.is_applied()
}

/// Deletes `from..to` without an undo entry.
///
/// Returns false, leaving the document untouched, for an empty or reversed
/// range, a range past the end, or one that does not form a valid step.
pub fn delete_without_undo(view: &mut EditorView, from: Pos, to: Pos) -> bool {
	if from >= to || to > view.doc().content_size() {
		return false;
	}
	let mut tx = view.transaction();
	if let Err(err) = tx.delete(from, to) {
		debug!(from, to, error = %err, "delete without undo refused");
		return false;
	}
	dispatch_without_undo(view, tx, AiActionKind::Delete)
}

/// Inserts `content` at `pos` without an undo entry.
///
/// Returns false for empty content, a position past the end, or content that
/// does not fit at `pos`.
pub fn insert_without_undo(view: &mut EditorView, pos: Pos, content: impl Into<InsertContent>) -> bool {
	let content = content.into();
	if content.is_empty() || pos > view.doc().content_size() {
		return false;
	}
	let mut tx = view.transaction();
	if let Err(err) = tx.replace(pos, pos, content.into_slice()) {
		debug!(pos, error = %err, "insert without undo refused");
		return false;
	}
	dispatch_without_undo(view, tx, AiActionKind::Insert)
}

/// Wraps the record filter of `config` so AI actions are never recorded.
///
/// AI actions short-circuit before any existing filter runs.
pub fn configure_history_bypass(mut config: HistoryConfig) -> HistoryConfig {
	let prior = config.record_filter.take();
	config.with_record_filter(move |tx| {
		!is_ai_action(tx) && prior.as_ref().is_none_or(|filter| filter(tx))
	})
}

/// Returns true if `view` has an undo history; says nothing about its depth.
pub fn can_undo(view: &EditorView) -> bool {
	view.state().history().is_some()
}

/// Returns true if `view` has an undo history; says nothing about its depth.
pub fn can_redo(view: &EditorView) -> bool {
	view.state().history().is_some()
}
