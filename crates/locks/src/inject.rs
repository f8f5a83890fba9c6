//! Content injection: anchor resolution and locked inserts.
//!
//! Anchors are resolved against the document current at apply time and
//! clamped to it. Every edit here goes through the history bypass, so the
//! guard still sees it and the undo stack does not. Nothing in this module
//! touches the registry; callers register the lock once the edit landed.

use impetus_editor::EditorView;
use impetus_primitives::{Block, Document, Pos, ResolvedPos, Slice, Span, TextNode};
use tracing::debug;

use crate::history_bypass::{AiActionKind, delete_without_undo, dispatch_without_undo};
use crate::intervention::Anchor;
use crate::lock::{LockId, LockMetadata, LockShape, LockSource, lock_attrs, lock_mark};
use crate::scan::all_sites;

/// Characters ending a sentence.
pub const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '。', '！', '？'];

/// Resolves `anchor` in `doc`, clamping positions to the document.
///
/// A range that clamps to nothing and a lock id that is no longer present
/// both resolve to `None`.
pub fn resolve_anchor(doc: &Document, anchor: &Anchor) -> Option<Span> {
	let size = doc.content_size();
	match anchor {
		Anchor::Pos { from } => Some(Span::point((*from).min(size))),
		Anchor::Range { from, to } => {
			let span = Span::new((*from).min(size), (*to).min(size));
			(!span.is_empty()).then_some(span)
		}
		Anchor::LockRef { ref_lock_id } => find_lock_span(doc, ref_lock_id.as_str()),
	}
}

/// Enforced span of the first marker carrying `id`.
pub fn find_lock_span(doc: &Document, id: &str) -> Option<Span> {
	all_sites(doc)
		.into_iter()
		.find(|site| site.lock_id.as_str() == id)
		.map(|site| site.enforced())
}

/// Block boundary at or after `pos`: `pos` itself, or the end of its block.
fn boundary_after(doc: &Document, pos: Pos) -> Option<Pos> {
	match doc.resolve(pos.min(doc.content_size())).ok()? {
		ResolvedPos::Boundary { .. } => Some(pos.min(doc.content_size())),
		ResolvedPos::Inline { block, .. } => doc.block_spans().nth(block).map(|(_, span)| span.to),
	}
}

/// Inserts a locked blockquote after the block containing `pos`.
pub fn insert_locked_block(
	view: &mut EditorView,
	pos: Pos,
	content: &str,
	id: &LockId,
	source: LockSource,
) -> bool {
	if content.trim().is_empty() {
		return false;
	}
	let Some(at) = boundary_after(view.doc(), pos) else {
		return false;
	};
	let block = Block::blockquote(content)
		.with_attrs(lock_attrs(id, LockMetadata::new(source, LockShape::Block)));
	let mut tx = view.transaction();
	if let Err(err) = tx.insert_blocks(at, vec![block]) {
		debug!(pos = at, error = %err, "locked block does not fit");
		return false;
	}
	dispatch_without_undo(view, tx, AiActionKind::Provoke)
}

/// Replaces `range` with `content` under a lock mark.
pub fn insert_locked_inline(
	view: &mut EditorView,
	range: Span,
	content: &str,
	id: &LockId,
	source: LockSource,
) -> bool {
	if content.is_empty() || range.to > view.doc().content_size() {
		return false;
	}
	let node = TextNode::new(content).with_mark(lock_mark(id, source));
	let mut tx = view.transaction();
	if let Err(err) = tx.replace(range.from, range.to, Slice::Inline(vec![node])) {
		debug!(from = range.from, to = range.to, error = %err, "locked text does not fit");
		return false;
	}
	dispatch_without_undo(view, tx, AiActionKind::Rewrite)
}

pub fn delete_range(view: &mut EditorView, range: Span) -> bool {
	delete_without_undo(view, range.from, range.to)
}

/// Range of the last sentence in the last non-empty textblock.
///
/// Trailing whitespace is excluded, as is whitespace after the previous terminator.
pub fn last_sentence_range(doc: &Document) -> Option<Span> {
	let (index, span) = doc
		.block_spans()
		.filter(|(index, _)| !doc.blocks()[*index].text().trim().is_empty())
		.last()?;
	let chars: Vec<char> = doc.blocks()[index].text().chars().collect();
	let end = chars.iter().rposition(|c| !c.is_whitespace())? + 1;
	let mut start = chars[..end - 1]
		.iter()
		.rposition(|c| SENTENCE_TERMINATORS.contains(c))
		.map_or(0, |i| i + 1);
	while start < end && chars[start].is_whitespace() {
		start += 1;
	}
	let content_start = span.from + 1;
	Some(Span::new(content_start + start, content_start + end))
}

/// Deletes the last sentence without an undo entry.
pub fn delete_last_sentence(view: &mut EditorView) -> bool {
	match last_sentence_range(view.doc()) {
		Some(range) => delete_range(view, range),
		None => false,
	}
}

#[cfg(test)]
mod tests;
