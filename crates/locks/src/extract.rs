//! Lock attribute extraction.
//!
//! A node can be locked three ways, checked in this order:
//!
//! 1. a `lock_id` attribute on the node itself (blocks),
//! 2. a mark carrying a `lock_id` attribute (text),
//! 3. a persisted comment token inside the text, `<!-- lock:<ID> source:<SRC> -->`.
//!
//! Extraction never fails loudly: anything malformed is simply "no lock".

use std::sync::LazyLock;

use impetus_primitives::{Attrs, Len, NodeRef, Span};
use regex::Regex;
use smallvec::{SmallVec, smallvec};

use crate::lock::{LOCK_ID_ATTR, LOCK_SHAPE_ATTR, LOCK_SOURCE_ATTR, LockId, LockShape, LockSource};

/// Matches a persisted lock comment; group 1 is the id, group 2 the optional source.
pub static LOCK_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"<!--\s*lock:([^\s>]+)(?:\s+source:([^\s>]+))?\s*-->")
		.expect("lock comment pattern is valid")
});

/// A lock comment found in plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockComment {
	pub id: LockId,
	/// Source named by the token, if it had one.
	pub source: Option<LockSource>,
	/// Char offsets of the whole token within the scanned text.
	pub range: Span,
}

/// Iterates the lock comments in `text`, with char (not byte) offsets.
pub fn lock_comments(text: &str) -> impl Iterator<Item = LockComment> + '_ {
	let mut cursor = (0usize, 0usize);
	LOCK_COMMENT_RE.captures_iter(text).filter_map(move |caps| {
		let whole = caps.get(0)?;
		let (byte, chars) = cursor;
		let start = chars + text[byte..whole.start()].chars().count();
		let end = start + whole.as_str().chars().count();
		cursor = (whole.end(), end);
		Some(LockComment {
			id: LockId::parse(caps.get(1)?.as_str())?,
			source: caps.get(2).map(|m| LockSource::parse(m.as_str())),
			range: Span::new(start, end),
		})
	})
}

/// Lock information read from one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockExtraction {
	pub lock_id: LockId,
	pub source: Option<LockSource>,
	pub shape: Option<LockShape>,
	/// For comment locks, the length of the protected text right before the token.
	pub content_length: Option<Len>,
	/// For comment locks, the token's char offsets inside the node.
	pub comment_range: Option<Span>,
}

impl LockExtraction {
	fn from_attrs(attrs: &Attrs) -> Option<Self> {
		Some(Self {
			lock_id: LockId::parse(attrs.get(LOCK_ID_ATTR)?)?,
			source: attrs.get(LOCK_SOURCE_ATTR).map(LockSource::parse),
			shape: attrs.get(LOCK_SHAPE_ATTR).and_then(LockShape::parse),
			content_length: None,
			comment_range: None,
		})
	}

	/// Offsets of the protected text inside the node, for comment locks.
	pub fn content_range(&self) -> Option<Span> {
		let comment = self.comment_range?;
		let length = self.content_length.unwrap_or(0);
		Some(Span::new(comment.from.saturating_sub(length), comment.from))
	}
}

/// Reads the lock carried by `node`, if any.
pub fn extract_lock(node: NodeRef<'_>) -> Option<LockExtraction> {
	extract_locks(node).into_iter().next()
}

/// Reads every lock carried by `node`.
///
/// Attribute and mark locks cover the whole node and win over comments. A text
/// node without one may hold several comment tokens; each protects the text
/// between the previous token (or the node start) and itself.
pub fn extract_locks(node: NodeRef<'_>) -> SmallVec<[LockExtraction; 1]> {
	let structural = node.attrs().and_then(LockExtraction::from_attrs).or_else(|| {
		node.marks()
			.iter()
			.find_map(|mark| LockExtraction::from_attrs(mark.attrs()))
	});
	if let Some(found) = structural {
		return smallvec![found];
	}
	let Some(text) = node.text() else {
		return SmallVec::new();
	};
	let mut previous_end = 0;
	lock_comments(text)
		.map(|comment| {
			let found = LockExtraction {
				lock_id: comment.id,
				source: comment.source,
				shape: None,
				content_length: Some(comment.range.from - previous_end),
				comment_range: Some(comment.range),
			};
			previous_end = comment.range.to;
			found
		})
		.collect()
}
