//! Plain-text persistence of inline locks.
//!
//! Locked text is stored followed by a comment token:
//!
//! ```text
//! The door stays shut. <!-- lock:lock_1f0c source:muse -->
//! ```
//!
//! Only mark locks are written out; block locks live in node attributes and
//! are not persisted. Loading goes the other way: tokens are read back into
//! the registry before the document is rendered, and the tokens themselves
//! stay in the text where extraction finds them.

use impetus_primitives::{Block, Document, TextNode};
use tracing::debug;

pub use crate::extract::{LockComment, lock_comments};
use crate::lock::{LOCK_ID_ATTR, LOCK_MARK, LOCK_SOURCE_ATTR, LockId, LockMetadata, LockShape, LockSource};
use crate::registry::LockRegistry;

/// `<!-- lock:<ID> source:<SRC> -->`; the source is left out when unspecified.
pub fn encode_lock_comment(id: &LockId, source: LockSource) -> String {
	match source {
		LockSource::Unspecified => format!("<!-- lock:{id} -->"),
		source => format!("<!-- lock:{id} source:{source} -->"),
	}
}

/// `text` followed by its lock token.
pub fn serialize_locked_text(text: &str, id: &LockId, source: LockSource) -> String {
	format!("{text} {}", encode_lock_comment(id, source))
}

/// Serializes one text node, appending a token if it carries a lock mark.
pub fn serialize_text_node(node: &TextNode) -> String {
	let lock = node.marks().iter().find(|mark| mark.name() == LOCK_MARK).and_then(|mark| {
		let id = LockId::parse(mark.attrs().get(LOCK_ID_ATTR)?)?;
		let source = mark.attrs().get(LOCK_SOURCE_ATTR).map(LockSource::parse).unwrap_or_default();
		Some((id, source))
	});
	match lock {
		Some((id, source)) => serialize_locked_text(node.text(), &id, source),
		None => node.text().to_string(),
	}
}

pub fn serialize_block(block: &Block) -> String {
	block.content().iter().map(serialize_text_node).collect()
}

/// Serializes `doc` one block per line.
pub fn serialize_document(doc: &Document) -> String {
	doc.blocks().iter().map(serialize_block).collect::<Vec<_>>().join("\n")
}

/// Builds a document from persisted text, one paragraph per line.
///
/// Tokens are kept verbatim; pair with [`import_lock_comments`] to make them enforceable.
pub fn parse_document(raw: &str) -> Document {
	Document::new(raw.lines().map(Block::paragraph).collect())
}

/// Registers every lock token in `raw`. Returns the number of new ids.
pub fn import_lock_comments(raw: &str, registry: &mut LockRegistry) -> usize {
	let mut added = 0;
	for comment in lock_comments(raw) {
		let metadata = LockMetadata::new(comment.source.unwrap_or_default(), LockShape::Inline);
		if registry.apply_lock(comment.id, metadata) {
			added += 1;
		}
	}
	debug!(added, total = registry.lock_count(), "lock comments imported");
	added
}
