//! Post-accept scan registering lock markers introduced by an edit.
//!
//! Runs in the plugin `on_accept` hook, after every filter accepted the
//! transaction and before the host installs the new document, so the next
//! transaction is already evaluated against the new locks.

use std::ops::ControlFlow;

use impetus_editor::{Plugin, PluginKey};
use impetus_primitives::{Bias, Document, Span, Transaction};
use tracing::debug;

use crate::lock::{LockId, LockMetadata};
use crate::registry::SharedLockRegistry;
use crate::scan::visit_sites;

/// Plugin key of [`LockScanner`].
pub const SCANNER_KEY: PluginKey = "lock-scanner";

/// Ranges of `tx.doc()` holding content inserted by `tx`.
pub fn inserted_ranges(tx: &Transaction) -> Vec<Span> {
	let maps = tx.mapping().maps();
	maps.iter()
		.enumerate()
		.filter_map(|(index, map)| {
			let range = map.range().filter(|r| r.new_size > 0)?;
			let later = tx.mapping().slice(index + 1, maps.len());
			let from = later.map(range.start, Bias::Right);
			let to = later.map(range.start + range.new_size, Bias::Left);
			(from < to).then(|| Span::new(from, to))
		})
		.collect()
}

/// Lock markers of `doc` lying entirely inside one of `ranges`.
///
/// Block and mark locks need their whole node inside; comment locks need their token inside.
pub fn inserted_locks(doc: &Document, ranges: &[Span]) -> Vec<(LockId, LockMetadata)> {
	let mut found = Vec::new();
	for &range in ranges {
		let _ = visit_sites(doc, range, |site| {
			let marker = site.comment.unwrap_or(site.node);
			if range.contains_span(marker) {
				found.push((site.lock_id.clone(), site.metadata()));
			}
			ControlFlow::Continue(())
		});
	}
	found
}

/// Registers locks carried by freshly inserted content.
#[derive(Debug)]
pub struct LockScanner {
	registry: SharedLockRegistry,
}

impl LockScanner {
	pub fn new(registry: SharedLockRegistry) -> Self {
		Self { registry }
	}

	/// Registers new markers inserted by `tx`; existing entries are kept as they are.
	///
	/// Returns the number of locks registered.
	pub fn register_inserted_locks(&self, tx: &Transaction) -> usize {
		if !tx.doc_changed() {
			return 0;
		}
		let ranges = inserted_ranges(tx);
		if ranges.is_empty() {
			return 0;
		}
		let found = inserted_locks(tx.doc(), &ranges);
		if found.is_empty() {
			return 0;
		}

		let mut registry = self.registry.write();
		let mut added = 0;
		for (id, metadata) in found {
			if registry.has_lock(id.as_str()) {
				continue;
			}
			debug!(lock_id = %id, source = %metadata.source, "registered inserted lock");
			registry.apply_lock(id, metadata);
			added += 1;
		}
		added
	}
}

impl Plugin for LockScanner {
	fn key(&self) -> PluginKey {
		SCANNER_KEY
	}

	fn on_accept(&mut self, tx: &Transaction) {
		self.register_inserted_locks(tx);
	}
}

#[cfg(test)]
mod tests {
	use impetus_primitives::{Block, TextNode};
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::lock::{LockShape, LockSource, lock_attrs, lock_mark};
	use crate::registry::LockRegistry;

	fn doc() -> Document {
		Document::new(vec![Block::paragraph("one"), Block::paragraph("two")])
	}

	#[test]
	fn test_inserted_ranges_follow_later_steps() {
		let mut tx = Transaction::new(&doc());
		tx.insert_text(4, "abc").unwrap().insert_text(1, "Z").unwrap();
		assert_eq!(inserted_ranges(&tx), vec![Span::new(5, 8), Span::new(1, 2)]);

		let mut tx = Transaction::new(&doc());
		tx.insert_text(2, "abc").unwrap().delete(1, 7).unwrap();
		assert!(inserted_ranges(&tx).is_empty());
	}

	#[test]
	fn test_registers_inserted_block_and_mark_locks() {
		let scanner = LockScanner::new(LockRegistry::new().shared());
		let block = Block::blockquote("provoked").with_attrs(lock_attrs(
			&LockId::new("B1"),
			LockMetadata::new(LockSource::Muse, LockShape::Block),
		));
		let mut tx = Transaction::new(&doc());
		tx.insert_blocks(5, vec![block])
			.unwrap()
			.insert_inline(
				2,
				vec![TextNode::new("re").with_mark(lock_mark(&LockId::new("M1"), LockSource::Loki))],
			)
			.unwrap();
		assert_eq!(scanner.register_inserted_locks(&tx), 2);

		let registry = scanner.registry.read();
		assert_eq!(
			registry.lock_metadata("B1"),
			Some(LockMetadata::new(LockSource::Muse, LockShape::Block))
		);
		assert_eq!(
			registry.lock_metadata("M1"),
			Some(LockMetadata::new(LockSource::Loki, LockShape::Inline))
		);
	}

	#[test]
	fn test_registers_comment_tokens_typed_into_text() {
		let scanner = LockScanner::new(LockRegistry::new().shared());
		let mut tx = Transaction::new(&doc());
		tx.insert_text(4, " <!-- lock:C9 source:loki -->").unwrap();
		assert_eq!(scanner.register_inserted_locks(&tx), 1);
		assert_eq!(
			scanner.registry.read().lock_metadata("C9").map(|m| m.source),
			Some(LockSource::Loki)
		);
	}

	#[test]
	fn test_existing_markers_and_entries_are_left_alone() {
		let registry = LockRegistry::new().shared();
		registry
			.write()
			.apply_lock(LockId::new("B1"), LockMetadata::new(LockSource::User, LockShape::Block));
		let scanner = LockScanner::new(registry.clone());

		let start = Document::new(vec![Block::paragraph("x <!-- lock:OLD -->")]);
		let mut tx = Transaction::new(&start);
		tx.insert_text(2, "more").unwrap();
		assert_eq!(scanner.register_inserted_locks(&tx), 0);

		let block =
			Block::blockquote("again").with_attrs(lock_attrs(&LockId::new("B1"), LockMetadata::default()));
		let mut tx = Transaction::new(&start);
		tx.insert_blocks(0, vec![block]).unwrap();
		assert_eq!(scanner.register_inserted_locks(&tx), 0);
		assert_eq!(
			registry.read().lock_metadata("B1").map(|m| m.source),
			Some(LockSource::User)
		);
		assert!(!registry.read().has_lock("OLD"));
	}
}
