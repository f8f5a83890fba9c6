//! Runnable proofs for the invariant catalog.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use impetus_primitives::{Block, Document, Mark, Span, Transaction};

use crate::config::{GateConfig, LockEngineConfig};
use crate::engine::LockEngine;
use crate::guard::TransactionGuard;
use crate::history_bypass::insert_without_undo;
use crate::lock::{LockId, LockMetadata, LockShape, LockSource, lock_attrs};

fn locked_doc() -> Document {
	Document::new(vec![
		Block::paragraph("free"),
		Block::blockquote("held").with_attrs(lock_attrs(
			&LockId::new("L1"),
			LockMetadata::new(LockSource::Muse, LockShape::Block),
		)),
		Block::paragraph("Hi <!-- lock:C1 -->there"),
	])
}

fn engine() -> LockEngine {
	LockEngine::new(LockEngineConfig {
		gate: GateConfig { settle_delay_ms: 0 },
		..LockEngineConfig::default()
	})
}

/// Invariant: Unregistered lock markers MUST NOT block edits.
#[cfg_attr(test, test)]
pub(crate) fn test_unregistered_locks_never_block() {
	let engine = engine();
	let mut view = engine.mount(locked_doc());
	let mut tx = view.transaction();
	tx.delete(6, 12).unwrap();
	assert!(view.dispatch(tx).is_applied());
}

/// Invariant: A rejected transaction MUST leave the document untouched and fire one callback.
#[cfg_attr(test, test)]
pub(crate) fn test_rejection_is_atomic_and_reported_once() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let engine = engine().with_on_reject(move |_| {
		counter.fetch_add(1, Ordering::Relaxed);
	});
	engine
		.registry()
		.write()
		.apply_lock(LockId::new("L1"), LockMetadata::default());
	let mut view = engine.mount(locked_doc());
	let before = view.doc().clone();

	let mut tx = view.transaction();
	tx.insert_text(2, "x").unwrap().delete(8, 9).unwrap().delete(9, 10).unwrap();
	assert!(!view.dispatch(tx).is_applied());
	assert_eq!(view.doc(), &before);
	assert_eq!(calls.load(Ordering::Relaxed), 1);
}

/// Invariant: Transactions without steps MUST pass without a document scan.
#[cfg_attr(test, test)]
pub(crate) fn test_unchanged_document_never_scans() {
	let engine = engine();
	engine
		.registry()
		.write()
		.apply_lock(LockId::new("L1"), LockMetadata::default());
	let mut view = engine.mount(locked_doc());
	engine.refresh(&mut view);
	let mut tx = view.transaction();
	tx.set_selection(Span::new(7, 9));
	assert!(view.dispatch(tx).is_applied());
	let scans = view.state().plugin::<TransactionGuard>().map(TransactionGuard::scan_count);
	assert_eq!(scans, Some(0));
}

/// Invariant: Every position the guard refuses MUST carry a visible decoration, and vice versa.
#[cfg_attr(test, test)]
pub(crate) fn test_guard_matches_decorations() {
	let engine = engine();
	engine
		.registry()
		.write()
		.apply_lock(LockId::new("C1"), LockMetadata::default());
	let view = engine.mount(locked_doc());
	let doc = view.doc().clone();
	let set = engine.decorations(&view).unwrap();
	let guard = view.state().plugin::<TransactionGuard>().unwrap();
	for pos in 1..doc.content_size() {
		let mut tx = Transaction::new(&doc);
		if tx.add_mark(pos, pos + 1, Mark::new("em")).is_err() {
			continue;
		}
		assert_eq!(guard.check(&tx, &doc).is_some(), set.covers(pos), "position {pos}");
	}
}

/// Invariant: A lock inserted by one transaction MUST guard the very next one.
#[cfg_attr(test, test)]
pub(crate) fn test_inserted_lock_guards_next_transaction() {
	let engine = engine();
	let mut view = engine.mount(Document::new(vec![Block::paragraph("start")]));
	let block = Block::blockquote("fresh").with_attrs(lock_attrs(
		&LockId::new("N1"),
		LockMetadata::new(LockSource::Loki, LockShape::Block),
	));
	let mut tx = view.transaction();
	tx.insert_blocks(7, vec![block]).unwrap();
	assert!(view.dispatch(tx).is_applied());

	let mut next = view.transaction();
	next.delete(9, 11).unwrap();
	assert!(!view.dispatch(next).is_applied());
}

/// Invariant: Installing twice MUST leave exactly one copy of each plugin.
#[cfg_attr(test, test)]
pub(crate) fn test_single_install_per_view() {
	let engine = engine();
	let mut view = engine.mount(locked_doc());
	assert!(!engine.install(&mut view));
	let keys: Vec<_> = view.state().plugin_keys().collect();
	assert_eq!(keys, vec!["lock-guard", "lock-scanner", "lock-decorations"]);
}

/// Invariant: AI edits MUST NOT be undoable, and MUST NOT hide the writer's own edits from undo.
#[cfg_attr(test, test)]
pub(crate) fn test_ai_actions_bypass_history() {
	let engine = engine();
	let mut view = engine.mount(Document::new(vec![Block::paragraph("ab")]));
	let mut tx = view.transaction();
	tx.insert_text(3, "c").unwrap();
	assert!(view.dispatch(tx).is_applied());
	assert!(insert_without_undo(&mut view, 1, "AI "));
	assert_eq!(view.state().history().map(|h| h.undo_depth()), Some(1));

	assert!(view.undo());
	assert_eq!(view.doc().text(), "AI ab");
	assert!(!view.undo());
}

/// Invariant: Registering an id twice MUST NOT change the lock count.
#[cfg_attr(test, test)]
pub(crate) fn test_apply_lock_is_idempotent() {
	let engine = engine();
	let mut registry = engine.registry().write();
	assert!(registry.apply_lock(LockId::new("A"), LockMetadata::default()));
	assert!(!registry.apply_lock(LockId::new("A"), LockMetadata::new(LockSource::User, LockShape::Block)));
	assert_eq!(registry.lock_count(), 1);
	assert_eq!(registry.lock_metadata("A").map(|m| m.source), Some(LockSource::User));
}
