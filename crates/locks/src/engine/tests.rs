use std::sync::atomic::{AtomicUsize, Ordering};

use impetus_primitives::Block;
use pretty_assertions::assert_eq;

use super::*;
use crate::config::GateConfig;
use crate::decoration::DecorationKind;
use crate::intervention::{AgentSource, Anchor};
use crate::lock::LockSource;

fn doc() -> Document {
	Document::new(vec![Block::paragraph("The door."), Block::paragraph("It opens.")])
}

/// Engine whose gate reopens as soon as an action finishes.
fn engine() -> LockEngine {
	LockEngine::new(LockEngineConfig {
		gate: GateConfig { settle_delay_ms: 0 },
		..LockEngineConfig::default()
	})
}

fn plugin_count(view: &EditorView, key: &str) -> usize {
	view.state().plugin_keys().filter(|k| *k == key).count()
}

#[test]
fn test_install_is_idempotent_per_view() {
	let engine = engine();
	let mut view = engine.mount(doc());
	assert!(engine.is_installed(view.id()));
	assert!(!engine.install(&mut view));
	assert_eq!(plugin_count(&view, DECORATIONS_KEY), 1);
	assert_eq!(plugin_count(&view, GUARD_KEY), 1);

	let mut other = EditorView::with_document(doc());
	assert!(engine.install(&mut other));
	assert!(engine.is_installed(other.id()));
}

#[test]
fn test_uninstall_removes_plugins() {
	let engine = engine();
	let mut view = engine.mount(doc());
	assert!(engine.uninstall(&mut view));
	assert!(!engine.uninstall(&mut view));
	assert_eq!(view.state().plugin_keys().count(), 0);
	assert!(engine.decorations(&view).is_none());
	assert!(engine.install(&mut view));
}

#[test]
fn test_register_and_unlock_refresh_decorations() {
	let engine = engine();
	let mut view = engine.mount(Document::new(vec![Block::paragraph(
		"Hello <!-- lock:L2 source:loki -->world",
	)]));
	assert_eq!(engine.decorations(&view).map(DecorationSet::len), Some(1));

	assert!(engine.register_lock(&mut view, LockId::new("L2"), LockMetadata::default()));
	assert_eq!(engine.decorations(&view).map(DecorationSet::len), Some(2));

	assert!(engine.unlock(&mut view, "L2"));
	assert!(!engine.unlock(&mut view, "L2"));
	assert_eq!(engine.decorations(&view).map(DecorationSet::len), Some(1));
	assert_eq!(view.state().history().map(|h| h.undo_depth()), Some(0));
}

#[test]
fn test_open_registers_persisted_locks() {
	let rejected = Arc::new(AtomicUsize::new(0));
	let counter = rejected.clone();
	let engine = engine().with_on_reject(move |_| {
		counter.fetch_add(1, Ordering::Relaxed);
	});
	let mut view = engine.open("Hello <!-- lock:L2 source:loki -->world\nfree text");
	assert_eq!(
		engine.registry().read().lock_metadata("L2").map(|m| m.source),
		Some(LockSource::Loki)
	);

	let mut tx = view.transaction();
	tx.delete(1, 6).unwrap();
	assert!(!view.dispatch(tx).is_applied());
	assert_eq!(rejected.load(Ordering::Relaxed), 1);

	assert_eq!(engine.delete_last_sentence(&mut view), InterventionOutcome::Applied { lock_id: None });
	assert_eq!(view.doc().text(), "Hello <!-- lock:L2 source:loki -->world\n");
}

#[test]
fn test_provoke_inserts_registered_block() {
	let engine = engine();
	let mut view = engine.mount(doc());
	let response = InterventionResponse::provoke(AgentSource::Muse, "Someone breathes.", Anchor::Pos { from: 3 });
	let id = response.lock_id.clone().unwrap();

	assert_eq!(
		engine.apply_intervention(&mut view, &response),
		InterventionOutcome::Applied { lock_id: Some(id.clone()) }
	);
	assert_eq!(view.doc().text(), "The door.\nSomeone breathes.\nIt opens.");
	assert_eq!(
		engine.registry().read().lock_metadata(id.as_str()),
		Some(LockMetadata::new(LockSource::Muse, LockShape::Block))
	);
	let node = engine
		.decorations(&view)
		.and_then(|set| set.iter().find(|d| d.kind == DecorationKind::Node).cloned())
		.unwrap();
	assert_eq!(node.range, Span::new(11, 30));
	assert_eq!(node.label.as_deref(), Some("Locked content (muse)"));

	assert_eq!(engine.delete_guarded(&mut view, Span::new(12, 20)), InterventionOutcome::Rejected);
	assert!(!view.undo());
}

#[test]
fn test_rewrite_and_delete_interventions() {
	let engine = engine();
	let mut view = engine.mount(doc());
	let rewrite = InterventionResponse::rewrite(AgentSource::Loki, "gate", 5, 9);
	let outcome = engine.apply_intervention(&mut view, &rewrite);
	assert!(outcome.is_applied());
	assert_eq!(view.doc().text(), "The gate.\nIt opens.");

	let over_lock = InterventionResponse::delete(AgentSource::Loki, 4, 8);
	assert_eq!(engine.apply_intervention(&mut view, &over_lock), InterventionOutcome::Rejected);

	let free = InterventionResponse::delete(AgentSource::Loki, 12, 15);
	assert_eq!(
		engine.apply_intervention(&mut view, &free),
		InterventionOutcome::Applied { lock_id: None }
	);
	assert_eq!(view.doc().text(), "The gate.\nopens.");

	let gone = InterventionResponse::provoke(
		AgentSource::Muse,
		"x",
		Anchor::LockRef {
			ref_lock_id: LockId::new("missing"),
		},
	);
	assert_eq!(engine.apply_intervention(&mut view, &gone), InterventionOutcome::Unresolved);
}

#[test]
fn test_intervention_logs_under_debug_subscriber() {
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::DEBUG)
		.with_test_writer()
		.finish();
	tracing::subscriber::with_default(subscriber, || {
		let engine = engine();
		let mut view = engine.mount(doc());
		let delete = InterventionResponse::delete(AgentSource::Loki, 1, 5);
		assert_eq!(
			engine.apply_intervention(&mut view, &delete),
			InterventionOutcome::Applied { lock_id: None }
		);
		assert_eq!(view.doc().text(), "door.\nIt opens.");
	});
}

#[test]
fn test_gate_settles_between_interventions() {
	let engine = LockEngine::new(LockEngineConfig {
		gate: GateConfig { settle_delay_ms: 60_000 },
		..LockEngineConfig::default()
	});
	let mut view = engine.mount(doc());
	let first = InterventionResponse::delete(AgentSource::Loki, 1, 4);
	assert!(engine.apply_intervention(&mut view, &first).is_applied());
	assert!(engine.gate().is_busy());

	let second = InterventionResponse::delete(AgentSource::Loki, 1, 2);
	assert_eq!(engine.apply_intervention(&mut view, &second), InterventionOutcome::Busy);
	assert_eq!(engine.delete_guarded(&mut view, Span::new(1, 2)), InterventionOutcome::Busy);
}

#[test]
fn test_history_config_follows_options() {
	let engine = engine();
	let config = engine.history_config();
	assert_eq!(config.depth, 100);
	assert!(config.record_filter.is_some());

	let mut options = LockEngineConfig::default();
	options.history.exclude_ai_actions = false;
	options.history.depth = 7;
	let config = LockEngine::new(options).history_config();
	assert_eq!(config.depth, 7);
	assert!(config.record_filter.is_none());
}

#[test]
fn test_teardown_forgets_locks_and_views() {
	let engine = engine();
	let view = engine.open("x <!-- lock:A -->");
	assert_eq!(engine.registry().read().lock_count(), 1);
	engine.teardown();
	assert!(engine.registry().read().is_empty());
	assert!(!engine.is_installed(view.id()));
}
