//! Engine facade: one registry, installed into any number of views.
//!
//! [`LockEngine::install`] adds three plugins to a view, in pipeline order:
//!
//! | Plugin                | Hook                 | Role                              |
//! |-----------------------|----------------------|-----------------------------------|
//! | [`TransactionGuard`]  | `filter_transaction` | reject edits touching locks       |
//! | [`LockScanner`]       | `on_accept`          | register locks the edit inserted  |
//! | [`LockDecorations`]   | `init` / `apply`     | derive the presentation overlay   |
//!
//! All three share the engine's [`SharedLockRegistry`]. Installation is
//! idempotent per [`ViewId`].

use std::sync::Arc;
use std::time::Instant;

use impetus_editor::{ADD_TO_HISTORY, EditorState, EditorView, HistoryConfig, Plugin, ViewId};
use impetus_primitives::{Document, Span};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::config::LockEngineConfig;
use crate::decoration::{DECORATIONS_KEY, DecorationEngine, DecorationSet, LockDecorations, REFRESH_DECORATIONS};
use crate::gate::ActionGate;
use crate::guard::{GUARD_KEY, RejectCallback, Rejection, TransactionGuard};
use crate::history_bypass::configure_history_bypass;
use crate::inject::{delete_range, insert_locked_block, insert_locked_inline, last_sentence_range, resolve_anchor};
use crate::intervention::{InterventionAction, InterventionOutcome, InterventionResponse};
use crate::lock::{LockId, LockMetadata, LockShape};
use crate::persist::{import_lock_comments, parse_document};
use crate::registry::{LockRegistry, SharedLockRegistry};
use crate::scanner::{LockScanner, SCANNER_KEY};

/// Lock enforcement for a writing session.
pub struct LockEngine {
	registry: SharedLockRegistry,
	config: LockEngineConfig,
	installed: Mutex<FxHashSet<ViewId>>,
	gate: ActionGate,
	on_reject: Option<RejectCallback>,
}

impl std::fmt::Debug for LockEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LockEngine")
			.field("locks", &self.registry.read().lock_count())
			.field("installed", &self.installed.lock().len())
			.field("gate", &self.gate)
			.finish_non_exhaustive()
	}
}

impl Default for LockEngine {
	fn default() -> Self {
		Self::new(LockEngineConfig::default())
	}
}

impl LockEngine {
	pub fn new(config: LockEngineConfig) -> Self {
		Self {
			registry: LockRegistry::new().shared(),
			gate: ActionGate::new(config.gate.settle_delay()),
			config,
			installed: Mutex::new(FxHashSet::default()),
			on_reject: None,
		}
	}

	/// Sets the callback run once per rejected transaction, for views installed afterwards.
	pub fn with_on_reject<F>(mut self, on_reject: F) -> Self
	where
		F: Fn(&Rejection) + Send + Sync + 'static,
	{
		self.on_reject = Some(Arc::new(on_reject));
		self
	}

	pub fn registry(&self) -> &SharedLockRegistry {
		&self.registry
	}

	pub fn config(&self) -> &LockEngineConfig {
		&self.config
	}

	pub fn gate(&self) -> &ActionGate {
		&self.gate
	}

	/// History settings for views mounted by this engine.
	pub fn history_config(&self) -> HistoryConfig {
		let config = HistoryConfig::default().with_depth(self.config.history.depth);
		if self.config.history.exclude_ai_actions {
			configure_history_bypass(config)
		} else {
			config
		}
	}

	/// Creates a view over `doc` with engine history and installs the engine.
	pub fn mount(&self, doc: Document) -> EditorView {
		let mut view = EditorView::new(EditorState::with_history(doc, self.history_config()));
		self.install(&mut view);
		view
	}

	/// Imports the lock tokens of persisted `raw` text, then mounts it.
	pub fn open(&self, raw: &str) -> EditorView {
		self.load_content(raw);
		self.mount(parse_document(raw))
	}

	/// Adds the guard, scanner and decoration plugins to `view`.
	///
	/// Returns false, changing nothing, if the view already has them.
	pub fn install(&self, view: &mut EditorView) -> bool {
		let id = view.id();
		if view.state().has_plugin(GUARD_KEY) || !self.installed.lock().insert(id) {
			trace!(view = id.0, "lock engine already installed");
			return false;
		}
		let guard = TransactionGuard::new(self.registry.clone()).with_on_reject(self.on_reject.clone());
		let scanner = LockScanner::new(self.registry.clone());
		let decorations = LockDecorations::new(
			DecorationEngine::new(self.config.decorations.clone()),
			self.registry.clone(),
		);
		let state = view.state_mut();
		for plugin in [
			Box::new(guard) as Box<dyn Plugin>,
			Box::new(scanner),
			Box::new(decorations),
		] {
			if let Err(duplicate) = state.add_plugin(plugin) {
				trace!(view = id.0, plugin = duplicate.0, "plugin already present");
			}
		}
		debug!(view = id.0, locks = self.registry.read().lock_count(), "lock engine installed");
		true
	}

	pub fn is_installed(&self, view: ViewId) -> bool {
		self.installed.lock().contains(&view)
	}

	/// Removes the engine plugins from `view`. Returns false if it was not installed.
	pub fn uninstall(&self, view: &mut EditorView) -> bool {
		if !self.installed.lock().remove(&view.id()) {
			return false;
		}
		let state = view.state_mut();
		for key in [GUARD_KEY, SCANNER_KEY, DECORATIONS_KEY] {
			state.remove_plugin(key);
		}
		debug!(view = view.id().0, "lock engine uninstalled");
		true
	}

	/// Forgets every lock and installation, e.g. when the session document is replaced.
	pub fn teardown(&self) {
		self.registry.write().clear();
		self.installed.lock().clear();
		debug!("lock engine torn down");
	}

	/// Registers the lock tokens found in persisted text. Returns the number of new ids.
	pub fn load_content(&self, raw: &str) -> usize {
		import_lock_comments(raw, &mut self.registry.write())
	}

	/// Registers `id` and refreshes the view's decorations. Returns true if it was new.
	pub fn register_lock(&self, view: &mut EditorView, id: LockId, metadata: LockMetadata) -> bool {
		let added = self.registry.write().apply_lock(id, metadata);
		self.refresh(view);
		added
	}

	/// Removes `id` and refreshes the view's decorations. Returns true if it was registered.
	pub fn unlock(&self, view: &mut EditorView, id: &str) -> bool {
		let removed = self.registry.write().remove_lock(id);
		self.refresh(view);
		removed
	}

	/// Recomputes decorations after a registry change, without touching the document.
	pub fn refresh(&self, view: &mut EditorView) {
		let mut tx = view.transaction();
		tx.set_meta(REFRESH_DECORATIONS, true).set_meta(ADD_TO_HISTORY, false);
		view.dispatch(tx);
	}

	pub fn decorations<'a>(&self, view: &'a EditorView) -> Option<&'a DecorationSet> {
		view.state()
			.plugin::<LockDecorations>()
			.map(LockDecorations::decorations)
	}

	/// Applies an agent action to `view` under the action gate.
	///
	/// The anchor is resolved against the current document. Provoke and
	/// rewrite register their lock once the edit landed.
	pub fn apply_intervention(
		&self,
		view: &mut EditorView,
		response: &InterventionResponse,
	) -> InterventionOutcome {
		let Some(permit) = self.gate.try_begin() else {
			debug!(action_id = %response.action_id, "intervention dropped, gate busy");
			return InterventionOutcome::Busy;
		};
		let started = Instant::now();
		let outcome = self.apply_unguarded(view, response);
		permit.finish();
		debug!(
			action_id = %response.action_id,
			action = %response.action,
			?outcome,
			elapsed = ?started.elapsed(),
			"intervention handled"
		);
		outcome
	}

	fn apply_unguarded(&self, view: &mut EditorView, response: &InterventionResponse) -> InterventionOutcome {
		let Some(span) = resolve_anchor(view.doc(), &response.anchor) else {
			return InterventionOutcome::Unresolved;
		};
		let source = response.agent_source();
		let content = response.content.as_deref().unwrap_or_default();
		let (applied, lock) = match response.action {
			InterventionAction::Delete => (delete_range(view, span), None),
			InterventionAction::Provoke => {
				let id = response.lock_id.clone().unwrap_or_else(LockId::generate);
				let applied = insert_locked_block(view, span.from, content, &id, source);
				(applied, Some((id, LockShape::Block)))
			}
			InterventionAction::Rewrite => {
				let id = response.lock_id.clone().unwrap_or_else(LockId::generate);
				let applied = insert_locked_inline(view, span, content, &id, source);
				(applied, Some((id, LockShape::Inline)))
			}
		};
		if !applied {
			return InterventionOutcome::Rejected;
		}
		let lock_id = lock.map(|(id, shape)| {
			self.register_lock(view, id.clone(), LockMetadata::new(source, shape));
			id
		});
		InterventionOutcome::Applied { lock_id }
	}

	/// Deletes `range` without an undo entry, under the action gate.
	pub fn delete_guarded(&self, view: &mut EditorView, range: Span) -> InterventionOutcome {
		let Some(permit) = self.gate.try_begin() else {
			return InterventionOutcome::Busy;
		};
		let outcome = if delete_range(view, range) {
			InterventionOutcome::Applied { lock_id: None }
		} else {
			InterventionOutcome::Rejected
		};
		permit.finish();
		outcome
	}

	/// Deletes the last sentence of the document, under the action gate.
	pub fn delete_last_sentence(&self, view: &mut EditorView) -> InterventionOutcome {
		match last_sentence_range(view.doc()) {
			Some(range) => self.delete_guarded(view, range),
			None => InterventionOutcome::Unresolved,
		}
	}
}

#[cfg(test)]
mod tests;
