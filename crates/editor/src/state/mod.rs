//! Editor state: the current document, its plugins and its history.

use std::any::Any;
use std::mem;

use impetus_primitives::{Document, Transaction};
use tracing::{debug, trace};

use crate::history::{History, HistoryConfig};
use crate::plugin::{Plugin, PluginKey};

/// Result of [`EditorState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
	/// The transaction was accepted and its document installed.
	Applied,
	/// A plugin filter rejected the transaction.
	Rejected { by: PluginKey },
	/// The transaction was built against a document that is no longer current.
	Stale,
}

impl ApplyOutcome {
	pub fn is_applied(self) -> bool {
		matches!(self, Self::Applied)
	}
}

/// Returned by [`EditorState::add_plugin`] when the key is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicatePlugin(pub PluginKey);

/// The document plus everything that reacts to its transactions.
pub struct EditorState {
	doc: Document,
	plugins: Vec<Box<dyn Plugin>>,
	history: Option<History>,
}

impl std::fmt::Debug for EditorState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EditorState")
			.field("doc", &self.doc)
			.field("plugins", &self.plugin_keys().collect::<Vec<_>>())
			.field("history", &self.history)
			.finish()
	}
}

impl EditorState {
	/// Creates a state with no plugins and no history.
	pub fn new(doc: Document) -> Self {
		Self {
			doc,
			plugins: Vec::new(),
			history: None,
		}
	}

	/// Creates a state that records undo history.
	pub fn with_history(doc: Document, config: HistoryConfig) -> Self {
		Self {
			history: Some(History::new(config)),
			..Self::new(doc)
		}
	}

	pub fn doc(&self) -> &Document {
		&self.doc
	}

	pub fn history(&self) -> Option<&History> {
		self.history.as_ref()
	}

	pub fn history_mut(&mut self) -> Option<&mut History> {
		self.history.as_mut()
	}

	/// Installs `history`, replacing any previous one.
	pub fn set_history(&mut self, history: History) {
		self.history = Some(history);
	}

	/// Starts a transaction against the current document.
	pub fn transaction(&self) -> Transaction {
		Transaction::new(&self.doc)
	}

	/// Adds a plugin and runs its `init` hook.
	///
	/// Fails without touching the state if a plugin with the same key exists.
	pub fn add_plugin(&mut self, mut plugin: Box<dyn Plugin>) -> Result<(), DuplicatePlugin> {
		let key = plugin.key();
		if self.has_plugin(key) {
			return Err(DuplicatePlugin(key));
		}
		plugin.init(&self.doc);
		trace!(plugin = key, total = self.plugins.len() + 1, "plugin added");
		self.plugins.push(plugin);
		Ok(())
	}

	pub fn has_plugin(&self, key: &str) -> bool {
		self.plugins.iter().any(|p| p.key() == key)
	}

	pub fn plugin_keys(&self) -> impl Iterator<Item = PluginKey> + '_ {
		self.plugins.iter().map(|p| p.key())
	}

	/// Returns the first plugin of concrete type `P`.
	pub fn plugin<P: Plugin>(&self) -> Option<&P> {
		self.plugins.iter().find_map(|p| {
			let any: &dyn Any = &**p;
			any.downcast_ref::<P>()
		})
	}

	pub fn plugin_mut<P: Plugin>(&mut self) -> Option<&mut P> {
		self.plugins.iter_mut().find_map(|p| {
			let any: &mut dyn Any = &mut **p;
			any.downcast_mut::<P>()
		})
	}

	/// Removes and returns the plugin registered under `key`.
	pub fn remove_plugin(&mut self, key: &str) -> Option<Box<dyn Plugin>> {
		let index = self.plugins.iter().position(|p| p.key() == key)?;
		trace!(plugin = key, "plugin removed");
		Some(self.plugins.remove(index))
	}

	/// Runs `tx` through the plugin pipeline and installs its document.
	pub fn apply(&mut self, tx: Transaction) -> ApplyOutcome {
		if tx.before() != &self.doc {
			debug!(steps = tx.steps().len(), "transaction built against a stale document");
			return ApplyOutcome::Stale;
		}

		let state = &*self;
		if let Some(by) = state
			.plugins
			.iter()
			.find(|p| !p.filter_transaction(&tx, state))
			.map(|p| p.key())
		{
			debug!(plugin = by, steps = tx.steps().len(), "transaction rejected");
			return ApplyOutcome::Rejected { by };
		}

		for plugin in &mut self.plugins {
			plugin.on_accept(&tx);
		}

		if let Some(history) = &mut self.history {
			history.record(&tx);
		}

		let old = mem::replace(&mut self.doc, tx.doc().clone());
		for plugin in &mut self.plugins {
			plugin.apply(&tx, &old, &self.doc);
		}

		trace!(
			steps = tx.steps().len(),
			doc_changed = tx.doc_changed(),
			size = self.doc.content_size(),
			"transaction applied"
		);
		ApplyOutcome::Applied
	}
}
