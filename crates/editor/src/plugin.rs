//! Plugin extension point.
//!
//! Plugins observe and veto transactions on an [`EditorState`]. For every
//! dispatched transaction the state runs, in order:
//!
//! ```text
//! filter_transaction (all plugins, first `false` rejects)
//!        │
//!        ▼
//! on_accept          (all plugins, old document still installed)
//!        │
//!        ▼
//! history record → document swap
//!        │
//!        ▼
//! apply              (all plugins, old and new document)
//! ```

use std::any::Any;

use impetus_primitives::{Document, Transaction};

use crate::state::EditorState;

/// Unique name of a plugin within one [`EditorState`].
pub type PluginKey = &'static str;

/// A participant in transaction handling.
///
/// All hooks have no-op defaults; a plugin overrides the ones it needs.
pub trait Plugin: Any + Send + Sync {
	/// Unique key; a state holds at most one plugin per key.
	fn key(&self) -> PluginKey;

	/// Called once when the plugin is added, with the current document.
	fn init(&mut self, _doc: &Document) {}

	/// Returns false to reject `tx`. `state` still holds the pre-edit document.
	fn filter_transaction(&self, _tx: &Transaction, _state: &EditorState) -> bool {
		true
	}

	/// Called after every filter accepted `tx` and before the new document is installed.
	fn on_accept(&mut self, _tx: &Transaction) {}

	/// Called after the new document is installed.
	fn apply(&mut self, _tx: &Transaction, _old: &Document, _new: &Document) {}
}
