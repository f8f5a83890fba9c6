#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Minimal host editor: state, plugins, views and undo history.
//!
//! # Main Types
//!
//! - [`EditorState`] - The current document plus its plugins and history
//! - [`Plugin`] - Filter/accept/apply hooks run for every transaction
//! - [`EditorView`] - A mounted state with a process-unique [`ViewId`]
//! - [`History`] - Undo/redo stacks with a record predicate

/// Undo/redo history.
pub mod history;
/// Plugin extension point.
pub mod plugin;
/// Editor state and the transaction pipeline.
pub mod state;
/// Mounted editor views.
pub mod view;

pub use history::{ADD_TO_HISTORY, HISTORY_META, History, HistoryConfig, RecordFilter};
pub use plugin::{Plugin, PluginKey};
pub use state::{ApplyOutcome, DuplicatePlugin, EditorState};
pub use view::{EditorView, ViewId};
