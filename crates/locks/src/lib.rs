#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Lock enforcement and decoration engine.
//!
//! Locked regions of a document cannot be edited. A region is locked when it
//! carries a lock marker (a block attribute, an inline mark, or a persisted
//! `<!-- lock:ID -->` comment) **and** its id is present in the
//! [`LockRegistry`]. Markers alone are inert.
//!
//! # Main Types
//!
//! - [`LockEngine`] - Installs enforcement into views and applies interventions
//! - [`LockRegistry`] - The authoritative set of active locks
//! - [`TransactionGuard`] - Rejects transactions touching registered locks
//! - [`LockScanner`] - Registers locks carried by inserted content
//! - [`LockDecorations`] - Presentation overlay derived from the same scan as the guard
//!
//! # Edit flow
//!
//! ```text
//! dispatch(tx)
//!   ├─ TransactionGuard::filter_transaction ── reject ──► on_reject(Rejection)
//!   ├─ LockScanner::on_accept                 (registers inserted markers)
//!   ├─ history record                         (AI actions skipped)
//!   └─ LockDecorations::apply                 (recompute or map)
//! ```

/// Engine configuration.
pub mod config;
/// Decoration overlay.
pub mod decoration;
/// Engine facade.
pub mod engine;
/// Error types.
pub mod error;
/// Lock marker extraction.
pub mod extract;
/// Re-entrancy gate for AI actions.
pub mod gate;
/// Transaction guard.
pub mod guard;
/// Edits kept out of undo history.
pub mod history_bypass;
/// Anchor resolution and locked inserts.
pub mod inject;
/// Agent intervention payloads.
pub mod intervention;
mod invariants;
/// Lock identity and metadata.
pub mod lock;
/// Plain-text persistence of inline locks.
pub mod persist;
/// Lock registry.
pub mod registry;
/// Shared lock scan.
pub mod scan;
/// Post-accept registration of inserted locks.
pub mod scanner;

pub use config::{DecorationStyle, GateConfig, HistoryOptions, LockEngineConfig};
pub use decoration::{Decoration, DecorationEngine, DecorationKind, DecorationSet, LockDecorations};
pub use engine::LockEngine;
pub use error::{ConfigError, InterventionError};
pub use gate::{ActionGate, GatePermit, GateState};
pub use guard::{RejectCallback, Rejection, TransactionGuard};
pub use history_bypass::{
	AI_ACTION, AiActionKind, InsertContent, ai_action_kind, can_redo, can_undo, configure_history_bypass,
	delete_without_undo, insert_without_undo, is_ai_action,
};
pub use intervention::{AgentSource, Anchor, InterventionAction, InterventionOutcome, InterventionResponse};
pub use lock::{Lock, LockId, LockMetadata, LockShape, LockSource};
pub use registry::{LockRegistry, SharedLockRegistry};
pub use scanner::LockScanner;
