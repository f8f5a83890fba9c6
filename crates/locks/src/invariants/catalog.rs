//! Catalog of invariants for lock enforcement.

#![allow(dead_code)]

/// Must treat a lock id with no registry entry as ordinary content.
///
/// - Enforced in: [`crate::scan::LockHit::registered`], [`crate::guard::TransactionGuard::check`]
/// - Tested by: `invariants::proofs::test_unregistered_locks_never_block`
/// - Failure symptom: Pasted or stale lock markers freeze text nobody locked.
pub(crate) const UNREGISTERED_LOCKS_NEVER_BLOCK: () = ();

/// Must reject the whole transaction when any step touches a registered lock, and report it once.
///
/// - Enforced in: [`crate::guard::TransactionGuard::filter`]
/// - Tested by: `invariants::proofs::test_rejection_is_atomic_and_reported_once`
/// - Failure symptom: Partially applied edits, or one warning per offending step.
pub(crate) const REJECTION_IS_ATOMIC: () = ();

/// Must accept transactions that leave the document unchanged without walking it.
///
/// - Enforced in: [`crate::guard::TransactionGuard::check`]
/// - Tested by: `invariants::proofs::test_unchanged_document_never_scans`
/// - Failure symptom: Selection and refresh transactions cost a full document scan.
pub(crate) const UNCHANGED_DOC_NEVER_SCANS: () = ();

/// Must derive enforcement and decorations from the same scan, so a position is
/// blocked exactly when it is shown as locked.
///
/// - Enforced in: [`crate::scan::visit_locks`]
/// - Tested by: `invariants::proofs::test_guard_matches_decorations`, `tests/agreement.rs`
/// - Failure symptom: Text looks locked but is editable, or looks free but refuses edits.
pub(crate) const GUARD_AGREES_WITH_DECORATIONS: () = ();

/// Must register locks inserted by a transaction before its document is installed.
///
/// - Enforced in: [`crate::scanner::LockScanner`] via the `on_accept` hook
/// - Tested by: `invariants::proofs::test_inserted_lock_guards_next_transaction`
/// - Failure symptom: The edit right after an insertion can delete the new lock.
pub(crate) const SCAN_BEFORE_SWAP: () = ();

/// Must install the engine plugins at most once per view.
///
/// - Enforced in: [`crate::engine::LockEngine::install`]
/// - Tested by: `invariants::proofs::test_single_install_per_view`
/// - Failure symptom: Duplicate decorations and repeated rejection callbacks.
pub(crate) const SINGLE_INSTALL_PER_VIEW: () = ();

/// Must keep AI-tagged transactions out of the undo stack.
///
/// - Enforced in: [`crate::history_bypass::configure_history_bypass`], [`crate::history_bypass::tag_ai_action`]
/// - Tested by: `invariants::proofs::test_ai_actions_bypass_history`
/// - Failure symptom: Undo removes an agent's intervention instead of the writer's last edit.
pub(crate) const AI_ACTIONS_BYPASS_HISTORY: () = ();

/// Must keep the registry keyed by id, so re-registering never adds an entry.
///
/// - Enforced in: [`crate::registry::LockRegistry::apply_lock`]
/// - Tested by: `invariants::proofs::test_apply_lock_is_idempotent`
/// - Failure symptom: Lock counts drift upward on reload.
pub(crate) const APPLY_LOCK_IS_IDEMPOTENT: () = ();
