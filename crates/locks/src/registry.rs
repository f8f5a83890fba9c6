//! Authoritative set of active locks.
//!
//! Registry presence is the only thing that makes a lock enforceable: a node
//! carrying a lock id that is not registered here is ordinary content.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::lock::{Lock, LockId, LockMetadata};

/// Registry shared by the guard, scanner and decoration plugins of a session.
pub type SharedLockRegistry = Arc<RwLock<LockRegistry>>;

/// Lock id to metadata, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockRegistry {
	locks: IndexMap<LockId, LockMetadata>,
}

impl LockRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps the registry for sharing.
	pub fn shared(self) -> SharedLockRegistry {
		Arc::new(RwLock::new(self))
	}

	/// Registers `id`, replacing its metadata if already present.
	///
	/// Returns true if the id was not registered before.
	pub fn apply_lock(&mut self, id: LockId, metadata: LockMetadata) -> bool {
		trace!(
			lock_id = %id,
			source = %metadata.source,
			shape = metadata.shape.as_str(),
			"lock applied"
		);
		self.locks.insert(id, metadata).is_none()
	}

	pub fn has_lock(&self, id: &str) -> bool {
		self.locks.contains_key(id)
	}

	/// Unregisters `id`. Returns true if it was registered.
	pub fn remove_lock(&mut self, id: &str) -> bool {
		let removed = self.locks.shift_remove(id).is_some();
		trace!(lock_id = id, removed, "lock removed");
		removed
	}

	pub fn lock_metadata(&self, id: &str) -> Option<LockMetadata> {
		self.locks.get(id).copied()
	}

	/// All locks, in registration order.
	pub fn all_locks(&self) -> Vec<Lock> {
		self.iter()
			.map(|(id, metadata)| Lock {
				id: id.clone(),
				metadata,
			})
			.collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&LockId, LockMetadata)> {
		self.locks.iter().map(|(id, metadata)| (id, *metadata))
	}

	pub fn lock_count(&self) -> usize {
		self.locks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.locks.is_empty()
	}

	pub fn clear(&mut self) {
		trace!(cleared = self.locks.len(), "lock registry cleared");
		self.locks.clear();
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::lock::{LockShape, LockSource};

	fn meta(source: LockSource) -> LockMetadata {
		LockMetadata::new(source, LockShape::Block)
	}

	#[test]
	fn test_apply_lock_is_idempotent() {
		let mut registry = LockRegistry::new();
		assert!(registry.apply_lock(LockId::new("L1"), meta(LockSource::Muse)));
		assert!(!registry.apply_lock(LockId::new("L1"), meta(LockSource::Loki)));
		assert_eq!(registry.lock_count(), 1);
		assert_eq!(registry.lock_metadata("L1"), Some(meta(LockSource::Loki)));
	}

	#[test]
	fn test_all_locks_keeps_insertion_order_after_removal() {
		let mut registry = LockRegistry::new();
		for id in ["a", "b", "c"] {
			registry.apply_lock(LockId::new(id), meta(LockSource::User));
		}
		assert!(registry.remove_lock("b"));
		assert!(!registry.remove_lock("b"));

		let ids: Vec<_> = registry.all_locks().into_iter().map(|l| l.id).collect();
		assert_eq!(ids, vec![LockId::new("a"), LockId::new("c")]);
		assert!(!registry.has_lock("b"));
	}

	#[test]
	fn test_clear_empties_registry() {
		let shared = LockRegistry::new().shared();
		shared.write().apply_lock(LockId::new("x"), LockMetadata::default());
		assert!(shared.read().has_lock("x"));
		shared.write().clear();
		assert!(shared.read().is_empty());
		assert_eq!(shared.read().lock_metadata("x"), None);
	}
}
