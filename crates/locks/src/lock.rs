//! Lock identity and metadata.

use std::borrow::Borrow;
use std::fmt;

use impetus_primitives::{Attrs, Mark};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attribute carrying the lock id, on blocks and on lock marks.
pub const LOCK_ID_ATTR: &str = "lock_id";
/// Attribute carrying the [`LockSource`].
pub const LOCK_SOURCE_ATTR: &str = "lock_source";
/// Attribute carrying the [`LockShape`].
pub const LOCK_SHAPE_ATTR: &str = "lock_shape";
/// Name of the inline mark that locks the text it covers.
pub const LOCK_MARK: &str = "lock";

/// Opaque lock identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockId(String);

impl LockId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Parses a raw id; blank input is not an id.
	pub fn parse(raw: &str) -> Option<Self> {
		let id = raw.trim();
		(!id.is_empty()).then(|| Self(id.to_string()))
	}

	/// Generates a fresh `lock_<uuid-v4>` id.
	pub fn generate() -> Self {
		Self(format!("lock_{}", Uuid::new_v4()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for LockId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for LockId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for LockId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// Who created a lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockSource {
	/// The muse persona (nudges a stuck writer).
	Muse,
	/// The loki persona (chaotic interventions).
	Loki,
	/// Locked by the writer.
	User,
	#[default]
	Unspecified,
}

impl LockSource {
	/// Parses a source name, case-insensitively. Unknown names are [`Self::Unspecified`].
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"muse" => Self::Muse,
			"loki" => Self::Loki,
			"user" => Self::User,
			_ => Self::Unspecified,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Muse => "muse",
			Self::Loki => "loki",
			Self::User => "user",
			Self::Unspecified => "unspecified",
		}
	}
}

impl fmt::Display for LockSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How a lock is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockShape {
	#[default]
	Inline,
	Block,
}

impl LockShape {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"inline" => Some(Self::Inline),
			"block" => Some(Self::Block),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Inline => "inline",
			Self::Block => "block",
		}
	}
}

/// Registry payload for one lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
	pub source: LockSource,
	pub shape: LockShape,
}

impl LockMetadata {
	pub fn new(source: LockSource, shape: LockShape) -> Self {
		Self { source, shape }
	}
}

/// A registered lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lock {
	pub id: LockId,
	pub metadata: LockMetadata,
}

/// Attributes marking a node as locked.
pub fn lock_attrs(id: &LockId, metadata: LockMetadata) -> Attrs {
	Attrs::new()
		.with(LOCK_ID_ATTR, id.as_str())
		.with(LOCK_SOURCE_ATTR, metadata.source.as_str())
		.with(LOCK_SHAPE_ATTR, metadata.shape.as_str())
}

/// An inline lock mark.
pub fn lock_mark(id: &LockId, source: LockSource) -> Mark {
	Mark::new(LOCK_MARK).with_attrs(lock_attrs(id, LockMetadata::new(source, LockShape::Inline)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lock_id_parse_rejects_blank() {
		assert_eq!(LockId::parse("  L1 "), Some(LockId::new("L1")));
		assert_eq!(LockId::parse(""), None);
		assert_eq!(LockId::parse(" \t"), None);
	}

	#[test]
	fn test_generated_ids_are_prefixed_and_unique() {
		let a = LockId::generate();
		let b = LockId::generate();
		assert!(a.as_str().starts_with("lock_"));
		assert_eq!(a.as_str().len(), "lock_".len() + 36);
		assert_ne!(a, b);
	}

	#[test]
	fn test_source_parse_is_case_insensitive() {
		assert_eq!(LockSource::parse("MUSE"), LockSource::Muse);
		assert_eq!(LockSource::parse("Loki"), LockSource::Loki);
		assert_eq!(LockSource::parse("user"), LockSource::User);
		assert_eq!(LockSource::parse("agentC"), LockSource::Unspecified);
		assert_eq!(LockShape::parse("Block"), Some(LockShape::Block));
		assert_eq!(LockShape::parse("square"), None);
	}

	#[test]
	fn test_lock_mark_carries_attributes() {
		let mark = lock_mark(&LockId::new("L1"), LockSource::Loki);
		assert_eq!(mark.name(), LOCK_MARK);
		assert_eq!(mark.attrs().get(LOCK_ID_ATTR), Some("L1"));
		assert_eq!(mark.attrs().get(LOCK_SOURCE_ATTR), Some("loki"));
		assert_eq!(mark.attrs().get(LOCK_SHAPE_ATTR), Some("inline"));
	}
}
