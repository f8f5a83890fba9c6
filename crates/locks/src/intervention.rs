//! Intervention payloads issued by the writing agents.
//!
//! ```json
//! {
//!   "action": "provoke",
//!   "content": "A low breath comes from behind the door.",
//!   "lock_id": "lock_01j4z3m8a6q3qz2x8j4z3m8a",
//!   "anchor": {"type": "pos", "from": 1234},
//!   "action_id": "act_550e8400-e29b-41d4-a716-446655440000",
//!   "source": "muse",
//!   "issued_at": "2024-01-15T10:30:00Z"
//! }
//! ```
//!
//! Anchors are positions in the document the agent saw; they are resolved
//! against the current document only when the action is applied.

use std::fmt;

use chrono::{DateTime, Utc};
use impetus_primitives::Pos;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InterventionError, InterventionResult};
use crate::lock::{LockId, LockSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionAction {
	/// Insert a locked block.
	Provoke,
	/// Remove a range.
	Delete,
	/// Replace a range with locked text.
	Rewrite,
}

impl InterventionAction {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Provoke => "provoke",
			Self::Delete => "delete",
			Self::Rewrite => "rewrite",
		}
	}
}

impl fmt::Display for InterventionAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Where an intervention applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anchor {
	Pos { from: Pos },
	/// `from` inclusive, `to` exclusive.
	Range { from: Pos, to: Pos },
	/// An existing lock, by id.
	#[serde(rename = "lock_id")]
	LockRef { ref_lock_id: LockId },
}

impl Anchor {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Pos { .. } => "pos",
			Self::Range { .. } => "range",
			Self::LockRef { .. } => "lock_id",
		}
	}
}

/// Agent persona that issued an intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentSource {
	Muse,
	Loki,
}

impl From<AgentSource> for LockSource {
	fn from(value: AgentSource) -> Self {
		match value {
			AgentSource::Muse => Self::Muse,
			AgentSource::Loki => Self::Loki,
		}
	}
}

fn generate_action_id() -> String {
	format!("act_{}", Uuid::new_v4())
}

/// One agent action, as received from the intervention service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionResponse {
	pub action: InterventionAction,
	/// Blockquote text (provoke) or replacement text (rewrite).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lock_id: Option<LockId>,
	pub anchor: Anchor,
	#[serde(default = "generate_action_id")]
	pub action_id: String,
	pub source: AgentSource,
	#[serde(default = "Utc::now")]
	pub issued_at: DateTime<Utc>,
}

impl InterventionResponse {
	fn new(action: InterventionAction, source: AgentSource, anchor: Anchor) -> Self {
		Self {
			action,
			content: None,
			lock_id: None,
			anchor,
			action_id: generate_action_id(),
			source,
			issued_at: Utc::now(),
		}
	}

	/// A provoke action with a fresh lock id.
	pub fn provoke(source: AgentSource, content: impl Into<String>, anchor: Anchor) -> Self {
		Self {
			content: Some(content.into()),
			lock_id: Some(LockId::generate()),
			..Self::new(InterventionAction::Provoke, source, anchor)
		}
	}

	/// A rewrite of `from..to` with a fresh lock id.
	pub fn rewrite(source: AgentSource, content: impl Into<String>, from: Pos, to: Pos) -> Self {
		Self {
			content: Some(content.into()),
			lock_id: Some(LockId::generate()),
			..Self::new(InterventionAction::Rewrite, source, Anchor::Range { from, to })
		}
	}

	pub fn delete(source: AgentSource, from: Pos, to: Pos) -> Self {
		Self::new(InterventionAction::Delete, source, Anchor::Range { from, to })
	}

	/// Decodes and validates a JSON payload.
	pub fn from_json(raw: &str) -> InterventionResult<Self> {
		serde_json::from_str::<Self>(raw)?.validated()
	}

	pub fn to_json(&self) -> InterventionResult<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Checks the per-action requirements; a delete drops content and lock id.
	pub fn validated(mut self) -> InterventionResult<Self> {
		let action = self.action.as_str();
		match self.action {
			InterventionAction::Provoke => {
				self.require_content()?;
			}
			InterventionAction::Rewrite => {
				self.require_content()?;
				self.require_range()?;
			}
			InterventionAction::Delete => {
				self.require_range()?;
				self.content = None;
				self.lock_id = None;
			}
		}
		if self.action != InterventionAction::Delete && self.lock_id.is_none() {
			return Err(InterventionError::MissingLockId(action));
		}
		Ok(self)
	}

	pub fn agent_source(&self) -> LockSource {
		self.source.into()
	}

	fn require_content(&self) -> InterventionResult<()> {
		match &self.content {
			Some(content) if !content.trim().is_empty() => Ok(()),
			_ => Err(InterventionError::MissingContent(self.action.as_str())),
		}
	}

	fn require_range(&self) -> InterventionResult<()> {
		match self.anchor {
			Anchor::Range { from, to } if to > from => Ok(()),
			Anchor::Range { from, to } => Err(InterventionError::EmptyRange { from, to }),
			ref other => Err(InterventionError::AnchorMismatch {
				action: self.action.as_str(),
				anchor: other.kind(),
			}),
		}
	}
}

/// Result of applying an intervention to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterventionOutcome {
	/// The edit landed; carries the lock it registered, if any.
	Applied { lock_id: Option<LockId> },
	/// Another action is still processing or settling.
	Busy,
	/// The edit did not apply (a lock, or content that does not fit).
	Rejected,
	/// The anchor no longer resolves in the current document.
	Unresolved,
}

impl InterventionOutcome {
	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied { .. })
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn test_decodes_provoke_payload() {
		let response = InterventionResponse::from_json(
			r#"{
				"action": "provoke",
				"content": "A low breath comes from behind the door.",
				"lock_id": "lock_01j4",
				"anchor": {"type": "pos", "from": 12},
				"action_id": "act_1",
				"source": "muse",
				"issued_at": "2024-01-15T10:30:00Z"
			}"#,
		)
		.unwrap();
		assert_eq!(response.action, InterventionAction::Provoke);
		assert_eq!(response.anchor, Anchor::Pos { from: 12 });
		assert_eq!(response.lock_id, Some(LockId::new("lock_01j4")));
		assert_eq!(response.agent_source(), LockSource::Muse);
		assert_eq!(response.issued_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");
	}

	#[test]
	fn test_delete_drops_content_and_defaults_ids() {
		let response = InterventionResponse::from_json(
			r#"{
				"action": "delete",
				"content": "ignored",
				"lock_id": "ignored",
				"anchor": {"type": "range", "from": 3, "to": 9},
				"source": "loki"
			}"#,
		)
		.unwrap();
		assert_eq!(response.content, None);
		assert_eq!(response.lock_id, None);
		assert!(response.action_id.starts_with("act_"));
	}

	#[test]
	fn test_lock_id_anchor_round_trips() {
		let response = InterventionResponse::provoke(
			AgentSource::Loki,
			"Who knocked?",
			Anchor::LockRef {
				ref_lock_id: LockId::new("lock_prev"),
			},
		);
		let json = response.to_json().unwrap();
		assert!(json.contains(r#""anchor":{"type":"lock_id","ref_lock_id":"lock_prev"}"#));
		assert_eq!(InterventionResponse::from_json(&json).unwrap(), response);
	}

	#[test]
	fn test_validation_failures() {
		let blank = InterventionResponse {
			content: Some("  ".to_string()),
			..InterventionResponse::provoke(AgentSource::Muse, "", Anchor::Pos { from: 1 })
		};
		assert!(matches!(
			blank.validated(),
			Err(InterventionError::MissingContent("provoke"))
		));

		let unlocked = InterventionResponse {
			lock_id: None,
			..InterventionResponse::rewrite(AgentSource::Loki, "new", 1, 4)
		};
		assert!(matches!(
			unlocked.validated(),
			Err(InterventionError::MissingLockId("rewrite"))
		));

		let pointed = InterventionResponse {
			anchor: Anchor::Pos { from: 1 },
			..InterventionResponse::delete(AgentSource::Loki, 1, 2)
		};
		assert!(matches!(
			pointed.validated(),
			Err(InterventionError::AnchorMismatch {
				action: "delete",
				anchor: "pos"
			})
		));

		assert!(matches!(
			InterventionResponse::delete(AgentSource::Loki, 4, 4).validated(),
			Err(InterventionError::EmptyRange { from: 4, to: 4 })
		));
		assert!(matches!(
			InterventionResponse::from_json(r#"{"action":"shout"}"#),
			Err(InterventionError::Json(_))
		));
	}

	#[test]
	fn test_generated_ids_are_prefixed() {
		let response = InterventionResponse::rewrite(AgentSource::Muse, "new", 1, 4);
		assert!(response.lock_id.unwrap().as_str().starts_with("lock_"));
		assert!(response.action_id.starts_with("act_"));
	}
}
