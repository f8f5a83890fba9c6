//! Engine configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! [decorations]
//! locked_class = "locked-content"
//! label_prefix = "Locked content"
//!
//! [gate]
//! settle_delay_ms = 500
//!
//! [history]
//! depth = 100
//! exclude_ai_actions = true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Presentation attributes of lock decorations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationStyle {
	/// Class of visible lock decorations.
	pub locked_class: String,
	/// Class hiding persisted comment tokens.
	pub hidden_class: String,
	/// Accessibility role of visible decorations.
	pub role: String,
	/// Prefix of the accessible label; the lock source follows in parentheses.
	pub label_prefix: String,
}

impl Default for DecorationStyle {
	fn default() -> Self {
		Self {
			locked_class: "locked-content".to_string(),
			hidden_class: "lock-comment-hidden".to_string(),
			role: "note".to_string(),
			label_prefix: "Locked content".to_string(),
		}
	}
}

/// Action gate timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
	/// How long the gate stays closed after an action finishes.
	pub settle_delay_ms: u64,
}

impl Default for GateConfig {
	fn default() -> Self {
		Self { settle_delay_ms: 500 }
	}
}

impl GateConfig {
	pub fn settle_delay(&self) -> Duration {
		Duration::from_millis(self.settle_delay_ms)
	}
}

/// Undo history settings for mounted views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryOptions {
	pub depth: usize,
	/// Keep AI-tagged transactions out of the undo stack.
	pub exclude_ai_actions: bool,
}

impl Default for HistoryOptions {
	fn default() -> Self {
		Self {
			depth: 100,
			exclude_ai_actions: true,
		}
	}
}

/// Configuration of a [`LockEngine`](crate::engine::LockEngine).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockEngineConfig {
	pub decorations: DecorationStyle,
	pub gate: GateConfig,
	pub history: HistoryOptions,
}

impl LockEngineConfig {
	/// Parses and validates a TOML configuration.
	pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> ConfigResult<()> {
		if self.history.depth == 0 {
			return Err(ConfigError::ZeroHistoryDepth);
		}
		Ok(())
	}
}
