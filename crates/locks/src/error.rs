//! Error types for engine configuration and intervention payloads.

use thiserror::Error;

/// Errors that can occur when loading [`LockEngineConfig`](crate::config::LockEngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or field types.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// History must keep at least one entry.
	#[error("history depth must be greater than zero")]
	ZeroHistoryDepth,
}

/// Errors that can occur when decoding or validating an intervention.
#[derive(Debug, Error)]
pub enum InterventionError {
	/// The payload is not valid intervention JSON.
	#[error("invalid intervention payload: {0}")]
	Json(#[from] serde_json::Error),

	/// The action needs non-blank content.
	#[error("{0} requires content")]
	MissingContent(&'static str),

	/// The action needs a lock id.
	#[error("{0} requires a lock id")]
	MissingLockId(&'static str),

	/// The action needs a range anchor.
	#[error("{action} requires a range anchor, got {anchor}")]
	AnchorMismatch {
		action: &'static str,
		anchor: &'static str,
	},

	/// A range anchor covers nothing.
	#[error("empty anchor range {from}..{to}")]
	EmptyRange { from: usize, to: usize },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for intervention decoding.
pub type InterventionResult<T> = std::result::Result<T, InterventionError>;
