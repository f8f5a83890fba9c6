//! Error types for building and applying steps.

use thiserror::Error;

use crate::range::{Len, Pos};

/// Errors raised when a step does not fit the document it is applied to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
	/// A position lies past the end of the document.
	#[error("position {pos} is outside the document (size {size})")]
	OutOfBounds {
		/// The offending position.
		pos: Pos,
		/// Content size of the document.
		size: Len,
	},

	/// The range is reversed or its endpoints cannot be joined.
	#[error("invalid range {from}..{to}")]
	InvalidRange {
		/// Start of the range.
		from: Pos,
		/// End of the range.
		to: Pos,
	},

	/// Inline content was placed between blocks.
	#[error("inline content cannot be inserted at block boundary {pos}")]
	InlineAtBoundary {
		/// Boundary position.
		pos: Pos,
	},

	/// Block content was placed inside a textblock.
	#[error("block content cannot be inserted inside a textblock at {pos}")]
	BlocksInsideText {
		/// Inline position.
		pos: Pos,
	},
}

/// Result type for step operations.
pub type Result<T> = std::result::Result<T, StepError>;
