#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Core document types: positions, the block/text tree, steps, and transactions.

/// Rich-text document tree and node traversal.
pub mod document;
/// Step application errors.
pub mod error;
/// Position and span types.
pub mod range;
/// Steps, position maps, and transactions.
pub mod transaction;

pub use document::{
	Attrs, Block, BlockKind, Document, Mark, Marks, NodeRef, ResolvedPos, TextNode, Walk,
};
pub use error::StepError;
pub use range::{Len, Pos, Span};
pub use transaction::{
	Bias, MapRange, MapResult, Mapping, MetaValue, Slice, Step, StepMap, Transaction,
};
