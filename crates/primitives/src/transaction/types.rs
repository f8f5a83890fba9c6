use crate::document::{Block, TextNode};
use crate::range::Len;

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a replacement, bias determines whether the
/// position moves with inserted content or stays before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// Content inserted by a replace step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slice {
	/// Inline content, placed inside a textblock.
	Inline(Vec<TextNode>),
	/// Whole blocks, placed at a block boundary.
	Blocks(Vec<Block>),
}

impl Slice {
	/// An empty slice, used by deletions.
	pub fn empty() -> Self {
		Self::Inline(Vec::new())
	}

	/// Number of positions the slice occupies once inserted.
	pub fn size(&self) -> Len {
		match self {
			Self::Inline(nodes) => nodes.iter().map(TextNode::len).sum(),
			Self::Blocks(blocks) => blocks.iter().map(Block::node_size).sum(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Inline(nodes) => nodes.iter().all(TextNode::is_empty),
			Self::Blocks(blocks) => blocks.is_empty(),
		}
	}
}
