//! Rich-text document tree.
//!
//! A [`Document`] is a flat sequence of [`Block`]s, each holding inline
//! [`TextNode`]s that carry [`Mark`]s. Positions follow the token convention of
//! [`crate::range::Pos`]:
//!
//! ```text
//!  0   1 2 3 4 5 6   7   8 9 10   11
//!  | <p> H e l l o </p> <p> h i </p> |
//! ```
//!
//! Position `0` sits before the first block, `content_size()` after the last.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::error::{Result, StepError};
use crate::range::{Len, Pos, Span};

/// String attributes attached to blocks and marks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(BTreeMap<String, String>);

impl Attrs {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.insert(key.into(), value.into());
	}

	/// Builder form of [`Attrs::set`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(key, value);
		self
	}

	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// The structural type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
	Paragraph,
	Blockquote,
	Heading(u8),
	CodeBlock,
}

impl BlockKind {
	/// Returns the schema name of this block type.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Paragraph => "paragraph",
			Self::Blockquote => "blockquote",
			Self::Heading(_) => "heading",
			Self::CodeBlock => "code_block",
		}
	}
}

/// An inline annotation over a text node (emphasis, links, locks, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
	name: String,
	attrs: Attrs,
}

impl Mark {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attrs: Attrs::new(),
		}
	}

	pub fn with_attrs(mut self, attrs: Attrs) -> Self {
		self.attrs = attrs;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}
}

/// Marks on a text node, kept sorted by name with at most one mark per name.
pub type Marks = SmallVec<[Mark; 2]>;

/// A run of text sharing one set of marks.
///
/// Fields are private to keep `char_len` equal to `text.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
	text: String,
	marks: Marks,
	char_len: Len,
}

impl TextNode {
	/// Creates an unmarked text node, computing the character length once.
	pub fn new(text: impl Into<String>) -> Self {
		let text = text.into();
		let char_len = text.chars().count();
		Self {
			text,
			marks: Marks::new(),
			char_len,
		}
	}

	/// Builder form of [`TextNode::add_mark`].
	pub fn with_mark(mut self, mark: Mark) -> Self {
		self.add_mark(mark);
		self
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn marks(&self) -> &[Mark] {
		&self.marks
	}

	/// Returns the cached character length (the node size).
	#[inline]
	pub fn len(&self) -> Len {
		self.char_len
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.char_len == 0
	}

	/// Adds `mark`, replacing any existing mark with the same name.
	pub fn add_mark(&mut self, mark: Mark) {
		self.marks.retain(|m| m.name != mark.name);
		let at = self
			.marks
			.iter()
			.position(|m| m.name > mark.name)
			.unwrap_or(self.marks.len());
		self.marks.insert(at, mark);
	}

	/// Removes the mark named `name`, returning true if one was present.
	pub fn remove_mark(&mut self, name: &str) -> bool {
		let before = self.marks.len();
		self.marks.retain(|m| m.name != name);
		self.marks.len() != before
	}

	/// Returns the characters in `[from, to)` with the same marks.
	pub fn slice(&self, from: Len, to: Len) -> TextNode {
		debug_assert!(from <= to && to <= self.char_len);
		let text: String = self.text.chars().skip(from).take(to - from).collect();
		TextNode {
			text,
			marks: self.marks.clone(),
			char_len: to - from,
		}
	}

	fn absorb(&mut self, other: TextNode) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}
}

/// A top-level block holding inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	kind: BlockKind,
	attrs: Attrs,
	content: Vec<TextNode>,
}

impl Block {
	pub fn new(kind: BlockKind) -> Self {
		Self {
			kind,
			attrs: Attrs::new(),
			content: Vec::new(),
		}
	}

	/// A paragraph holding one unmarked text node.
	pub fn paragraph(text: impl Into<String>) -> Self {
		Self::new(BlockKind::Paragraph).with_content(vec![TextNode::new(text)])
	}

	/// A blockquote holding one unmarked text node.
	pub fn blockquote(text: impl Into<String>) -> Self {
		Self::new(BlockKind::Blockquote).with_content(vec![TextNode::new(text)])
	}

	pub fn with_attrs(mut self, attrs: Attrs) -> Self {
		self.attrs = attrs;
		self
	}

	pub fn with_content(mut self, content: Vec<TextNode>) -> Self {
		self.content = normalize_inline(content);
		self
	}

	pub fn kind(&self) -> BlockKind {
		self.kind
	}

	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	pub fn content(&self) -> &[TextNode] {
		&self.content
	}

	/// Size of the inline content, excluding the block's own tokens.
	pub fn content_size(&self) -> Len {
		self.content.iter().map(TextNode::len).sum()
	}

	/// Size of the block including its opening and closing tokens.
	pub fn node_size(&self) -> Len {
		self.content_size() + 2
	}

	/// Concatenated text of all inline children.
	pub fn text(&self) -> String {
		self.content.iter().map(TextNode::text).collect()
	}

	/// Returns the inline content in `[from, to)`, measured from the content start.
	pub(crate) fn cut(&self, from: Len, to: Len) -> Vec<TextNode> {
		let mut out = Vec::new();
		let mut offset = 0;
		for node in &self.content {
			let end = offset + node.len();
			let start_in = from.max(offset);
			let end_in = to.min(end);
			if start_in < end_in {
				out.push(node.slice(start_in - offset, end_in - offset));
			}
			offset = end;
			if offset >= to {
				break;
			}
		}
		out
	}

	pub(crate) fn set_content(&mut self, content: Vec<TextNode>) {
		self.content = normalize_inline(content);
	}
}

/// Borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
	Block(&'a Block),
	Text(&'a TextNode),
}

impl<'a> NodeRef<'a> {
	/// Schema name of the node type (`"text"` for text nodes).
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Block(block) => block.kind.name(),
			Self::Text(_) => "text",
		}
	}

	/// Node attributes. Text nodes carry attributes only through marks.
	pub fn attrs(&self) -> Option<&'a Attrs> {
		match self {
			Self::Block(block) => Some(&block.attrs),
			Self::Text(_) => None,
		}
	}

	pub fn marks(&self) -> &'a [Mark] {
		match self {
			Self::Block(_) => &[],
			Self::Text(text) => text.marks(),
		}
	}

	pub fn text(&self) -> Option<&'a str> {
		match self {
			Self::Block(_) => None,
			Self::Text(text) => Some(text.text()),
		}
	}

	pub fn node_size(&self) -> Len {
		match self {
			Self::Block(block) => block.node_size(),
			Self::Text(text) => text.len(),
		}
	}

	pub fn is_block(&self) -> bool {
		matches!(self, Self::Block(_))
	}
}

/// Callback result for [`Document::nodes_between`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
	/// Visit the node's children.
	Descend,
	/// Skip the node's children.
	Skip,
	/// Abort the walk.
	Stop,
}

/// A position resolved against the block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPos {
	/// Between blocks, directly before block `index` (`index == len` at the end).
	Boundary { index: usize },
	/// Inside the content of block `block`, `offset` positions after its content start.
	Inline {
		block: usize,
		offset: Len,
		block_start: Pos,
	},
}

/// A rich-text document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	blocks: Vec<Block>,
}

impl Document {
	pub fn new(blocks: Vec<Block>) -> Self {
		Self { blocks }
	}

	pub fn blocks(&self) -> &[Block] {
		&self.blocks
	}

	/// Total number of positions inside the document.
	pub fn content_size(&self) -> Len {
		self.blocks.iter().map(Block::node_size).sum()
	}

	/// Returns the spans of all blocks, in order.
	pub fn block_spans(&self) -> impl Iterator<Item = (usize, Span)> + '_ {
		let mut start = 0;
		self.blocks.iter().enumerate().map(move |(index, block)| {
			let span = Span::new(start, start + block.node_size());
			start = span.to;
			(index, span)
		})
	}

	/// Resolves `pos` to a block boundary or an inline offset.
	pub fn resolve(&self, pos: Pos) -> Result<ResolvedPos> {
		let size = self.content_size();
		if pos > size {
			return Err(StepError::OutOfBounds { pos, size });
		}
		let mut start = 0;
		for (index, block) in self.blocks.iter().enumerate() {
			if pos == start {
				return Ok(ResolvedPos::Boundary { index });
			}
			let end = start + block.node_size();
			if pos < end {
				return Ok(ResolvedPos::Inline {
					block: index,
					offset: pos - start - 1,
					block_start: start,
				});
			}
			start = end;
		}
		Ok(ResolvedPos::Boundary {
			index: self.blocks.len(),
		})
	}

	/// Calls `f` for every node overlapping `[from, to)` with its start position.
	///
	/// A node `[start, end)` is visited iff `start < to && end > from`, so an
	/// empty range only visits nodes strictly containing it. Blocks are visited
	/// before their children. Returns false if the walk was stopped.
	pub fn nodes_between<F>(&self, from: Pos, to: Pos, mut f: F) -> bool
	where
		F: FnMut(NodeRef<'_>, Pos) -> Walk,
	{
		let mut pos = 0;
		for block in &self.blocks {
			if pos >= to {
				break;
			}
			let end = pos + block.node_size();
			if end > from {
				match f(NodeRef::Block(block), pos) {
					Walk::Stop => return false,
					Walk::Skip => {}
					Walk::Descend => {
						let mut child = pos + 1;
						for text in &block.content {
							if child >= to {
								break;
							}
							let child_end = child + text.len();
							if child_end > from && f(NodeRef::Text(text), child) == Walk::Stop {
								return false;
							}
							child = child_end;
						}
					}
				}
			}
			pos = end;
		}
		true
	}

	/// Visits every node in the document.
	pub fn descendants<F>(&self, f: F) -> bool
	where
		F: FnMut(NodeRef<'_>, Pos) -> Walk,
	{
		self.nodes_between(0, self.content_size(), f)
	}

	/// Text in `[from, to)`, with blocks separated by `\n`.
	pub fn text_between(&self, from: Pos, to: Pos) -> String {
		let mut out = String::new();
		let mut first = true;
		self.nodes_between(from, to, |node, pos| {
			match node {
				NodeRef::Block(_) => {
					if !first {
						out.push('\n');
					}
					first = false;
				}
				NodeRef::Text(text) => {
					let start = from.saturating_sub(pos);
					let end = (to - pos).min(text.len());
					out.extend(text.text().chars().skip(start).take(end - start));
				}
			}
			Walk::Descend
		});
		out
	}

	/// Full document text, with blocks separated by `\n`.
	pub fn text(&self) -> String {
		self.text_between(0, self.content_size())
	}

	pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
		&mut self.blocks
	}
}

/// Drops empty text nodes and merges neighbours with identical marks.
pub(crate) fn normalize_inline(nodes: Vec<TextNode>) -> Vec<TextNode> {
	let mut out: Vec<TextNode> = Vec::with_capacity(nodes.len());
	for node in nodes {
		if node.is_empty() {
			continue;
		}
		match out.last_mut() {
			Some(prev) if prev.marks == node.marks => prev.absorb(node),
			_ => out.push(node),
		}
	}
	out
}

#[cfg(test)]
mod tests;
