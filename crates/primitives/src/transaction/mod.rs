//! Steps, position maps, and transactions.

mod map;
mod step;
mod types;

pub use map::{MapRange, MapResult, Mapping, StepMap};
use rustc_hash::FxHashMap;
pub use step::Step;
pub use types::{Bias, Slice};

use crate::document::{Block, Document, Mark, TextNode};
use crate::error::Result;
use crate::range::{Pos, Span};

/// A metadata value attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
	Bool(bool),
	Text(String),
}

impl MetaValue {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			Self::Text(_) => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			Self::Bool(_) => None,
		}
	}
}

impl From<bool> for MetaValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<&str> for MetaValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for MetaValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

/// A proposed document mutation: a start document plus validated steps.
///
/// Every step is applied as it is added, so [`Transaction::doc`] is always the
/// document the transaction would produce. A step that does not fit leaves the
/// transaction untouched.
#[derive(Debug, Clone)]
pub struct Transaction {
	before: Document,
	doc: Document,
	steps: Vec<Step>,
	inverted: Vec<Step>,
	mapping: Mapping,
	meta: FxHashMap<&'static str, MetaValue>,
	selection: Option<Span>,
}

impl Transaction {
	/// Starts an empty transaction against `doc`.
	pub fn new(doc: &Document) -> Self {
		Self {
			before: doc.clone(),
			doc: doc.clone(),
			steps: Vec::new(),
			inverted: Vec::new(),
			mapping: Mapping::new(),
			meta: FxHashMap::default(),
			selection: None,
		}
	}

	/// The document the transaction started from.
	pub fn before(&self) -> &Document {
		&self.before
	}

	/// The document after all steps.
	pub fn doc(&self) -> &Document {
		&self.doc
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	pub fn mapping(&self) -> &Mapping {
		&self.mapping
	}

	/// Returns true if any step was added.
	pub fn doc_changed(&self) -> bool {
		!self.steps.is_empty()
	}

	/// Steps that undo this transaction, in the order they must be applied.
	pub fn inverse_steps(&self) -> Vec<Step> {
		self.inverted.iter().rev().cloned().collect()
	}

	/// Applies `step` to the current document and records it.
	pub fn step(&mut self, step: Step) -> Result<&mut Self> {
		let next = step.apply(&self.doc)?;
		let inverse = step.invert(&self.doc)?;
		self.mapping.push(step.get_map());
		self.inverted.push(inverse);
		self.steps.push(step);
		self.doc = next;
		Ok(self)
	}

	pub fn replace(&mut self, from: Pos, to: Pos, slice: Slice) -> Result<&mut Self> {
		self.step(Step::replace(from, to, slice))
	}

	pub fn delete(&mut self, from: Pos, to: Pos) -> Result<&mut Self> {
		self.step(Step::delete(from, to))
	}

	/// Inserts unmarked text at an inline position.
	pub fn insert_text(&mut self, pos: Pos, text: &str) -> Result<&mut Self> {
		self.replace(pos, pos, Slice::Inline(vec![TextNode::new(text)]))
	}

	pub fn insert_inline(&mut self, pos: Pos, nodes: Vec<TextNode>) -> Result<&mut Self> {
		self.replace(pos, pos, Slice::Inline(nodes))
	}

	/// Inserts blocks at a block boundary.
	pub fn insert_blocks(&mut self, pos: Pos, blocks: Vec<Block>) -> Result<&mut Self> {
		self.replace(pos, pos, Slice::Blocks(blocks))
	}

	pub fn add_mark(&mut self, from: Pos, to: Pos, mark: Mark) -> Result<&mut Self> {
		self.step(Step::AddMark { from, to, mark })
	}

	pub fn remove_mark(&mut self, from: Pos, to: Pos, name: &str) -> Result<&mut Self> {
		self.step(Step::RemoveMark {
			from,
			to,
			name: name.to_string(),
		})
	}

	pub fn set_meta(&mut self, key: &'static str, value: impl Into<MetaValue>) -> &mut Self {
		self.meta.insert(key, value.into());
		self
	}

	pub fn meta(&self, key: &str) -> Option<&MetaValue> {
		self.meta.get(key)
	}

	pub fn meta_bool(&self, key: &str) -> Option<bool> {
		self.meta(key).and_then(MetaValue::as_bool)
	}

	pub fn meta_str(&self, key: &str) -> Option<&str> {
		self.meta(key).and_then(MetaValue::as_str)
	}

	/// Sets the selection, in the resulting document's coordinates.
	pub fn set_selection(&mut self, selection: Span) -> &mut Self {
		self.selection = Some(selection);
		self
	}

	pub fn selection(&self) -> Option<Span> {
		self.selection
	}
}
