use super::map::{Mapping, StepMap};
use super::types::{Bias, Slice};
use crate::document::{Document, Mark, ResolvedPos, TextNode};
use crate::error::{Result, StepError};
use crate::range::{Pos, Span};

/// An atomic document change.
///
/// Steps are the low-level units a [`super::Transaction`] is made of. Each one
/// knows how to apply itself, how it moves positions ([`Step::get_map`]), which
/// pre-step range it touches ([`Step::affected_range`]), and how to undo itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
	/// Replace `[from, to)` with `slice`.
	///
	/// Inline slices go inside textblocks; when `from` and `to` sit in
	/// different textblocks the two are joined. Block slices go between blocks.
	Replace { from: Pos, to: Pos, slice: Slice },
	/// Add `mark` to all text in `[from, to)`.
	AddMark { from: Pos, to: Pos, mark: Mark },
	/// Remove the mark named `name` from all text in `[from, to)`.
	RemoveMark { from: Pos, to: Pos, name: String },
}

impl Step {
	pub fn replace(from: Pos, to: Pos, slice: Slice) -> Self {
		Self::Replace { from, to, slice }
	}

	pub fn delete(from: Pos, to: Pos) -> Self {
		Self::Replace {
			from,
			to,
			slice: Slice::empty(),
		}
	}

	/// The range of the pre-step document this step reads or rewrites.
	///
	/// Mark steps do not move positions but still alter `[from, to)`.
	pub fn affected_range(&self) -> Span {
		match self {
			Self::Replace { from, to, .. }
			| Self::AddMark { from, to, .. }
			| Self::RemoveMark { from, to, .. } => Span::new(*from, *to),
		}
	}

	/// Returns the position map of this step.
	pub fn get_map(&self) -> StepMap {
		match self {
			Self::Replace { from, to, slice } => {
				StepMap::new(*from, to.saturating_sub(*from), slice.size())
			}
			Self::AddMark { .. } | Self::RemoveMark { .. } => StepMap::identity(),
		}
	}

	/// Applies the step, returning the resulting document.
	pub fn apply(&self, doc: &Document) -> Result<Document> {
		match self {
			Self::Replace { from, to, slice } => apply_replace(doc, *from, *to, slice),
			Self::AddMark { from, to, mark } => {
				apply_marks(doc, *from, *to, |node| node.add_mark(mark.clone()))
			}
			Self::RemoveMark { from, to, name } => apply_marks(doc, *from, *to, |node| {
				node.remove_mark(name);
			}),
		}
	}

	/// Returns a step that undoes this one when applied to the result.
	///
	/// # Parameters
	/// - `doc`: The document this step was applied to
	pub fn invert(&self, doc: &Document) -> Result<Step> {
		match self {
			Self::Replace { from, to, slice } => {
				let (from, to) = (*from, *to);
				match (doc.resolve(from)?, doc.resolve(to)?) {
					(ResolvedPos::Boundary { index: i }, ResolvedPos::Boundary { index: j }) => {
						Ok(Step::Replace {
							from,
							to: from + slice.size(),
							slice: Slice::Blocks(doc.blocks()[i..j].to_vec()),
						})
					}
					(
						ResolvedPos::Inline {
							block: a,
							offset: oa,
							block_start,
						},
						ResolvedPos::Inline {
							block: b,
							offset: ob,
							..
						},
					) => {
						let blocks = doc.blocks();
						if a == b {
							Ok(Step::Replace {
								from,
								to: from + slice.size(),
								slice: Slice::Inline(blocks[a].cut(oa, ob)),
							})
						} else {
							// The join left one merged block where `a..=b` used to be.
							let merged = oa + slice.size() + (blocks[b].content_size() - ob) + 2;
							Ok(Step::Replace {
								from: block_start,
								to: block_start + merged,
								slice: Slice::Blocks(blocks[a..=b].to_vec()),
							})
						}
					}
					_ => Err(StepError::InvalidRange { from, to }),
				}
			}
			Self::AddMark { from, to, .. } | Self::RemoveMark { from, to, .. } => {
				let range = Span::new(*from, *to);
				doc.resolve(range.to)?;
				let touched: Vec<(usize, Span)> = doc
					.block_spans()
					.filter(|(_, span)| Span::new(span.from + 1, span.to - 1).touches(range))
					.collect();
				match (touched.first(), touched.last()) {
					(Some(&(first, start)), Some(&(last, end))) => Ok(Step::Replace {
						from: start.from,
						to: end.to,
						slice: Slice::Blocks(doc.blocks()[first..=last].to_vec()),
					}),
					_ => Ok(self.clone()),
				}
			}
		}
	}

	/// Rebases the step through `mapping`.
	///
	/// Returns [`None`] when the content the step targeted no longer exists.
	pub fn map(&self, mapping: &Mapping) -> Option<Step> {
		let range = self.affected_range();
		let start = mapping.map_result(range.from, Bias::Right);
		let end = mapping.map_result(range.to, Bias::Left);
		match self {
			Self::Replace { slice, .. } => {
				if start.deleted && end.deleted {
					return None;
				}
				Some(Step::Replace {
					from: start.pos,
					to: end.pos.max(start.pos),
					slice: slice.clone(),
				})
			}
			Self::AddMark { mark, .. } => (end.pos > start.pos).then(|| Step::AddMark {
				from: start.pos,
				to: end.pos,
				mark: mark.clone(),
			}),
			Self::RemoveMark { name, .. } => (end.pos > start.pos).then(|| Step::RemoveMark {
				from: start.pos,
				to: end.pos,
				name: name.clone(),
			}),
		}
	}
}

fn apply_replace(doc: &Document, from: Pos, to: Pos, slice: &Slice) -> Result<Document> {
	if from > to {
		return Err(StepError::InvalidRange { from, to });
	}
	let mut out = doc.clone();
	match (doc.resolve(from)?, doc.resolve(to)?) {
		(ResolvedPos::Boundary { index: i }, ResolvedPos::Boundary { index: j }) => {
			let blocks = match slice {
				Slice::Blocks(blocks) => blocks.clone(),
				Slice::Inline(_) if slice.is_empty() => Vec::new(),
				Slice::Inline(_) => return Err(StepError::InlineAtBoundary { pos: from }),
			};
			out.blocks_mut().splice(i..j, blocks);
		}
		(
			ResolvedPos::Inline {
				block: a,
				offset: oa,
				..
			},
			ResolvedPos::Inline {
				block: b,
				offset: ob,
				..
			},
		) => {
			let nodes = match slice {
				Slice::Inline(nodes) => nodes.clone(),
				Slice::Blocks(blocks) if blocks.is_empty() => Vec::new(),
				Slice::Blocks(_) => return Err(StepError::BlocksInsideText { pos: from }),
			};
			let head = &doc.blocks()[a];
			let tail = &doc.blocks()[b];
			let mut content = head.cut(0, oa);
			content.extend(nodes);
			content.extend(tail.cut(ob, tail.content_size()));
			let mut merged = head.clone();
			merged.set_content(content);
			out.blocks_mut().splice(a..=b, [merged]);
		}
		_ => return Err(StepError::InvalidRange { from, to }),
	}
	Ok(out)
}

fn apply_marks<F>(doc: &Document, from: Pos, to: Pos, mut f: F) -> Result<Document>
where
	F: FnMut(&mut TextNode),
{
	if from > to {
		return Err(StepError::InvalidRange { from, to });
	}
	doc.resolve(to)?;
	let mut out = doc.clone();
	for (index, span) in doc.block_spans() {
		let content_start = span.from + 1;
		let a = from.max(content_start);
		let b = to.min(span.to - 1);
		if a >= b {
			continue;
		}
		let block = &doc.blocks()[index];
		let (oa, ob) = (a - content_start, b - content_start);
		let mut content = block.cut(0, oa);
		let mut middle = block.cut(oa, ob);
		for node in &mut middle {
			f(node);
		}
		content.extend(middle);
		content.extend(block.cut(ob, block.content_size()));
		out.blocks_mut()[index].set_content(content);
	}
	Ok(out)
}
