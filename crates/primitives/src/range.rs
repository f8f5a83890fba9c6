/// A position in the document, measured in document tokens.
///
/// Every block contributes an opening and a closing token and every character
/// of text contributes one position. This is the canonical coordinate space
/// for steps, mappings, and decorations.
pub type Pos = usize;

/// A length or size measured in document positions.
///
/// Distinct from [`Pos`] to avoid accidentally passing an index where a size is
/// expected or vice versa.
pub type Len = usize;

/// A half-open span `[from, to)` of document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
	/// Start of the span (inclusive).
	pub from: Pos,
	/// End of the span (exclusive).
	pub to: Pos,
}

impl Span {
	/// Creates a span, ordering the endpoints if needed.
	pub fn new(a: Pos, b: Pos) -> Self {
		Self {
			from: a.min(b),
			to: a.max(b),
		}
	}

	/// Creates a zero-width span at `pos`.
	pub fn point(pos: Pos) -> Self {
		Self { from: pos, to: pos }
	}

	/// Returns the number of positions covered.
	#[inline]
	pub fn len(&self) -> Len {
		self.to - self.from
	}

	/// Returns true if the span covers no positions.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.from == self.to
	}

	/// Returns true if a node occupying `self` is visited by a walk over `range`.
	///
	/// This is the same predicate [`crate::Document::nodes_between`] uses, so a
	/// zero-width `range` only touches spans that strictly contain it.
	#[inline]
	pub fn touches(&self, range: Span) -> bool {
		self.from < range.to && self.to > range.from
	}

	/// Returns true if `other` lies entirely within `self`.
	#[inline]
	pub fn contains_span(&self, other: Span) -> bool {
		self.from <= other.from && other.to <= self.to
	}

	/// Returns the smallest span covering both `self` and `other`.
	pub fn cover(&self, other: Span) -> Span {
		Span {
			from: self.from.min(other.from),
			to: self.to.max(other.to),
		}
	}

	/// Shifts the span right by `by` positions.
	pub fn offset(&self, by: Pos) -> Span {
		Span {
			from: self.from + by,
			to: self.to + by,
		}
	}
}
