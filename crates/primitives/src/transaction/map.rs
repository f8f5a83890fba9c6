use super::types::Bias;
use crate::range::{Len, Pos};

/// The replaced region described by a [`StepMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRange {
	/// Start of the replaced region (same in old and new coordinates).
	pub start: Pos,
	/// Size of the region before the step.
	pub old_size: Len,
	/// Size of the region after the step.
	pub new_size: Len,
}

/// Result of mapping a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
	/// The mapped position.
	pub pos: Pos,
	/// True if the position was strictly inside replaced content.
	pub deleted: bool,
}

/// Position map of a single step.
///
/// A step replaces at most one contiguous region, so the map is either the
/// identity or a single [`MapRange`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepMap {
	range: Option<MapRange>,
}

impl StepMap {
	/// A map that leaves every position in place.
	pub fn identity() -> Self {
		Self::default()
	}

	pub fn new(start: Pos, old_size: Len, new_size: Len) -> Self {
		if old_size == 0 && new_size == 0 {
			return Self::identity();
		}
		Self {
			range: Some(MapRange {
				start,
				old_size,
				new_size,
			}),
		}
	}

	pub fn range(&self) -> Option<MapRange> {
		self.range
	}

	/// Maps `pos` through this step.
	pub fn map(&self, pos: Pos, bias: Bias) -> Pos {
		self.map_result(pos, bias).pos
	}

	/// Maps `pos`, also reporting whether it sat inside replaced content.
	///
	/// The start of a non-empty replaced region stays put and its end moves
	/// after the new content; positions strictly inside follow `bias`.
	pub fn map_result(&self, pos: Pos, bias: Bias) -> MapResult {
		let Some(r) = self.range else {
			return MapResult {
				pos,
				deleted: false,
			};
		};
		let end = r.start + r.old_size;
		if pos < r.start {
			return MapResult {
				pos,
				deleted: false,
			};
		}
		if pos > end {
			return MapResult {
				pos: pos - r.old_size + r.new_size,
				deleted: false,
			};
		}

		let stay_left = if r.old_size == 0 {
			bias == Bias::Left
		} else if pos == r.start {
			true
		} else if pos == end {
			false
		} else {
			bias == Bias::Left
		};

		MapResult {
			pos: if stay_left { r.start } else { r.start + r.new_size },
			deleted: pos != r.start && pos != end,
		}
	}

	/// Recovers a position deleted by this map through `mirror`, the map that restores the same content.
	///
	/// `pos` keeps its offset inside the replaced region. Returns [`None`] if
	/// `mirror` does not restore a region of the same size.
	pub fn recover(&self, pos: Pos, mirror: &StepMap) -> Option<Pos> {
		let r = self.range?;
		let m = mirror.range?;
		(m.new_size == r.old_size && pos >= r.start).then(|| m.start + (pos - r.start))
	}

	/// Returns the map that undoes this one.
	pub fn invert(&self) -> StepMap {
		StepMap {
			range: self.range.map(|r| MapRange {
				start: r.start,
				old_size: r.new_size,
				new_size: r.old_size,
			}),
		}
	}
}

/// A sequence of step maps, mapping positions across a whole transaction.
///
/// Two maps may be registered as mirrors of each other: the later one restores
/// exactly the content the earlier one removed. A position deleted by the
/// earlier map then keeps its offset instead of collapsing to the region edge,
/// which is what rebasing an undo step past an unrelated change needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
	maps: Vec<StepMap>,
	mirrors: Vec<(usize, usize)>,
}

impl Mapping {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_maps(maps: impl IntoIterator<Item = StepMap>) -> Self {
		Self {
			maps: maps.into_iter().collect(),
			mirrors: Vec::new(),
		}
	}

	pub fn push(&mut self, map: StepMap) {
		self.maps.push(map);
	}

	/// Appends every map of `other`, keeping its mirrors.
	pub fn append(&mut self, other: &Mapping) {
		let offset = self.maps.len();
		self.maps.extend_from_slice(&other.maps);
		self.mirrors
			.extend(other.mirrors.iter().map(|&(a, b)| (a + offset, b + offset)));
	}

	/// Marks the maps at `a` and `b` as mirrors of each other.
	pub fn set_mirror(&mut self, a: usize, b: usize) {
		self.mirrors.push((a.min(b), a.max(b)));
	}

	/// Index of the map mirroring the map at `index`, if any.
	pub fn mirror(&self, index: usize) -> Option<usize> {
		self.mirrors.iter().find_map(|&(a, b)| match index {
			i if i == a => Some(b),
			i if i == b => Some(a),
			_ => None,
		})
	}

	pub fn maps(&self) -> &[StepMap] {
		&self.maps
	}

	pub fn len(&self) -> usize {
		self.maps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}

	/// Returns true if no map moves any position.
	pub fn is_identity(&self) -> bool {
		self.maps.iter().all(|m| m.range.is_none())
	}

	/// Returns the mapping made of maps `[from, to)`.
	pub fn slice(&self, from: usize, to: usize) -> Mapping {
		Mapping {
			maps: self.maps[from..to].to_vec(),
			mirrors: self
				.mirrors
				.iter()
				.filter(|&&(a, b)| a >= from && b < to)
				.map(|&(a, b)| (a - from, b - from))
				.collect(),
		}
	}

	/// Returns the mapping that maps positions backwards through these maps.
	pub fn invert(&self) -> Mapping {
		let last = self.maps.len().saturating_sub(1);
		Mapping {
			maps: self.maps.iter().rev().map(StepMap::invert).collect(),
			mirrors: self.mirrors.iter().map(|&(a, b)| (last - b, last - a)).collect(),
		}
	}

	pub fn map(&self, pos: Pos, bias: Bias) -> Pos {
		self.map_result(pos, bias).pos
	}

	/// Maps `pos` through every map; `deleted` is set if any map deleted it.
	///
	/// A position deleted by a map with a later mirror jumps straight to its
	/// restored place and continues after the mirror.
	pub fn map_result(&self, pos: Pos, bias: Bias) -> MapResult {
		let mut result = MapResult {
			pos,
			deleted: false,
		};
		let mut index = 0;
		while index < self.maps.len() {
			let map = &self.maps[index];
			let step = map.map_result(result.pos, bias);
			if step.deleted
				&& let Some(mirror) = self.mirror(index).filter(|&m| m > index)
				&& let Some(pos) = map.recover(result.pos, &self.maps[mirror])
			{
				result.pos = pos;
				index = mirror + 1;
				continue;
			}
			result.pos = step.pos;
			result.deleted |= step.deleted;
			index += 1;
		}
		result
	}
}
