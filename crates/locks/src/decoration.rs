//! Presentation overlay for locked content.
//!
//! Decorations are fully derived from the document and the registry. The
//! [`LockDecorations`] plugin recomputes them whenever the document changes or
//! a transaction carries [`REFRESH_DECORATIONS`]; otherwise the previous set is
//! mapped through the transaction.

use std::ops::ControlFlow;

use impetus_editor::{Plugin, PluginKey};
use impetus_primitives::{Bias, Document, Mapping, Pos, Span, Transaction};
use tracing::trace;

use crate::config::DecorationStyle;
use crate::lock::{LockId, LockShape};
use crate::registry::{LockRegistry, SharedLockRegistry};
use crate::scan::visit_locks;

/// Plugin key of [`LockDecorations`].
pub const DECORATIONS_KEY: PluginKey = "lock-decorations";

/// Transaction meta forcing a recompute without a document change.
pub const REFRESH_DECORATIONS: &str = "lockDecorationsRefresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
	/// Styles a whole block node.
	Node,
	/// Styles a run of inline content.
	Inline,
}

/// One styled range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
	pub kind: DecorationKind,
	pub range: Span,
	pub class: String,
	pub lock_id: LockId,
	pub shape: LockShape,
	/// Accessibility role, absent on hidden decorations.
	pub role: Option<String>,
	/// Accessible label, absent on hidden decorations.
	pub label: Option<String>,
	/// Hides the content (persisted comment tokens).
	pub hidden: bool,
}

/// An ordered collection of decorations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
	decorations: Vec<Decoration>,
}

impl DecorationSet {
	pub fn new(mut decorations: Vec<Decoration>) -> Self {
		decorations.sort_by_key(|d| (d.range.from, d.range.to));
		Self { decorations }
	}

	pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
		self.decorations.iter()
	}

	pub fn len(&self) -> usize {
		self.decorations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decorations.is_empty()
	}

	/// Decorations touching `range`.
	pub fn find(&self, range: Span) -> impl Iterator<Item = &Decoration> {
		self.decorations.iter().filter(move |d| d.range.touches(range))
	}

	/// Returns true if a visible or hidden lock decoration covers `pos`.
	pub fn covers(&self, pos: Pos) -> bool {
		self.find(Span::new(pos, pos + 1)).next().is_some()
	}

	/// Repositions every decoration through `mapping`.
	///
	/// Ranges do not grow to include content inserted at their edges; a
	/// decoration whose range collapses is dropped.
	pub fn map(&self, mapping: &Mapping) -> Self {
		if mapping.is_identity() {
			return self.clone();
		}
		let decorations = self
			.decorations
			.iter()
			.filter_map(|d| {
				let from = mapping.map(d.range.from, Bias::Right);
				let to = mapping.map(d.range.to, Bias::Left);
				(from < to).then(|| Decoration {
					range: Span::new(from, to),
					..d.clone()
				})
			})
			.collect();
		Self { decorations }
	}
}

/// Derives decorations from a document and the registry.
#[derive(Debug, Clone, Default)]
pub struct DecorationEngine {
	style: DecorationStyle,
}

impl DecorationEngine {
	pub fn new(style: DecorationStyle) -> Self {
		Self { style }
	}

	pub fn style(&self) -> &DecorationStyle {
		&self.style
	}

	/// Builds the full decoration set for `doc`.
	pub fn recompute(&self, doc: &Document, registry: &LockRegistry) -> DecorationSet {
		let mut decorations = Vec::new();
		let _ = visit_locks(doc, Span::new(0, doc.content_size()), registry, |hit| {
			let site = &hit.site;
			if hit.registered() {
				let shape = site.effective_shape();
				let (kind, range) = match shape {
					LockShape::Block => (DecorationKind::Node, site.node),
					LockShape::Inline => (DecorationKind::Inline, site.protected),
				};
				if !range.is_empty() {
					decorations.push(Decoration {
						kind,
						range,
						class: self.style.locked_class.clone(),
						lock_id: site.lock_id.clone(),
						shape,
						role: Some(self.style.role.clone()),
						label: Some(format!("{} ({})", self.style.label_prefix, hit.source())),
						hidden: false,
					});
				}
			}
			if let Some(comment) = site.comment {
				decorations.push(Decoration {
					kind: DecorationKind::Inline,
					range: comment,
					class: self.style.hidden_class.clone(),
					lock_id: site.lock_id.clone(),
					shape: LockShape::Inline,
					role: None,
					label: None,
					hidden: true,
				});
			}
			ControlFlow::Continue(())
		});
		trace!(
			count = decorations.len(),
			locks = registry.lock_count(),
			"lock decorations recomputed"
		);
		DecorationSet::new(decorations)
	}
}

/// Plugin keeping a [`DecorationSet`] in sync with the document.
#[derive(Debug)]
pub struct LockDecorations {
	engine: DecorationEngine,
	registry: SharedLockRegistry,
	set: DecorationSet,
}

impl LockDecorations {
	pub fn new(engine: DecorationEngine, registry: SharedLockRegistry) -> Self {
		Self {
			engine,
			registry,
			set: DecorationSet::default(),
		}
	}

	pub fn decorations(&self) -> &DecorationSet {
		&self.set
	}

	fn recompute(&mut self, doc: &Document) {
		self.set = self.engine.recompute(doc, &self.registry.read());
	}
}

impl Plugin for LockDecorations {
	fn key(&self) -> PluginKey {
		DECORATIONS_KEY
	}

	fn init(&mut self, doc: &Document) {
		self.recompute(doc);
	}

	fn apply(&mut self, tx: &Transaction, _old: &Document, new: &Document) {
		if tx.doc_changed() || tx.meta_bool(REFRESH_DECORATIONS) == Some(true) {
			self.recompute(new);
		} else {
			self.set = self.set.map(tx.mapping());
		}
	}
}
