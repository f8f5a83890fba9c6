//! Shared document scan for locked regions.
//!
//! Both the transaction guard and the decoration engine locate locks through
//! [`visit_locks`], so what is enforced and what is displayed come from the
//! same walk over the same extractor.

use std::ops::ControlFlow;

use impetus_primitives::{Document, Span, Walk};

use crate::extract::extract_locks;
use crate::lock::{LockId, LockMetadata, LockShape, LockSource};
use crate::registry::LockRegistry;

/// A lock marker found in a document, before any registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSite {
	pub lock_id: LockId,
	/// Source named by the marker itself.
	pub source: Option<LockSource>,
	/// Shape named by the marker itself.
	pub shape: Option<LockShape>,
	/// Span of the node carrying the marker.
	pub node: Span,
	/// Span of the protected content.
	pub protected: Span,
	/// Span of the persisted comment token, for comment locks.
	pub comment: Option<Span>,
	pub node_type: &'static str,
	pub is_block: bool,
}

impl LockSite {
	/// Every position an edit may not touch: the protected content plus its token.
	pub fn enforced(&self) -> Span {
		self.comment.map_or(self.protected, |c| self.protected.cover(c))
	}

	/// Shape used for rendering: block for block nodes or an explicit block shape.
	pub fn effective_shape(&self) -> LockShape {
		if self.is_block || self.shape == Some(LockShape::Block) {
			LockShape::Block
		} else {
			LockShape::Inline
		}
	}

	/// Metadata to register for a marker with no registry entry yet.
	pub fn metadata(&self) -> LockMetadata {
		LockMetadata::new(self.source.unwrap_or_default(), self.effective_shape())
	}
}

/// A [`LockSite`] resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHit {
	pub site: LockSite,
	/// Registry entry; `None` means the marker is not enforced.
	pub metadata: Option<LockMetadata>,
}

impl LockHit {
	pub fn registered(&self) -> bool {
		self.metadata.is_some()
	}

	pub fn lock_id(&self) -> &LockId {
		&self.site.lock_id
	}

	/// Registry source when registered, otherwise the marker's own.
	pub fn source(&self) -> LockSource {
		self.metadata
			.map(|m| m.source)
			.or(self.site.source)
			.unwrap_or_default()
	}

	pub fn enforced(&self) -> Span {
		self.site.enforced()
	}
}

/// Calls `f` for every lock marker on a node overlapping `range`.
pub fn visit_sites<F>(doc: &Document, range: Span, mut f: F) -> ControlFlow<()>
where
	F: FnMut(LockSite) -> ControlFlow<()>,
{
	let mut flow = ControlFlow::Continue(());
	doc.nodes_between(range.from, range.to, |node, pos| {
		let node_span = Span::new(pos, pos + node.node_size());
		for found in extract_locks(node) {
			let protected = found
				.content_range()
				.map_or(node_span, |content| content.offset(pos));
			let site = LockSite {
				lock_id: found.lock_id,
				source: found.source,
				shape: found.shape,
				node: node_span,
				protected,
				comment: found.comment_range.map(|c| c.offset(pos)),
				node_type: node.type_name(),
				is_block: node.is_block(),
			};
			if f(site).is_break() {
				flow = ControlFlow::Break(());
				return Walk::Stop;
			}
		}
		Walk::Descend
	});
	flow
}

/// Calls `f` for every lock marker overlapping `range`, with its registry entry.
pub fn visit_locks<F>(
	doc: &Document,
	range: Span,
	registry: &LockRegistry,
	mut f: F,
) -> ControlFlow<()>
where
	F: FnMut(&LockHit) -> ControlFlow<()>,
{
	visit_sites(doc, range, |site| {
		let hit = LockHit {
			metadata: registry.lock_metadata(site.lock_id.as_str()),
			site,
		};
		f(&hit)
	})
}

/// Collects every lock marker in `doc`.
pub fn all_sites(doc: &Document) -> Vec<LockSite> {
	let mut sites = Vec::new();
	let _ = visit_sites(doc, Span::new(0, doc.content_size()), |site| {
		sites.push(site);
		ControlFlow::Continue(())
	});
	sites
}
