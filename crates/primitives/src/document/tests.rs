use pretty_assertions::assert_eq;

use super::*;

fn sample() -> Document {
	Document::new(vec![Block::paragraph("Hello"), Block::paragraph("hi")])
}

#[test]
fn test_content_size_counts_block_tokens() {
	let doc = sample();
	assert_eq!(doc.content_size(), 11);
	assert_eq!(
		doc.block_spans().collect::<Vec<_>>(),
		vec![(0, Span::new(0, 7)), (1, Span::new(7, 11))]
	);
}

#[test]
fn test_resolve_positions() {
	let doc = sample();
	assert_eq!(doc.resolve(0), Ok(ResolvedPos::Boundary { index: 0 }));
	assert_eq!(
		doc.resolve(1),
		Ok(ResolvedPos::Inline {
			block: 0,
			offset: 0,
			block_start: 0
		})
	);
	assert_eq!(
		doc.resolve(6),
		Ok(ResolvedPos::Inline {
			block: 0,
			offset: 5,
			block_start: 0
		})
	);
	assert_eq!(doc.resolve(7), Ok(ResolvedPos::Boundary { index: 1 }));
	assert_eq!(doc.resolve(11), Ok(ResolvedPos::Boundary { index: 2 }));
	assert_eq!(
		doc.resolve(12),
		Err(StepError::OutOfBounds { pos: 12, size: 11 })
	);
}

#[test]
fn test_nodes_between_visits_overlapping_nodes() {
	let doc = sample();
	let mut seen = Vec::new();
	doc.nodes_between(2, 9, |node, pos| {
		seen.push((node.type_name(), pos));
		Walk::Descend
	});
	assert_eq!(
		seen,
		vec![("paragraph", 0), ("text", 1), ("paragraph", 7), ("text", 8)]
	);
}

#[test]
fn test_nodes_between_empty_range_needs_strict_containment() {
	let doc = sample();
	let mut seen = Vec::new();
	doc.nodes_between(7, 7, |node, pos| {
		seen.push((node.type_name(), pos));
		Walk::Descend
	});
	assert!(seen.is_empty(), "boundary between blocks touches nothing");

	doc.nodes_between(3, 3, |node, pos| {
		seen.push((node.type_name(), pos));
		Walk::Descend
	});
	assert_eq!(seen, vec![("paragraph", 0), ("text", 1)]);
}

#[test]
fn test_nodes_between_stop_and_skip() {
	let doc = sample();
	let mut count = 0;
	let completed = doc.descendants(|_, _| {
		count += 1;
		Walk::Stop
	});
	assert!(!completed);
	assert_eq!(count, 1);

	let mut types = Vec::new();
	doc.descendants(|node, _| {
		types.push(node.type_name());
		Walk::Skip
	});
	assert_eq!(types, vec!["paragraph", "paragraph"]);
}

#[test]
fn test_text_between_spans_blocks() {
	let doc = sample();
	assert_eq!(doc.text_between(2, 5), "ell");
	assert_eq!(doc.text_between(4, 10), "lo\nhi");
	assert_eq!(doc.text(), "Hello\nhi");
}

#[test]
fn test_marks_are_sorted_and_unique() {
	let node = TextNode::new("x")
		.with_mark(Mark::new("strong"))
		.with_mark(Mark::new("em"))
		.with_mark(Mark::new("strong").with_attrs(Attrs::new().with("k", "v")));
	let names: Vec<_> = node.marks().iter().map(Mark::name).collect();
	assert_eq!(names, vec!["em", "strong"]);
	assert_eq!(node.marks()[1].attrs().get("k"), Some("v"));
}

#[test]
fn test_normalize_merges_equal_marks_and_drops_empty() {
	let em = Mark::new("em");
	let block = Block::new(BlockKind::Paragraph).with_content(vec![
		TextNode::new("ab"),
		TextNode::new(""),
		TextNode::new("cd"),
		TextNode::new("ef").with_mark(em.clone()),
	]);
	assert_eq!(block.content().len(), 2);
	assert_eq!(block.content()[0].text(), "abcd");
	assert_eq!(block.content()[1].marks(), &[em]);
}

#[test]
fn test_cut_splits_text_nodes() {
	let block = Block::new(BlockKind::Paragraph).with_content(vec![
		TextNode::new("abc"),
		TextNode::new("def").with_mark(Mark::new("em")),
	]);
	let cut = block.cut(2, 5);
	assert_eq!(cut.len(), 2);
	assert_eq!(cut[0].text(), "c");
	assert_eq!(cut[1].text(), "de");
	assert_eq!(cut[1].marks().len(), 1);
}
