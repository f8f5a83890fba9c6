use impetus_primitives::Document;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn view(blocks: Vec<Block>) -> EditorView {
	EditorView::with_document(Document::new(blocks))
}

#[rstest]
#[case::period("Hello there. How are you?", "How are you?")]
#[case::trailing_space("One. Two!  ", "Two!")]
#[case::single("just words", "just words")]
#[case::cjk("他打开门。犹豫着。", "犹豫着。")]
fn test_last_sentence(#[case] text: &str, #[case] expected: &str) {
	let doc = Document::new(vec![Block::paragraph("first."), Block::paragraph(text)]);
	let range = last_sentence_range(&doc).unwrap();
	assert_eq!(doc.text_between(range.from, range.to), expected);
}

#[test]
fn test_last_sentence_skips_empty_blocks() {
	let doc = Document::new(vec![Block::paragraph("Done. Yes."), Block::paragraph("  ")]);
	let range = last_sentence_range(&doc).unwrap();
	assert_eq!(doc.text_between(range.from, range.to), "Yes.");
	assert_eq!(last_sentence_range(&Document::default()), None);
}

#[test]
fn test_delete_last_sentence_skips_history() {
	let mut view = view(vec![Block::paragraph("Keep this. Drop this.")]);
	assert!(delete_last_sentence(&mut view));
	assert_eq!(view.doc().text(), "Keep this. ");
	assert!(!view.undo());
}

#[test]
fn test_locked_block_lands_after_anchor_block() {
	let mut view = view(vec![Block::paragraph("intro"), Block::paragraph("tail")]);
	let id = LockId::new("lock_q");
	assert!(insert_locked_block(&mut view, 3, "Who is there?", &id, LockSource::Muse));
	assert_eq!(view.doc().text(), "intro\nWho is there?\ntail");
	assert_eq!(find_lock_span(view.doc(), "lock_q"), Some(Span::new(7, 22)));
	assert!(!insert_locked_block(&mut view, 3, "   ", &id, LockSource::Muse));
}

#[rstest]
#[case::boundary(7, "intro\nQ\ntail")]
#[case::past_end(100, "intro\ntail\nQ")]
#[case::first(0, "Q\nintro\ntail")]
fn test_locked_block_positions(#[case] pos: Pos, #[case] expected: &str) {
	let mut view = view(vec![Block::paragraph("intro"), Block::paragraph("tail")]);
	assert!(insert_locked_block(&mut view, pos, "Q", &LockId::new("L"), LockSource::Loki));
	assert_eq!(view.doc().text(), expected);
}

#[test]
fn test_locked_inline_replaces_range() {
	let mut view = view(vec![Block::paragraph("Hello world")]);
	let id = LockId::new("lock_r");
	assert!(insert_locked_inline(&mut view, Span::new(7, 12), "there", &id, LockSource::Loki));
	assert_eq!(view.doc().text(), "Hello there");
	assert_eq!(find_lock_span(view.doc(), "lock_r"), Some(Span::new(7, 12)));
	assert!(!insert_locked_inline(&mut view, Span::new(7, 40), "x", &id, LockSource::Loki));
	assert!(!insert_locked_inline(&mut view, Span::new(0, 2), "x", &id, LockSource::Loki));
}

#[test]
fn test_resolve_anchor_clamps_to_current_document() {
	let doc = Document::new(vec![
		Block::paragraph("abc"),
		Block::blockquote("q").with_attrs(lock_attrs(&LockId::new("L1"), LockMetadata::default())),
	]);
	assert_eq!(resolve_anchor(&doc, &Anchor::Pos { from: 99 }), Some(Span::point(8)));
	assert_eq!(
		resolve_anchor(&doc, &Anchor::Range { from: 2, to: 99 }),
		Some(Span::new(2, 8))
	);
	assert_eq!(resolve_anchor(&doc, &Anchor::Range { from: 50, to: 99 }), None);
	assert_eq!(
		resolve_anchor(&doc, &Anchor::LockRef { ref_lock_id: LockId::new("L1") }),
		Some(Span::new(5, 8))
	);
	assert_eq!(
		resolve_anchor(&doc, &Anchor::LockRef { ref_lock_id: LockId::new("gone") }),
		None
	);
}
