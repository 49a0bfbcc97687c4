use super::annotation::{AnnotationMode, AnnotationTable};
use super::candidates::{filter_candidates, CandidateSource};
use super::controller::{CompletionController, NoGeometry};
use super::document::{char_to_utf16_offset, utf16_to_char_offset, Caret, Document, Span, TextEdit};
use super::engine::{Decoration, MentionEngine};
use super::keys::{CommandOutcome, Direction, Key, KeyCommand};
use super::scanner::ScanOutcome;
use super::trigger::{SourceKey, TriggerKind};

fn engine_with(tags: &[&str], persons: &[&str], text: &str) -> MentionEngine {
    let mut engine = MentionEngine::new();
    engine.set_candidates(
        CandidateSource::new()
            .with(SourceKey::Tags, tags.iter().copied())
            .with(SourceKey::Persons, persons.iter().copied()),
    );
    engine.insert_block("b1", text).unwrap();
    engine
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ==================== Prefix filter ====================

#[test]
fn test_filter_is_sorted_subset() {
    // Contract: every result starts with the partial (case-insensitive) and results are sorted
    let source = words(&["Zeta", "alpha", "Alpine", "beta", "ALTO", "al"]);
    for partial in ["", "a", "AL", "alp", "b", "q"] {
        let result = filter_candidates(&source, partial);
        assert!(result
            .iter()
            .all(|c| c.to_lowercase().starts_with(&partial.to_lowercase())));
        assert!(result.iter().all(|c| source.contains(c)));
        assert!(result.windows(2).all(|w| w[0] <= w[1]));
    }

    let mut all = source.clone();
    all.sort();
    assert_eq!(filter_candidates(&source, ""), all);
}

// ==================== Selection wraparound ====================

#[test]
fn test_selection_wraps_both_ways() {
    let tags = ["a1", "a2", "a3", "a4"];
    let mut document = Document::with_block("b1", "#a");
    let mut annotations = AnnotationTable::new();
    let candidates = CandidateSource::new().with(SourceKey::Tags, tags);
    let mut controller = CompletionController::default();

    controller
        .on_text_changed(&document, &mut annotations, &Caret::new("b1", 2), &candidates, &NoGeometry)
        .unwrap();

    for _ in 0..tags.len() {
        controller.move_selection(Direction::Down).unwrap();
    }
    assert_eq!(controller.active_match().unwrap().selected(), 0);

    controller.move_selection(Direction::Up).unwrap();
    assert_eq!(controller.active_match().unwrap().selected(), tags.len() - 1);

    let (outcome, caret) = controller
        .handle_key_command(KeyCommand::Commit, &mut document, &mut annotations)
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Handled);
    assert_eq!(document.text("b1").unwrap(), "#a4 ");
    assert_eq!(caret, Some(Caret::new("b1", 4)));
}

// ==================== Annotation lifecycle ====================

#[test]
fn test_apply_range_twice_equals_once() {
    let mut once = AnnotationTable::new();
    let id = once.ensure_filling_range("b1", 4).unwrap();
    once.apply_range("b1", id, Span::new(0, 4)).unwrap();

    let mut twice = once.clone();
    twice.apply_range("b1", id, Span::new(0, 4)).unwrap();

    assert_eq!(once.ranges("b1"), twice.ranges("b1"));
    assert_eq!(once.mode(id), twice.mode(id));
}

#[test]
fn test_submitted_never_returns_to_filling() {
    let mut engine = engine_with(&["tag"], &[], "");
    engine.on_change("b1", "#t", 2).unwrap();
    engine.handle_key_command(KeyCommand::Commit).unwrap();

    // Any caret movement around the committed token keeps it submitted
    for offset in 0..=4 {
        engine.on_change("b1", "#tag ", offset).unwrap();
        assert_eq!(
            engine.decorations("b1").unwrap(),
            vec![Decoration { start: 0, end: 4, mode: AnnotationMode::Submitted }],
            "offset {}",
            offset
        );
    }
}

// ==================== Frozen tokens ====================

#[test]
fn test_frozen_boundary() {
    let mut engine = engine_with(&["tag"], &[], "");
    engine.on_change("b1", "#t", 2).unwrap();
    engine.handle_key_command(KeyCommand::Commit).unwrap();
    assert_eq!(engine.text("b1").unwrap(), "#tag ");

    for offset in 1..=4 {
        assert!(engine.on_change("b1", "#tag ", offset).unwrap().is_none(), "offset {}", offset);
        assert_eq!(engine.key_binding_for(Key::Enter), None);
    }
    assert_eq!(engine.stats().frozen_hits, 4);
}

#[test]
fn test_scanner_reports_frozen_outcome() {
    let document = Document::with_block("b1", "#tag ");
    let mut annotations = AnnotationTable::new();
    let id = annotations.ensure_filling_range("b1", 4).unwrap();
    annotations.apply_range("b1", id, Span::new(0, 4)).unwrap();
    let submitted = annotations.promote(id, "b1", Span::new(0, 4)).unwrap();

    let mut controller = CompletionController::default();
    let outcome = controller
        .on_text_changed(
            &document,
            &mut annotations,
            &Caret::new("b1", 3),
            &CandidateSource::new(),
            &NoGeometry,
        )
        .unwrap();
    assert_eq!(outcome, ScanOutcome::Frozen(submitted));
    assert!(controller.active_match().is_none());
}

// ==================== Commit ====================

#[test]
fn test_commit_hashtag_scenario() {
    let mut engine = engine_with(&["world", "work"], &[], "hello #wo");
    let view = engine.on_change("b1", "hello #wo", 9).unwrap().unwrap();
    assert_eq!(view.trigger, TriggerKind::Hashtag);
    assert_eq!(view.partial, "wo");
    assert_eq!(view.candidates, words(&["work", "world"]));
    assert_eq!(view.selected_index, 0);

    assert_eq!(engine.handle_key_command(KeyCommand::Commit).unwrap(), CommandOutcome::Handled);
    assert_eq!(engine.text("b1").unwrap(), "hello #work ");
    assert_eq!(engine.caret(), Some(&Caret::new("b1", 12)));

    let id = engine.annotations().annotation_at("b1", 6).unwrap();
    assert_eq!(engine.annotations().mode(id).unwrap(), AnnotationMode::Submitted);
    assert_eq!(engine.annotations().annotation_at("b1", 11), None);
}

#[test]
fn test_commit_without_candidates_keeps_partial() {
    let mut engine = engine_with(&["world"], &[], "hello #xy");
    let view = engine.on_change("b1", "hello #xy", 9).unwrap().unwrap();
    assert!(view.candidates.is_empty());

    engine.handle_key_command(KeyCommand::Commit).unwrap();
    assert_eq!(engine.text("b1").unwrap(), "hello #xy ");
    assert_eq!(
        engine.decorations("b1").unwrap(),
        vec![Decoration { start: 6, end: 9, mode: AnnotationMode::Submitted }]
    );
}

// ==================== Space policy ====================

#[test]
fn test_space_commits_hashtag_only() {
    let mut engine = engine_with(&["world"], &["Ada Lovelace"], "");
    engine.on_change("b1", "#w", 2).unwrap();
    assert_eq!(engine.key_binding_for(Key::Space), Some(KeyCommand::Commit));

    engine.on_change("b1", "#w @a", 5).unwrap();
    assert_eq!(engine.key_binding_for(Key::Space), None);

    // Space falls through to the host, which inserts it; the person token keeps matching
    let view = engine.on_change("b1", "#w @ada ", 8).unwrap().unwrap();
    assert_eq!(view.trigger, TriggerKind::Person);
    assert_eq!(view.partial, "ada ");
    assert_eq!(view.candidates, words(&["Ada Lovelace"]));
}

// ==================== Edits & offsets ====================

#[test]
fn test_edits_keep_submitted_tokens_aligned() {
    let mut engine = engine_with(&["rust"], &["Ada Lovelace"], "");
    engine.on_change("b1", "#r", 2).unwrap();
    engine.handle_key_command(KeyCommand::Commit).unwrap();
    assert_eq!(engine.text("b1").unwrap(), "#rust ");

    // Insert text in front of the committed hashtag
    engine.on_change("b1", "see #rust ", 4).unwrap();
    assert_eq!(
        engine.decorations("b1").unwrap(),
        vec![Decoration { start: 4, end: 9, mode: AnnotationMode::Submitted }]
    );

    // Commit a person at the start; the hashtag shifts again
    engine.on_change("b1", "@a see #rust ", 2).unwrap();
    engine.handle_key_command(KeyCommand::Commit).unwrap();
    assert_eq!(engine.text("b1").unwrap(), "@Ada Lovelace  see #rust ");
    assert_eq!(
        engine.decorations("b1").unwrap(),
        vec![
            Decoration { start: 0, end: 13, mode: AnnotationMode::Submitted },
            Decoration { start: 19, end: 24, mode: AnnotationMode::Submitted },
        ]
    );
}

#[test]
fn test_text_edit_between_attributes_to_caret() {
    // Typing a second 'o' in "#wo" is ambiguous; the caret decides
    let edit = TextEdit::between("#wo", "#woo", 4).unwrap();
    assert_eq!(edit, TextEdit { start: 3, old_len: 0, new_len: 1 });
    let edit = TextEdit::between("#wo", "#woo", 3).unwrap();
    assert_eq!(edit, TextEdit { start: 2, old_len: 0, new_len: 1 });
}

#[test]
fn test_utf16_offsets_round_trip() {
    let text = "café 🎉 #wo";
    for offset in 0..=text.chars().count() {
        let utf16 = char_to_utf16_offset(text, offset);
        assert_eq!(utf16_to_char_offset(text, utf16), offset);
    }
    // The emoji is two UTF-16 code units
    assert_eq!(char_to_utf16_offset(text, 7), 8);
}

#[test]
fn test_match_after_non_ascii_text() {
    let mut engine = engine_with(&["world", "work"], &[], "");
    let view = engine.on_change("b1", "café #wo", 8).unwrap().unwrap();
    assert_eq!(view.partial, "wo");
    engine.handle_key_command(KeyCommand::Commit).unwrap();
    assert_eq!(engine.text("b1").unwrap(), "café #work ");
    assert_eq!(engine.caret(), Some(&Caret::new("b1", 11)));
}

#[test]
fn test_multiple_blocks_are_independent() {
    let mut engine = engine_with(&["world"], &[], "#w");
    engine.insert_block("b2", "").unwrap();

    engine.on_change("b1", "#w", 2).unwrap();
    engine.handle_key_command(KeyCommand::Commit).unwrap();

    let view = engine.on_change("b2", "#w", 2).unwrap().unwrap();
    assert_eq!(view.candidates, words(&["world"]));
    assert_eq!(engine.decorations("b2").unwrap()[0].mode, AnnotationMode::Filling);
    assert_eq!(engine.decorations("b1").unwrap()[0].mode, AnnotationMode::Submitted);
}
