use super::*;
use crate::document::model::Word;

fn clip(id: &str, n: usize) -> Clip {
    let words = (0..n)
        .map(|i| Word::new(format!("{id}{i}"), format!("{id}-{i}"), i as f64, i as f64 + 0.5))
        .collect();
    Clip::new(id, "s", words)
}

fn doc() -> (Vec<Clip>, IndexCache) {
    let clips = vec![clip("a", 3), clip("b", 2), clip("c", 3)];
    let index = IndexCache::rebuild(&clips, &BTreeSet::new());
    (clips, index)
}

fn ids(set: &BTreeSet<String>) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}

#[test]
fn priority_order() {
    assert!(WordState::Normal < WordState::Grouped);
    assert!(WordState::Grouped < WordState::Focused);
    assert!(WordState::Focused < WordState::Editing);
}

#[test]
fn can_change_state_respects_priority() {
    let mut sel = SelectionState::new();
    assert!(sel.start_inline_edit("a", "a0"));
    assert_eq!(sel.state_of("a0"), WordState::Editing);
    assert!(!sel.can_change_state("a0", WordState::Grouped));
    assert!(!sel.can_change_state("a0", WordState::Focused));
    assert!(sel.can_change_state("a0", WordState::Editing));
    assert!(sel.can_change_state("a1", WordState::Grouped));
}

#[test]
fn gestures_freeze_state_changes() {
    let mut sel = SelectionState::new();
    sel.set_focused_word("a", "a0");
    assert!(sel.start_word_drag("a0"));
    assert!(!sel.can_change_state("a1", WordState::Editing));
    assert!(!sel.set_focused_word("a", "a1"));
    sel.end_word_drag();

    sel.start_group_selection("a1");
    assert!(!sel.can_change_state("a2", WordState::Focused));
    sel.end_group_selection();
    assert!(sel.can_change_state("a2", WordState::Focused));
}

#[test]
fn drag_requires_focused_or_grouped_word() {
    let mut sel = SelectionState::new();
    assert!(!sel.start_word_drag("a0"));
    sel.toggle_word_in_group("a1");
    assert!(sel.start_word_drag("a1"));
}

#[test]
fn focusing_another_word_ends_inline_edit() {
    let mut sel = SelectionState::new();
    sel.start_inline_edit("a", "a0");
    sel.set_focused_word("a", "a0");
    assert!(sel.editing().is_some());
    sel.set_focused_word("b", "b1");
    assert!(sel.editing().is_none());
    assert_eq!(ids(sel.grouped_words()), vec!["b1"]);
}

#[test]
fn rubber_band_only_extends_while_active() {
    let mut sel = SelectionState::new();
    sel.add_to_group("a0");
    assert!(sel.grouped_words().is_empty());
    sel.start_group_selection("a0");
    sel.add_to_group("a1");
    sel.end_group_selection();
    sel.add_to_group("a2");
    assert_eq!(ids(sel.grouped_words()), vec!["a0", "a1"]);
}

#[test]
fn range_within_one_clip() {
    let (clips, index) = doc();
    let mut sel = SelectionState::new();
    sel.toggle_multi_select_word(&index, "c", "c2");
    assert!(sel.select_word_range(&clips, &index, "c", "c0"));
    assert_eq!(ids(sel.multi_selected_words()), vec!["c0", "c1", "c2"]);
    assert_eq!(ids(sel.multi_selected_clips()), vec!["c"]);
    assert_eq!(sel.anchor(), Some(&WordRef::new("c", "c0")));
}

#[test]
fn range_across_clips_forward_and_backward() {
    let (clips, index) = doc();

    let mut sel = SelectionState::new();
    sel.toggle_multi_select_word(&index, "a", "a1");
    sel.select_word_range(&clips, &index, "c", "c0");
    assert_eq!(
        ids(sel.multi_selected_words()),
        vec!["a1", "a2", "b0", "b1", "c0"]
    );
    assert_eq!(ids(sel.multi_selected_clips()), vec!["a", "b", "c"]);

    let mut sel = SelectionState::new();
    sel.toggle_multi_select_word(&index, "c", "c1");
    sel.select_word_range(&clips, &index, "a", "a2");
    assert_eq!(
        ids(sel.multi_selected_words()),
        vec!["a2", "b0", "b1", "c0", "c1"]
    );
    assert_eq!(sel.focused(), Some(&WordRef::new("a", "a2")));
}

#[test]
fn range_skips_soft_deleted_clips() {
    let clips = vec![clip("a", 3), clip("b", 2), clip("c", 3)];
    let deleted: BTreeSet<String> = ["b".to_string()].into();
    let index = IndexCache::rebuild(&clips, &deleted);
    let mut sel = SelectionState::new();
    sel.toggle_multi_select_word(&index, "a", "a2");
    sel.select_word_range(&clips, &index, "c", "c0");
    assert_eq!(ids(sel.multi_selected_words()), vec!["a2", "c0"]);
}

#[test]
fn range_without_anchor_selects_target_only() {
    let (clips, index) = doc();
    let mut sel = SelectionState::new();
    assert!(sel.select_word_range(&clips, &index, "b", "b1"));
    assert_eq!(ids(sel.multi_selected_words()), vec!["b1"]);
    assert!(!sel.select_word_range(&clips, &index, "a", "b0"));
}

#[test]
fn toggle_removes_clip_only_when_its_last_word_leaves() {
    let (_, index) = doc();
    let mut sel = SelectionState::new();
    sel.toggle_multi_select_word(&index, "a", "a0");
    sel.toggle_multi_select_word(&index, "a", "a1");
    sel.toggle_multi_select_word(&index, "b", "b0");
    assert_eq!(ids(sel.multi_selected_clips()), vec!["a", "b"]);

    sel.toggle_multi_select_word(&index, "a", "a0");
    assert_eq!(ids(sel.multi_selected_clips()), vec!["a", "b"]);
    sel.toggle_multi_select_word(&index, "a", "a1");
    assert_eq!(ids(sel.multi_selected_clips()), vec!["b"]);
    assert_eq!(sel.selected_count(), 1);
}

#[test]
fn toggle_rejects_mismatched_clip() {
    let (_, index) = doc();
    let mut sel = SelectionState::new();
    assert!(!sel.toggle_multi_select_word(&index, "b", "a0"));
    assert_eq!(sel.selected_count(), 0);
}

#[test]
fn select_all_and_group_by_clip() {
    let (clips, index) = doc();
    let mut sel = SelectionState::new();
    sel.select_all_words(&clips, &index);
    assert!(sel.is_all_words_selected(&index));
    assert_eq!(sel.selected_count(), 8);

    sel.toggle_multi_select_word(&index, "b", "b0");
    assert!(!sel.is_all_words_selected(&index));
    let grouped = sel.selected_words_by_clip(&clips, &index);
    assert_eq!(grouped[1], ("b".to_string(), vec!["b1".to_string()]));
}

#[test]
fn retain_existing_drops_dead_references() {
    let (clips, index) = doc();
    let mut sel = SelectionState::new();
    sel.set_focused_word("b", "b0");
    sel.toggle_multi_select_word(&index, "b", "b1");
    sel.toggle_multi_select_word(&index, "c", "c0");

    let remaining = vec![clips[0].clone(), clips[2].clone()];
    let index = IndexCache::rebuild(&remaining, &BTreeSet::new());
    sel.retain_existing(&index);
    assert!(sel.focused().is_none());
    assert_eq!(ids(sel.multi_selected_words()), vec!["c0"]);
    assert_eq!(ids(sel.multi_selected_clips()), vec!["c"]);
    assert_eq!(sel.anchor(), Some(&WordRef::new("c", "c0")));
}
