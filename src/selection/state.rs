//! Focus, grouping, inline-edit and multi-select state over words and clips.

use std::collections::BTreeSet;

use crate::{document::model::Clip, index::cache::IndexCache};

/// Per-word interaction state, ordered by priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WordState {
    #[default]
    Normal,
    Grouped,
    Focused,
    Editing,
}

/// A word together with its owning clip.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WordRef {
    pub clip_id: String,
    pub word_id: String,
}

impl WordRef {
    pub fn new(clip_id: impl Into<String>, word_id: impl Into<String>) -> Self {
        Self {
            clip_id: clip_id.into(),
            word_id: word_id.into(),
        }
    }
}

/// Tracks which words are focused, grouped, edited, and multi-selected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    focused: Option<WordRef>,
    editing: Option<WordRef>,
    grouped: BTreeSet<String>,
    multi_words: BTreeSet<String>,
    /// Always recomputed from `multi_words`.
    multi_clips: BTreeSet<String>,
    /// Last-selected word; the anchor for range selection.
    anchor: Option<WordRef>,
    dragging: bool,
    group_selecting: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<&WordRef> {
        self.focused.as_ref()
    }

    pub fn editing(&self) -> Option<&WordRef> {
        self.editing.as_ref()
    }

    pub fn anchor(&self) -> Option<&WordRef> {
        self.anchor.as_ref()
    }

    pub fn grouped_words(&self) -> &BTreeSet<String> {
        &self.grouped
    }

    pub fn multi_selected_words(&self) -> &BTreeSet<String> {
        &self.multi_words
    }

    pub fn multi_selected_clips(&self) -> &BTreeSet<String> {
        &self.multi_clips
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_group_selecting(&self) -> bool {
        self.group_selecting
    }

    /// Highest-priority state the word currently holds.
    pub fn state_of(&self, word_id: &str) -> WordState {
        if self.editing.as_ref().is_some_and(|r| r.word_id == word_id) {
            WordState::Editing
        } else if self.focused.as_ref().is_some_and(|r| r.word_id == word_id) {
            WordState::Focused
        } else if self.grouped.contains(word_id) {
            WordState::Grouped
        } else {
            WordState::Normal
        }
    }

    /// Whether `word_id` may move to `next`.
    ///
    /// Denied while a drag-reorder or rubber-band gesture is active; otherwise only
    /// transitions to an equal or higher priority are allowed.
    pub fn can_change_state(&self, word_id: &str, next: WordState) -> bool {
        if self.dragging || self.group_selecting {
            return false;
        }
        next >= self.state_of(word_id)
    }

    /// Focus a word; the group collapses to it and any other word leaves inline edit.
    ///
    /// Returns `false` while a gesture is active.
    pub fn set_focused_word(&mut self, clip_id: &str, word_id: &str) -> bool {
        if self.dragging || self.group_selecting {
            tracing::debug!(word_id, "focus change ignored during gesture");
            return false;
        }
        if self.editing.as_ref().is_some_and(|r| r.word_id != word_id) {
            self.editing = None;
        }
        self.focused = Some(WordRef::new(clip_id, word_id));
        self.grouped = BTreeSet::from([word_id.to_string()]);
        true
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
        self.grouped.clear();
    }

    /// Enter inline text editing for a word; editing implies focus.
    pub fn start_inline_edit(&mut self, clip_id: &str, word_id: &str) -> bool {
        if !self.can_change_state(word_id, WordState::Editing) {
            return false;
        }
        let r = WordRef::new(clip_id, word_id);
        self.focused = Some(r.clone());
        self.editing = Some(r);
        true
    }

    pub fn end_inline_edit(&mut self) {
        self.editing = None;
    }

    /// Begin a rubber-band group selection seeded with one word.
    pub fn start_group_selection(&mut self, word_id: &str) {
        self.group_selecting = true;
        self.grouped = BTreeSet::from([word_id.to_string()]);
    }

    /// Extend the active rubber-band selection; ignored when none is active.
    pub fn add_to_group(&mut self, word_id: &str) {
        if self.group_selecting {
            self.grouped.insert(word_id.to_string());
        }
    }

    pub fn end_group_selection(&mut self) {
        self.group_selecting = false;
    }

    pub fn clear_group_selection(&mut self) {
        self.grouped.clear();
        self.group_selecting = false;
    }

    pub fn toggle_word_in_group(&mut self, word_id: &str) {
        if !self.grouped.remove(word_id) {
            self.grouped.insert(word_id.to_string());
        }
    }

    /// Start a drag-reorder; only a focused or grouped word can be picked up.
    pub fn start_word_drag(&mut self, word_id: &str) -> bool {
        let focused = self.focused.as_ref().is_some_and(|r| r.word_id == word_id);
        if !focused && !self.grouped.contains(word_id) {
            return false;
        }
        self.dragging = true;
        true
    }

    pub fn end_word_drag(&mut self) {
        self.dragging = false;
    }

    /// Select the inclusive word range from the anchor to the target.
    ///
    /// Within one clip the contiguous sub-range is selected. Across clips the tail of the
    /// earlier clip, every word of the clips in between and the head of the later clip are
    /// selected, in either direction. Without a usable anchor only the target is selected.
    /// The target becomes the new anchor and the focused word.
    pub fn select_word_range(
        &mut self,
        clips: &[Clip],
        index: &IndexCache,
        target_clip: &str,
        target_word: &str,
    ) -> bool {
        if index.clip_id_for_word(target_word) != Some(target_clip) {
            return false;
        }
        let Some(target_pos) = index.word_position(target_word) else {
            return false;
        };

        let anchor = self.anchor.as_ref().and_then(|a| {
            let clip_pos = index.clip_position(&a.clip_id)?;
            let word_pos = index.word_position(&a.word_id)?;
            (index.clip_id_for_word(&a.word_id) == Some(a.clip_id.as_str()))
                .then_some((a.clip_id.clone(), clip_pos, word_pos))
        });

        let mut selected = BTreeSet::new();
        match anchor {
            None => {
                selected.insert(target_word.to_string());
            }
            Some((anchor_clip, _, anchor_pos)) if anchor_clip == target_clip => {
                let (lo, hi) = (anchor_pos.min(target_pos), anchor_pos.max(target_pos));
                if let Some(ids) = index.word_ids_for_clip(target_clip) {
                    selected.extend(ids[lo..=hi].iter().cloned());
                }
            }
            Some((anchor_clip, anchor_clip_pos, anchor_pos)) => {
                let Some(target_clip_pos) = index.clip_position(target_clip) else {
                    return false;
                };
                let ((first_clip, first_pos), (last_clip, last_pos)) =
                    if anchor_clip_pos < target_clip_pos {
                        ((anchor_clip_pos, anchor_pos), (target_clip_pos, target_pos))
                    } else {
                        ((target_clip_pos, target_pos), (anchor_clip_pos, anchor_pos))
                    };

                let active = clips.iter().filter(|c| index.contains_clip(&c.id));
                for (pos, clip) in active.enumerate() {
                    let ids = clip.words.iter().map(|w| w.id.clone());
                    if pos == first_clip {
                        selected.extend(ids.skip(first_pos));
                    } else if pos == last_clip {
                        selected.extend(ids.take(last_pos + 1));
                    } else if pos > first_clip && pos < last_clip {
                        selected.extend(ids);
                    }
                }
            }
        }

        self.multi_words = selected;
        let target = WordRef::new(target_clip, target_word);
        self.anchor = Some(target.clone());
        self.focused = Some(target);
        self.recompute_clips(index);
        true
    }

    /// Add or remove one word from the multi-selection.
    ///
    /// A clip leaves the multi-selected clip set exactly when none of its words remain.
    pub fn toggle_multi_select_word(
        &mut self,
        index: &IndexCache,
        clip_id: &str,
        word_id: &str,
    ) -> bool {
        if index.clip_id_for_word(word_id) != Some(clip_id) {
            return false;
        }
        if !self.multi_words.remove(word_id) {
            self.multi_words.insert(word_id.to_string());
            self.anchor = Some(WordRef::new(clip_id, word_id));
        }
        self.recompute_clips(index);
        true
    }

    pub fn select_all_words(&mut self, clips: &[Clip], index: &IndexCache) {
        self.multi_words = clips
            .iter()
            .filter(|c| index.contains_clip(&c.id))
            .flat_map(|c| c.words.iter().map(|w| w.id.clone()))
            .collect();
        self.recompute_clips(index);
    }

    pub fn clear_multi_selection(&mut self) {
        self.multi_words.clear();
        self.multi_clips.clear();
        self.anchor = None;
    }

    pub fn is_all_words_selected(&self, index: &IndexCache) -> bool {
        index.word_count() > 0
            && self.multi_words.len() == index.word_count()
            && self.multi_words.iter().all(|w| index.contains_word(w))
    }

    pub fn selected_count(&self) -> usize {
        self.multi_words.len()
    }

    /// Selected word ids grouped by clip, both in document order.
    pub fn selected_words_by_clip(
        &self,
        clips: &[Clip],
        index: &IndexCache,
    ) -> Vec<(String, Vec<String>)> {
        clips
            .iter()
            .filter(|c| index.contains_clip(&c.id) && self.multi_clips.contains(&c.id))
            .map(|c| {
                let ids = c
                    .words
                    .iter()
                    .filter(|w| self.multi_words.contains(&w.id))
                    .map(|w| w.id.clone())
                    .collect();
                (c.id.clone(), ids)
            })
            .collect()
    }

    /// Drop references to words or clips that no longer exist in `index`.
    pub fn retain_existing(&mut self, index: &IndexCache) {
        let alive = |r: &WordRef| index.clip_id_for_word(&r.word_id) == Some(r.clip_id.as_str());
        if self.focused.as_ref().is_some_and(|r| !alive(r)) {
            self.focused = None;
        }
        if self.editing.as_ref().is_some_and(|r| !alive(r)) {
            self.editing = None;
        }
        if self.anchor.as_ref().is_some_and(|r| !alive(r)) {
            self.anchor = None;
        }
        self.grouped.retain(|w| index.contains_word(w));
        self.multi_words.retain(|w| index.contains_word(w));
        self.recompute_clips(index);
    }

    fn recompute_clips(&mut self, index: &IndexCache) {
        self.multi_clips = self
            .multi_words
            .iter()
            .filter_map(|w| index.clip_id_for_word(w))
            .map(str::to_string)
            .collect();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/state.rs"]
mod tests;
