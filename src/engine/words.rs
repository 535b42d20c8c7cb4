use crate::{
    engine::history::TimingHistory,
    engine::session::Engine,
    foundation::core::TimeRange,
    foundation::error::SubcutResult,
    selection::state::SelectionState,
};

impl Engine {
    /// Set a word's timing and record it in the word's undo history.
    pub fn update_word_timing(&mut self, word_id: &str, start: f64, end: f64) -> SubcutResult<()> {
        let timing = TimeRange::new(start, end)?;
        let current = self.word_entry(word_id)?.word.timing();
        let depth = self.config.timing_history_depth;
        self.timing_history
            .entry(word_id.to_string())
            .or_insert_with(|| TimingHistory::seeded(current))
            .record(timing, depth);
        self.apply_word_timing(word_id, timing)
    }

    /// Step a word back to its previous timing; `false` when there is nothing to undo.
    pub fn undo_word_timing(&mut self, word_id: &str) -> SubcutResult<bool> {
        self.word_entry(word_id)?;
        match self.timing_history.get_mut(word_id).and_then(TimingHistory::undo) {
            Some(timing) => self.apply_word_timing(word_id, timing).map(|()| true),
            None => Ok(false),
        }
    }

    /// Re-apply an undone timing; `false` when there is nothing to redo.
    pub fn redo_word_timing(&mut self, word_id: &str) -> SubcutResult<bool> {
        self.word_entry(word_id)?;
        match self.timing_history.get_mut(word_id).and_then(TimingHistory::redo) {
            Some(timing) => self.apply_word_timing(word_id, timing).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn timing_history(&self, word_id: &str) -> Option<&TimingHistory> {
        self.timing_history.get(word_id)
    }

    fn apply_word_timing(&mut self, word_id: &str, timing: TimeRange) -> SubcutResult<()> {
        let word = self.word_mut(word_id)?;
        word.start = timing.start;
        word.end = timing.end;
        self.timeline
            .sync_with_clips(self.document.clips(), self.document.deleted_clip_ids());
        if self.timeline.sequential {
            self.timeline.recalculate();
        }
        self.notify_timeline();
        self.rebase_words(&[word_id.to_string()]);
        Ok(())
    }

    /// Direct access for selection changes that need no document lookups.
    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn select_word_range(&mut self, clip_id: &str, word_id: &str) -> SubcutResult<bool> {
        self.index.ensure_fresh(self.document.revision())?;
        Ok(self
            .selection
            .select_word_range(self.document.clips(), &self.index, clip_id, word_id))
    }

    pub fn toggle_multi_select_word(
        &mut self,
        clip_id: &str,
        word_id: &str,
    ) -> SubcutResult<bool> {
        self.index.ensure_fresh(self.document.revision())?;
        Ok(self
            .selection
            .toggle_multi_select_word(&self.index, clip_id, word_id))
    }

    pub fn select_all_words(&mut self) -> SubcutResult<()> {
        self.index.ensure_fresh(self.document.revision())?;
        self.selection.select_all_words(self.document.clips(), &self.index);
        Ok(())
    }

    pub fn is_all_words_selected(&self) -> SubcutResult<bool> {
        self.index.ensure_fresh(self.document.revision())?;
        Ok(self.selection.is_all_words_selected(&self.index))
    }

    /// Selected word ids grouped by clip, in document order.
    pub fn selected_words_by_clip(&self) -> SubcutResult<Vec<(String, Vec<String>)>> {
        self.index.ensure_fresh(self.document.revision())?;
        Ok(self
            .selection
            .selected_words_by_clip(self.document.clips(), &self.index))
    }
}
