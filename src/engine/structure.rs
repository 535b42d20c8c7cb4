use std::collections::{BTreeSet, HashSet};

use crate::{
    animation::manager::TrackManager,
    document::edit::{move_word, reorder_clips, reorder_words, retokenize_clip},
    document::model::{Clip, ensure_unique_ids},
    document::project::Project,
    engine::session::Engine,
    events::bus::EngineEvent,
    foundation::error::{SubcutError, SubcutResult},
    processor::merge::merge_in_document,
    processor::pipeline::PipelineStep,
    processor::split::SplitMode,
    processor::timing::{rescale_clip_timing, shift_clip_timing},
    selection::state::SelectionState,
    timeline::linearize::Timeline,
};

impl Engine {
    /// Split an active clip in place; returns the ids of the resulting pieces.
    #[tracing::instrument(skip(self, mode))]
    pub fn split_clip(&mut self, clip_id: &str, mode: &SplitMode) -> SubcutResult<Vec<String>> {
        let slot = self.clip_slot(clip_id)?;
        let pieces = self.processor.split(
            &self.document.clips()[slot],
            mode,
            self.ids.as_mut(),
        )?;
        let piece_ids: Vec<String> = pieces.iter().map(|c| c.id.clone()).collect();

        let mut clips = self.document.clips().to_vec();
        clips.splice(slot..=slot, pieces);
        self.replace_clips(clips);
        Ok(piece_ids)
    }

    /// Merge adjacent active clips; returns the merged clip id.
    ///
    /// Fails with [`SubcutError::InvalidRange`] when the clips are not contiguous in active
    /// document order. The document is unchanged on error.
    #[tracing::instrument(skip(self))]
    pub fn merge_clips(&mut self, clip_ids: &[String]) -> SubcutResult<String> {
        self.index.ensure_fresh(self.document.revision())?;
        let clips = merge_in_document(
            self.document.clips(),
            self.document.deleted_clip_ids(),
            clip_ids,
            self.ids.as_mut(),
        )?;
        let before: HashSet<&str> = self
            .document
            .clips()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        let merged_id = clips
            .iter()
            .find(|c| !before.contains(c.id.as_str()))
            .map(|c| c.id.clone())
            .ok_or_else(|| SubcutError::invalid_range("merge produced no new clip"))?;
        self.replace_clips(clips);
        Ok(merged_id)
    }

    /// Proportionally retime a clip's words into `[new_start, new_end]`.
    ///
    /// Returns `false` (and changes nothing) when the old or new span is not positive.
    pub fn update_clip_timing(
        &mut self,
        clip_id: &str,
        new_start: f64,
        new_end: f64,
    ) -> SubcutResult<bool> {
        let slot = self.clip_slot(clip_id)?;
        let Some(rescaled) =
            rescale_clip_timing(&self.document.clips()[slot], new_start, new_end)
        else {
            tracing::debug!(clip_id, new_start, new_end, "retime skipped");
            return Ok(false);
        };
        self.apply_clip_in_place(slot, rescaled);
        Ok(true)
    }

    /// Move a clip's words and stickers by `delta` seconds.
    pub fn shift_clip(&mut self, clip_id: &str, delta: f64) -> SubcutResult<()> {
        if !delta.is_finite() {
            return Err(SubcutError::validation("shift delta must be finite"));
        }
        let slot = self.clip_slot(clip_id)?;
        let shifted = shift_clip_timing(&self.document.clips()[slot], delta);
        self.apply_clip_in_place(slot, shifted);
        Ok(())
    }

    /// Run split/merge stages over the active clips.
    ///
    /// Soft-deleted clips are kept after the processed clips.
    #[tracing::instrument(skip(self, steps), fields(steps = steps.len()))]
    pub fn run_pipeline(&mut self, steps: &[PipelineStep]) -> SubcutResult<()> {
        self.index.ensure_fresh(self.document.revision())?;
        let (active, deleted): (Vec<Clip>, Vec<Clip>) = self
            .document
            .clips()
            .iter()
            .cloned()
            .partition(|c| !self.document.deleted_clip_ids().contains(&c.id));
        let mut clips = self
            .processor
            .process_pipeline(active, steps, self.ids.as_mut())?;
        clips.extend(deleted);
        self.replace_clips(clips);
        Ok(())
    }

    /// Soft-delete an active clip.
    pub fn delete_clip(&mut self, clip_id: &str) -> SubcutResult<()> {
        self.clip_slot(clip_id)?;
        self.document.edit(|p| p.deleted_clip_ids.insert(clip_id.to_string()));
        self.reindex();
        Ok(())
    }

    /// Bring a soft-deleted clip back; `false` when it was not deleted.
    pub fn restore_clip(&mut self, clip_id: &str) -> SubcutResult<bool> {
        if !self.document.clips().iter().any(|c| c.id == clip_id) {
            return Err(SubcutError::not_found(format!("clip '{clip_id}'")));
        }
        if !self.document.project().is_deleted(clip_id) {
            return Ok(false);
        }
        self.document.edit(|p| p.deleted_clip_ids.remove(clip_id));
        self.reindex();
        Ok(true)
    }

    /// Restore every soft-deleted clip; returns how many came back.
    pub fn restore_all_clips(&mut self) -> usize {
        let count = self.document.deleted_clip_ids().len();
        if count > 0 {
            self.document.edit(|p| p.deleted_clip_ids.clear());
            self.reindex();
        }
        count
    }

    /// Replace the restore-to-original snapshot.
    pub fn set_original_clips(&mut self, clips: Vec<Clip>) -> SubcutResult<()> {
        ensure_unique_ids(&clips)?;
        for clip in &clips {
            clip.validate()?;
        }
        self.document.edit(|p| p.original_clips = clips);
        self.reindex();
        Ok(())
    }

    /// Use the current clips as the restore-to-original snapshot.
    pub fn snapshot_original_clips(&mut self) {
        let clips = self.document.clips().to_vec();
        self.document.edit(|p| p.original_clips = clips);
        self.reindex();
    }

    /// Replace the clips with the original snapshot; `false` when there is none.
    ///
    /// Track state is rebuilt from the mirrors stored in the snapshot.
    pub fn restore_original_clips(&mut self) -> bool {
        let originals = self.document.project().original_clips.clone();
        if originals.is_empty() {
            return false;
        }
        let mut tracks =
            TrackManager::from_mirrors(originals.iter().flat_map(|c| &c.words));
        tracks.set_default_intensity(self.config.default_intensity);
        self.tracks = tracks;
        self.replace_clips(originals);
        true
    }

    /// Start over from a new project, hard-dropping every clip of the current one.
    pub fn reset(&mut self, project: Project) -> SubcutResult<()> {
        project.validate()?;
        let mut tracks =
            TrackManager::from_mirrors(project.clips.iter().flat_map(|c| &c.words));
        tracks.set_default_intensity(self.config.default_intensity);
        self.tracks = tracks;
        self.timing_history.clear();
        self.selection = SelectionState::new();
        self.guard.reset();
        self.document.edit(|p| *p = project);
        self.timeline =
            Timeline::from_clips(self.document.clips(), self.document.deleted_clip_ids());
        self.reindex();
        Ok(())
    }

    /// Change one word's text; the clip's derived texts follow.
    pub fn update_word_text(&mut self, word_id: &str, text: &str) -> SubcutResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubcutError::validation("word text must be non-empty"));
        }
        let clip_id = self.word_entry(word_id)?.clip_id.to_string();
        let slot = self.clip_slot(&clip_id)?;
        self.word_mut(word_id)?.text = text.to_string();
        if let Some(clip) = self.document.clip_mut(slot) {
            clip.rebuild_text();
        }
        self.notify(EngineEvent::ScenarioRefresh {
            word_id: word_id.to_string(),
        });
        Ok(())
    }

    /// Re-tokenize a clip from free text, keeping word ids wherever the text matches.
    pub fn update_clip_text(&mut self, clip_id: &str, text: &str) -> SubcutResult<()> {
        if text.trim().is_empty() {
            return Err(SubcutError::validation("clip text must be non-empty"));
        }
        let slot = self.clip_slot(clip_id)?;
        let updated = retokenize_clip(&self.document.clips()[slot], text, self.ids.as_mut());
        let word_ids: Vec<String> = updated.words.iter().map(|w| w.id.clone()).collect();

        let mut clips = self.document.clips().to_vec();
        clips[slot] = updated;
        self.replace_clips(clips);
        self.rebase_words(&word_ids);
        Ok(())
    }

    /// Drag one word onto another inside the same clip.
    pub fn reorder_words_in_clip(
        &mut self,
        clip_id: &str,
        source_word: &str,
        target_word: &str,
    ) -> SubcutResult<()> {
        let slot = self.clip_slot(clip_id)?;
        let updated = reorder_words(&self.document.clips()[slot], source_word, target_word)?;
        let mut clips = self.document.clips().to_vec();
        clips[slot] = updated;
        self.replace_clips(clips);
        Ok(())
    }

    /// Move a word into another active clip at `position` (appended when `None`).
    pub fn move_word_between_clips(
        &mut self,
        source_clip: &str,
        target_clip: &str,
        word_id: &str,
        position: Option<usize>,
    ) -> SubcutResult<()> {
        self.clip_slot(source_clip)?;
        self.clip_slot(target_clip)?;
        let clips = move_word(
            self.document.clips(),
            source_clip,
            target_clip,
            word_id,
            position,
        )?;
        self.replace_clips(clips);
        Ok(())
    }

    /// Drag-reorder clips; a multi-clip selection containing `active` moves as a block.
    ///
    /// A sequential timeline is re-linearized in the new document order.
    pub fn reorder_clips(&mut self, active: &str, over: &str) -> SubcutResult<()> {
        self.clip_slot(active)?;
        self.clip_slot(over)?;
        let selected: BTreeSet<String> = self.selection.multi_selected_clips().clone();
        let clips = reorder_clips(self.document.clips(), active, over, &selected)?;
        self.replace_clips(clips);
        if self.timeline.sequential {
            self.linearize_document_order();
        }
        Ok(())
    }

    /// Remove every multi-selected word and clear the selection; returns how many went.
    ///
    /// Clips left without words are removed from the document.
    pub fn delete_selected_words(&mut self) -> SubcutResult<usize> {
        self.index.ensure_fresh(self.document.revision())?;
        let doomed: HashSet<String> = self
            .selection
            .selected_words_by_clip(self.document.clips(), &self.index)
            .into_iter()
            .flat_map(|(_, ids)| ids)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let mut clips = self.document.clips().to_vec();
        for clip in &mut clips {
            let before = clip.words.len();
            clip.words.retain(|w| !doomed.contains(&w.id));
            if clip.words.len() != before {
                clip.rebuild_text();
            }
        }
        let emptied: Vec<String> = clips
            .iter()
            .filter(|c| c.words.is_empty())
            .map(|c| c.id.clone())
            .collect();
        if !emptied.is_empty() {
            tracing::debug!(clips = ?emptied, "dropping clips emptied by word delete");
            clips.retain(|c| !c.words.is_empty());
        }
        self.replace_clips(clips);
        self.selection.clear_multi_selection();
        self.selection.clear_focus();
        Ok(doomed.len())
    }

    /// Install a clip whose ids are unchanged and follow up on its new word timings.
    fn apply_clip_in_place(&mut self, slot: usize, clip: Clip) {
        let word_ids: Vec<String> = clip.words.iter().map(|w| w.id.clone()).collect();
        if let Some(existing) = self.document.clip_mut(slot) {
            *existing = clip;
        }
        self.timeline
            .sync_with_clips(self.document.clips(), self.document.deleted_clip_ids());
        if self.timeline.sequential {
            self.timeline.recalculate();
        }
        self.notify_timeline();
        self.rebase_words(&word_ids);
    }
}
