use crate::{
    animation::manager::{BatchSummary, TrackChange, TrackList, TrackManager},
    animation::track::{AssetRef, Intensity, Params, TimeOffset},
    engine::session::Engine,
    events::bus::EngineEvent,
    foundation::core::TimeRange,
    foundation::error::{SubcutError, SubcutResult},
    index::cache::WordEntry,
};

impl Engine {
    /// Bind an asset to a word.
    ///
    /// Without an explicit `offset` the asset plugin's manifest offset is used. New tracks
    /// start from the manifest's default parameters overlaid with autofill values.
    pub fn add_track(
        &mut self,
        word_id: &str,
        asset: &AssetRef,
        offset: Option<TimeOffset>,
    ) -> SubcutResult<TrackChange> {
        self.word_entry(word_id)?;
        let (manifest_offset, defaults) = self.plugin_defaults(asset);
        let entry = self.word_entry(word_id)?;
        let base = entry.word.timing();
        let mut params = defaults;
        params.extend(self.autofill.autofill(&entry, asset));
        let offset = offset.or(manifest_offset);

        self.edit_word_tracks(word_id, |tracks| {
            tracks.add_track(word_id, asset, base, offset, params)
        })
    }

    pub fn remove_track(&mut self, word_id: &str, asset_id: &str) -> SubcutResult<TrackChange> {
        self.edit_word_tracks(word_id, |tracks| tracks.remove_track(word_id, asset_id))
    }

    /// Set an explicit animation window; the stored offset is recomputed against the
    /// word's current timing.
    pub fn update_track_timing(
        &mut self,
        word_id: &str,
        asset_id: &str,
        start: f64,
        end: f64,
    ) -> SubcutResult<TrackChange> {
        let timing = TimeRange::new(start, end)?;
        let base = self.word_entry(word_id)?.word.timing();
        self.edit_word_tracks(word_id, |tracks| {
            tracks.update_track_timing(word_id, asset_id, timing, base)
        })
    }

    /// Merge parameters into a track; rolled back when the scenario refresh fails.
    pub fn update_track_params(
        &mut self,
        word_id: &str,
        asset_id: &str,
        partial: &Params,
    ) -> SubcutResult<TrackChange> {
        self.edit_word_tracks(word_id, |tracks| {
            tracks.update_track_params(word_id, asset_id, partial)
        })
    }

    pub fn update_track_intensity(
        &mut self,
        word_id: &str,
        asset_id: &str,
        intensity: Intensity,
    ) -> SubcutResult<TrackChange> {
        let ordered = intensity.min.is_finite()
            && intensity.max.is_finite()
            && intensity.min <= intensity.max;
        if !ordered {
            return Err(SubcutError::validation(format!(
                "intensity must satisfy min <= max, got [{}, {}]",
                intensity.min, intensity.max
            )));
        }
        self.edit_word_tracks(word_id, |tracks| {
            tracks.update_track_intensity(word_id, asset_id, intensity)
        })
    }

    pub fn set_track_plugin_key(
        &mut self,
        word_id: &str,
        asset_id: &str,
        plugin_key: Option<String>,
    ) -> SubcutResult<TrackChange> {
        self.edit_word_tracks(word_id, |tracks| {
            tracks.set_track_plugin_key(word_id, asset_id, plugin_key)
        })
    }

    /// Remove every track from a word; returns how many were removed.
    pub fn clear_tracks(&mut self, word_id: &str) -> SubcutResult<usize> {
        self.word_entry(word_id)?;
        let snapshot = self.tracks.snapshot(word_id);
        let removed = self.tracks.clear_tracks(word_id);
        if removed > 0 {
            self.commit_track_edit(vec![(word_id.to_string(), snapshot)])?;
        }
        Ok(removed)
    }

    /// Add `asset` to the listed words that lack it and remove it from those that have it.
    ///
    /// Words at capacity are skipped. The batch is all-or-nothing with respect to the
    /// scenario refresh.
    pub fn toggle_animation_for_words(
        &mut self,
        word_ids: &[String],
        asset: &AssetRef,
    ) -> SubcutResult<BatchSummary> {
        let (offset, defaults) = self.plugin_defaults(asset);
        self.index.ensure_fresh(self.document.revision())?;
        let entries = word_ids
            .iter()
            .map(|w| {
                self.index
                    .word_entry(self.document.clips(), w)
                    .ok_or_else(|| SubcutError::not_found(format!("word '{w}'")))
            })
            .collect::<SubcutResult<Vec<WordEntry<'_>>>>()?;

        let snapshots: Vec<_> = word_ids
            .iter()
            .map(|w| (w.clone(), self.tracks.snapshot(w)))
            .collect();
        let summary = self.tracks.toggle_for_words(
            &entries,
            asset,
            offset.as_ref(),
            &defaults,
            self.autofill.as_ref(),
        );
        self.commit_batch(summary, snapshots)
    }

    /// Merge parameters into the `asset_id` track of every listed word.
    pub fn update_params_for_words(
        &mut self,
        word_ids: &[String],
        asset_id: &str,
        partial: &Params,
    ) -> SubcutResult<BatchSummary> {
        self.ensure_words(word_ids)?;
        let snapshots = self.snapshots(word_ids);
        let summary = self.tracks.update_params_for_words(word_ids, asset_id, partial);
        self.commit_batch(summary, snapshots)
    }

    pub fn remove_animation_from_words(
        &mut self,
        word_ids: &[String],
        asset_id: &str,
    ) -> SubcutResult<BatchSummary> {
        self.ensure_words(word_ids)?;
        let snapshots = self.snapshots(word_ids);
        let summary = self.tracks.remove_from_words(word_ids, asset_id);
        self.commit_batch(summary, snapshots)
    }

    /// Re-derive track windows of words whose timing changed, then mirror and refresh.
    pub(crate) fn rebase_words(&mut self, word_ids: &[String]) {
        for word_id in word_ids {
            let Ok(base) = self.word_entry(word_id).map(|e| e.word.timing()) else {
                continue;
            };
            if self.tracks.rebase_word(word_id, base) > 0
                && let Err(err) = self.mirror_word(word_id)
            {
                tracing::warn!(word_id = %word_id, error = %err, "track mirror sync failed");
            }
            self.notify(EngineEvent::ScenarioRefresh {
                word_id: word_id.clone(),
            });
        }
    }

    fn edit_word_tracks(
        &mut self,
        word_id: &str,
        edit: impl FnOnce(&mut TrackManager) -> TrackChange,
    ) -> SubcutResult<TrackChange> {
        self.word_entry(word_id)?;
        let snapshot = self.tracks.snapshot(word_id);
        let change = edit(&mut self.tracks);
        if change.is_change() {
            self.commit_track_edit(vec![(word_id.to_string(), snapshot)])?;
        } else {
            tracing::debug!(word_id, ?change, "track edit left state unchanged");
        }
        Ok(change)
    }

    fn ensure_words(&self, word_ids: &[String]) -> SubcutResult<()> {
        for w in word_ids {
            self.word_entry(w)?;
        }
        Ok(())
    }

    fn snapshots(&self, word_ids: &[String]) -> Vec<(String, Option<TrackList>)> {
        word_ids
            .iter()
            .map(|w| (w.clone(), self.tracks.snapshot(w)))
            .collect()
    }

    fn commit_batch(
        &mut self,
        summary: BatchSummary,
        mut snapshots: Vec<(String, Option<TrackList>)>,
    ) -> SubcutResult<BatchSummary> {
        let changed: Vec<&str> = summary.changed().collect();
        snapshots.retain(|(w, _)| changed.contains(&w.as_str()));
        if !snapshots.is_empty() {
            self.commit_track_edit(snapshots)?;
        }
        Ok(summary)
    }
}
