use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::{
    animation::track::{
        AnimationTrack, AssetRef, Intensity, Params, TimeOffset, TrackColor, derive_window,
    },
    document::model::Word,
    foundation::core::{MAX_TRACKS_PER_WORD, TimeRange},
    index::cache::WordEntry,
};

/// Inline storage for one word's tracks.
pub type TrackList = SmallVec<[AnimationTrack; MAX_TRACKS_PER_WORD]>;

/// Why a track mutation left state unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The word already carries the maximum number of tracks.
    CapacityExceeded,
    /// The asset is already bound to the word.
    AlreadyPresent,
    /// No track for this asset exists on the word.
    UnknownTrack,
}

/// Outcome of a single-word track mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackChange {
    /// A track was appended at `position`.
    Added { position: usize },
    Removed,
    Updated,
    Unchanged(Rejection),
}

impl TrackChange {
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// Per-word counts produced by batch operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: Vec<String>,
    /// Words left untouched, with the reason.
    pub skipped: Vec<(String, Rejection)>,
}

impl BatchSummary {
    /// Every word id whose tracks changed.
    pub fn changed(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.updated)
            .map(String::as_str)
    }
}

/// Supplies extra default parameters for a newly added track from word/clip context.
pub trait AutofillResolver {
    fn autofill(&self, entry: &WordEntry<'_>, asset: &AssetRef) -> Params;
}

/// Resolver that adds nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAutofill;

impl AutofillResolver for NoAutofill {
    fn autofill(&self, _entry: &WordEntry<'_>, _asset: &AssetRef) -> Params {
        Params::new()
    }
}

/// Authoritative word-id -> track list map.
///
/// Every add/remove recolors the remaining tracks by position, so position 0/1/2 is always
/// blue/green/purple. Words without tracks have no entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackManager {
    tracks: BTreeMap<String, TrackList>,
    default_intensity: Option<Intensity>,
}

impl TrackManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `intensity` instead of [`Intensity::default`] for new tracks.
    pub fn with_default_intensity(intensity: Intensity) -> Self {
        Self {
            tracks: BTreeMap::new(),
            default_intensity: Some(intensity),
        }
    }

    pub fn set_default_intensity(&mut self, intensity: Intensity) {
        self.default_intensity = Some(intensity);
    }

    pub fn tracks(&self, word_id: &str) -> &[AnimationTrack] {
        self.tracks.get(word_id).map(|t| t.as_slice()).unwrap_or(&[])
    }

    pub fn track(&self, word_id: &str, asset_id: &str) -> Option<&AnimationTrack> {
        self.tracks(word_id).iter().find(|t| t.asset_id == asset_id)
    }

    pub fn asset_ids(&self, word_id: &str) -> Vec<String> {
        self.tracks(word_id)
            .iter()
            .map(|t| t.asset_id.clone())
            .collect()
    }

    pub fn has_asset(&self, word_id: &str, asset_id: &str) -> bool {
        self.track(word_id, asset_id).is_some()
    }

    /// Word ids that currently carry at least one track.
    pub fn word_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    /// Bind `asset` to a word.
    ///
    /// No-op when the word already has the asset or is at capacity. The window is derived
    /// from `base` and `offset` via [`derive_window`].
    pub fn add_track(
        &mut self,
        word_id: &str,
        asset: &AssetRef,
        base: TimeRange,
        offset: Option<TimeOffset>,
        params: Params,
    ) -> TrackChange {
        let existing = self.tracks(word_id);
        if existing.iter().any(|t| t.asset_id == asset.id) {
            return TrackChange::Unchanged(Rejection::AlreadyPresent);
        }
        if existing.len() >= MAX_TRACKS_PER_WORD {
            tracing::debug!(word_id, asset_id = %asset.id, "track capacity reached");
            return TrackChange::Unchanged(Rejection::CapacityExceeded);
        }

        let position = existing.len();
        let track = AnimationTrack {
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            plugin_key: asset.plugin_key.clone(),
            timing: derive_window(base, offset.as_ref()),
            intensity: self.default_intensity.unwrap_or_default(),
            color: TrackColor::for_position(position),
            time_offset: offset,
            params,
        };
        self.tracks
            .entry(word_id.to_string())
            .or_default()
            .push(track);
        TrackChange::Added { position }
    }

    /// Unbind an asset and recolor the survivors by their new positions.
    pub fn remove_track(&mut self, word_id: &str, asset_id: &str) -> TrackChange {
        let Some(list) = self.tracks.get_mut(word_id) else {
            return TrackChange::Unchanged(Rejection::UnknownTrack);
        };
        let before = list.len();
        list.retain(|t| t.asset_id != asset_id);
        if list.len() == before {
            return TrackChange::Unchanged(Rejection::UnknownTrack);
        }
        if list.is_empty() {
            self.tracks.remove(word_id);
        } else {
            recolor(list);
        }
        TrackChange::Removed
    }

    /// Set an explicit window and recompute the offset from the word's canonical `base`.
    pub fn update_track_timing(
        &mut self,
        word_id: &str,
        asset_id: &str,
        timing: TimeRange,
        base: TimeRange,
    ) -> TrackChange {
        self.with_track(word_id, asset_id, |t| {
            t.timing = timing;
            t.time_offset = Some(TimeOffset::seconds(
                timing.start - base.start,
                timing.end - base.end,
            ));
        })
    }

    /// Shallow-merge `partial` into the track's parameters.
    pub fn update_track_params(
        &mut self,
        word_id: &str,
        asset_id: &str,
        partial: &Params,
    ) -> TrackChange {
        self.with_track(word_id, asset_id, |t| {
            for (k, v) in partial {
                t.params.insert(k.clone(), v.clone());
            }
        })
    }

    pub fn update_track_intensity(
        &mut self,
        word_id: &str,
        asset_id: &str,
        intensity: Intensity,
    ) -> TrackChange {
        self.with_track(word_id, asset_id, |t| t.intensity = intensity)
    }

    pub fn set_track_plugin_key(
        &mut self,
        word_id: &str,
        asset_id: &str,
        plugin_key: Option<String>,
    ) -> TrackChange {
        self.with_track(word_id, asset_id, |t| t.plugin_key = plugin_key)
    }

    /// Re-derive every window of a word from a new base timing and each track's stored
    /// offset; returns how many tracks moved.
    pub fn rebase_word(&mut self, word_id: &str, base: TimeRange) -> usize {
        let Some(list) = self.tracks.get_mut(word_id) else {
            return 0;
        };
        for t in list.iter_mut() {
            t.timing = derive_window(base, t.time_offset.as_ref());
        }
        list.len()
    }

    /// Remove every track from a word; returns how many were removed.
    pub fn clear_tracks(&mut self, word_id: &str) -> usize {
        self.tracks.remove(word_id).map(|l| l.len()).unwrap_or(0)
    }

    /// Copy of a word's tracks for later [`TrackManager::restore`].
    pub fn snapshot(&self, word_id: &str) -> Option<TrackList> {
        self.tracks.get(word_id).cloned()
    }

    /// Put back a snapshot taken with [`TrackManager::snapshot`].
    pub fn restore(&mut self, word_id: &str, snapshot: Option<TrackList>) {
        match snapshot {
            Some(list) if !list.is_empty() => {
                self.tracks.insert(word_id.to_string(), list);
            }
            _ => {
                self.tracks.remove(word_id);
            }
        }
    }

    /// Add `asset` to words that lack it and remove it from words that have it.
    ///
    /// New tracks get `defaults` overlaid with the resolver's autofill values. Words at
    /// capacity are skipped.
    pub fn toggle_for_words(
        &mut self,
        targets: &[WordEntry<'_>],
        asset: &AssetRef,
        offset: Option<&TimeOffset>,
        defaults: &Params,
        autofill: &dyn AutofillResolver,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for entry in targets {
            let word_id = entry.word.id.as_str();
            if self.has_asset(word_id, &asset.id) {
                self.remove_track(word_id, &asset.id);
                summary.removed.push(word_id.to_string());
                continue;
            }
            let mut params = defaults.clone();
            params.extend(autofill.autofill(entry, asset));
            match self.add_track(
                word_id,
                asset,
                entry.word.timing(),
                offset.cloned(),
                params,
            ) {
                TrackChange::Added { .. } => summary.added.push(word_id.to_string()),
                TrackChange::Unchanged(why) => summary.skipped.push((word_id.to_string(), why)),
                _ => {}
            }
        }
        summary
    }

    /// Merge `partial` into the `asset_id` track of every listed word.
    pub fn update_params_for_words(
        &mut self,
        word_ids: &[String],
        asset_id: &str,
        partial: &Params,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for w in word_ids {
            match self.update_track_params(w, asset_id, partial) {
                TrackChange::Unchanged(why) => summary.skipped.push((w.clone(), why)),
                _ => summary.updated.push(w.clone()),
            }
        }
        summary
    }

    pub fn remove_from_words(&mut self, word_ids: &[String], asset_id: &str) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for w in word_ids {
            match self.remove_track(w, asset_id) {
                TrackChange::Unchanged(why) => summary.skipped.push((w.clone(), why)),
                _ => summary.removed.push(w.clone()),
            }
        }
        summary
    }

    /// Drop tracks of words for which `keep` returns `false`.
    pub fn retain_words(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|w, _| keep(w));
        before - self.tracks.len()
    }

    /// Write `applied_assets` and `animation_tracks` into a word.
    pub fn mirror_into(&self, word: &mut Word) {
        let tracks = self.tracks(&word.id);
        word.applied_assets = tracks.iter().map(|t| t.asset_id.clone()).collect();
        word.animation_tracks = tracks.to_vec();
    }

    /// Rebuild the map from the mirrors stored on words, e.g. after loading a project.
    pub fn from_mirrors<'a>(words: impl IntoIterator<Item = &'a Word>) -> Self {
        let mut out = Self::new();
        for w in words {
            let mut list: TrackList = w
                .animation_tracks
                .iter()
                .take(MAX_TRACKS_PER_WORD)
                .cloned()
                .collect();
            if list.is_empty() {
                continue;
            }
            recolor(&mut list);
            out.tracks.insert(w.id.clone(), list);
        }
        out
    }

    fn with_track(
        &mut self,
        word_id: &str,
        asset_id: &str,
        f: impl FnOnce(&mut AnimationTrack),
    ) -> TrackChange {
        let track = self
            .tracks
            .get_mut(word_id)
            .and_then(|l| l.iter_mut().find(|t| t.asset_id == asset_id));
        match track {
            Some(t) => {
                f(t);
                TrackChange::Updated
            }
            None => TrackChange::Unchanged(Rejection::UnknownTrack),
        }
    }
}

fn recolor(list: &mut TrackList) {
    for (i, t) in list.iter_mut().enumerate() {
        t.color = TrackColor::for_position(i);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/manager.rs"]
mod tests;
