use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::{
    animation::manager::{AutofillResolver, NoAutofill, TrackList, TrackManager},
    animation::track::{AssetRef, Params, TimeOffset},
    config::EngineConfig,
    document::model::{Clip, Word, renumber},
    document::project::{Document, Project},
    engine::history::TimingHistory,
    events::bus::{EngineEvent, EngineListener, EventBus, ListenerId},
    foundation::error::{SubcutError, SubcutResult},
    foundation::ids::{IdGenerator, UuidIdGen},
    index::cache::{IndexCache, WordEntry},
    manifest::loader::{ManifestLoader, ManifestSource},
    processor::measure::TextMeasure,
    processor::pipeline::ClipProcessor,
    selection::state::SelectionState,
    sticker::guard::{Clock, GuardedOp, ReentrancyGuard, SystemClock},
    timeline::linearize::Timeline,
};

/// Editing engine over one owned document.
///
/// Every structural edit goes through [`Engine`], which bumps the document revision,
/// rebuilds the index, prunes selection/track/history state of vanished words, re-syncs
/// the timeline and announces the change to listeners.
pub struct Engine {
    pub(crate) document: Document,
    pub(crate) index: IndexCache,
    pub(crate) selection: SelectionState,
    pub(crate) tracks: TrackManager,
    pub(crate) timeline: Timeline,
    pub(crate) processor: ClipProcessor,
    pub(crate) events: EventBus,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) ids: Box<dyn IdGenerator>,
    pub(crate) manifests: ManifestLoader,
    pub(crate) autofill: Box<dyn AutofillResolver>,
    pub(crate) timing_history: HashMap<String, TimingHistory>,
    pub(crate) config: EngineConfig,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("revision", &self.document.revision())
            .field("clips", &self.document.clips().len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Take ownership of a validated project.
    ///
    /// The track map is rebuilt from the per-word mirrors stored in the project.
    pub fn new(project: Project, config: EngineConfig) -> SubcutResult<Self> {
        config.validate()?;
        project.validate()?;

        let mut tracks = TrackManager::from_mirrors(project.clips.iter().flat_map(|c| &c.words));
        tracks.set_default_intensity(config.default_intensity);
        let document = Document::new(project);
        let index = IndexCache::rebuild_at(
            document.clips(),
            document.deleted_clip_ids(),
            document.revision(),
        );
        let timeline = Timeline::from_clips(document.clips(), document.deleted_clip_ids());
        let guard = ReentrancyGuard::new()
            .with_interval(
                GuardedOp::SyncStickers,
                Duration::from_millis(config.stickers.sync_interval_ms),
            )
            .with_interval(
                GuardedOp::UpdateSticker,
                Duration::from_millis(config.stickers.update_interval_ms),
            );

        Ok(Self {
            document,
            index,
            selection: SelectionState::new(),
            tracks,
            timeline,
            processor: ClipProcessor::new(config.processor.clone()),
            events: EventBus::new(),
            guard,
            clock: Box::new(SystemClock::default()),
            ids: Box::new(UuidIdGen),
            manifests: ManifestLoader::default(),
            autofill: Box::new(NoAutofill),
            timing_history: HashMap::new(),
            config,
        })
    }

    /// Parse, validate and open a project JSON document.
    pub fn from_json_str(s: &str, config: EngineConfig) -> SubcutResult<Self> {
        Self::new(Project::from_json_str(s)?, config)
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_manifest_source(mut self, source: impl ManifestSource + 'static) -> Self {
        let source: Box<dyn ManifestSource> = Box::new(source);
        self.manifests = ManifestLoader::new(source);
        self
    }

    pub fn with_autofill(mut self, autofill: impl AutofillResolver + 'static) -> Self {
        self.autofill = Box::new(autofill);
        self
    }

    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.processor = ClipProcessor::with_measure(self.config.processor.clone(), measure);
        self
    }

    pub fn subscribe(&mut self, listener: impl EngineListener + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn project(&self) -> &Project {
        self.document.project()
    }

    pub fn clips(&self) -> &[Clip] {
        self.document.clips()
    }

    /// Clips that are not soft-deleted, in document order.
    pub fn active_clips(&self) -> impl Iterator<Item = &Clip> {
        self.document.project().active_clips()
    }

    pub fn revision(&self) -> u64 {
        self.document.revision()
    }

    pub fn index(&self) -> &IndexCache {
        &self.index
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn tracks(&self) -> &TrackManager {
        &self.tracks
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn manifests_mut(&mut self) -> &mut ManifestLoader {
        &mut self.manifests
    }

    /// Close the engine and hand back the persisted shape.
    pub fn into_project(self) -> Project {
        self.document.into_project()
    }

    /// Resolve a word through the index, verifying the index is current.
    pub fn word_entry(&self, word_id: &str) -> SubcutResult<WordEntry<'_>> {
        self.index.ensure_fresh(self.document.revision())?;
        self.index
            .word_entry(self.document.clips(), word_id)
            .ok_or_else(|| SubcutError::not_found(format!("word '{word_id}'")))
    }

    /// Slot of an active clip in the clip vector.
    pub(crate) fn clip_slot(&self, clip_id: &str) -> SubcutResult<usize> {
        self.index.ensure_fresh(self.document.revision())?;
        self.index
            .clip_slot(clip_id)
            .ok_or_else(|| SubcutError::not_found(format!("clip '{clip_id}'")))
    }

    pub(crate) fn word_mut(&mut self, word_id: &str) -> SubcutResult<&mut Word> {
        locate_word(&self.index, &mut self.document, word_id)
    }

    /// Install a new clip vector and bring every derived structure up to date.
    #[tracing::instrument(skip(self, clips), fields(clips = clips.len()))]
    pub(crate) fn replace_clips(&mut self, mut clips: Vec<Clip>) {
        renumber(&mut clips);
        self.document.replace_clips(clips);
        self.reindex();
    }

    /// Rebuild the index for the current revision and prune state that refers to words
    /// no longer in the document.
    pub(crate) fn reindex(&mut self) {
        let revision = self.document.revision();
        self.index = IndexCache::rebuild_at(
            self.document.clips(),
            self.document.deleted_clip_ids(),
            revision,
        );
        self.selection.retain_existing(&self.index);

        let known: HashSet<&str> = self
            .document
            .clips()
            .iter()
            .flat_map(|c| c.words.iter().map(|w| w.id.as_str()))
            .collect();
        let dropped = self.tracks.retain_words(|w| known.contains(w));
        self.timing_history.retain(|w, _| known.contains(w.as_str()));
        if dropped > 0 {
            tracing::debug!(dropped, "dropped tracks of removed words");
        }

        self.timeline
            .sync_with_clips(self.document.clips(), self.document.deleted_clip_ids());
        self.notify(EngineEvent::ClipsReplaced { revision });
        self.notify_timeline();
    }

    /// Deliver an informational event; failures are logged by the bus and otherwise ignored.
    pub(crate) fn notify(&mut self, event: EngineEvent) {
        let _ = self.events.emit(&event);
    }

    pub(crate) fn notify_timeline(&mut self) {
        let total_duration = self.timeline.total_duration;
        self.notify(EngineEvent::TimelineChanged { total_duration });
    }

    /// Ask listeners to regenerate a word's scenario.
    pub(crate) fn refresh_word(&mut self, word_id: &str) -> anyhow::Result<()> {
        let report = self.events.emit(&EngineEvent::ScenarioRefresh {
            word_id: word_id.to_string(),
        });
        match report.failures.into_iter().next() {
            Some((_, err)) => Err(err.context(format!("scenario refresh for word '{word_id}'"))),
            None => Ok(()),
        }
    }

    /// Write a word's tracks into its clip data and announce it.
    pub(crate) fn mirror_word(&mut self, word_id: &str) -> SubcutResult<()> {
        let word = locate_word(&self.index, &mut self.document, word_id)?;
        self.tracks.mirror_into(word);
        self.notify(EngineEvent::TracksMirrored {
            word_id: word_id.to_string(),
        });
        Ok(())
    }

    /// Finish a track mutation across `snapshots`' words.
    ///
    /// A failing scenario refresh restores every snapshot and fails the whole edit; words
    /// already refreshed with the discarded state are refreshed again with the restored one.
    /// A failing mirror write is logged and the edit is kept.
    pub(crate) fn commit_track_edit(
        &mut self,
        snapshots: Vec<(String, Option<TrackList>)>,
    ) -> SubcutResult<()> {
        for (pos, (word_id, _)) in snapshots.iter().enumerate() {
            if let Err(err) = self.refresh_word(word_id) {
                tracing::warn!(word_id = %word_id, error = %err, "rolling back track edit");
                let refreshed: Vec<String> =
                    snapshots[..=pos].iter().map(|(w, _)| w.clone()).collect();
                for (w, snapshot) in snapshots {
                    self.tracks.restore(&w, snapshot);
                }
                for w in &refreshed {
                    if let Err(err) = self.refresh_word(w) {
                        tracing::warn!(word_id = %w, error = %err, "refresh after rollback failed");
                    }
                }
                return Err(SubcutError::Other(err));
            }
        }
        for (word_id, _) in &snapshots {
            if let Err(err) = self.mirror_word(word_id) {
                tracing::warn!(word_id = %word_id, error = %err, "track mirror sync failed");
            }
        }
        Ok(())
    }

    /// Manifest-declared offset and default parameters for an asset's plugin.
    pub(crate) fn plugin_defaults(&mut self, asset: &AssetRef) -> (Option<TimeOffset>, Params) {
        match &asset.plugin_key {
            Some(key) => (
                Some(self.manifests.time_offset(key)),
                self.manifests.default_params(key),
            ),
            None => (None, Params::new()),
        }
    }
}

fn locate_word<'a>(
    index: &IndexCache,
    document: &'a mut Document,
    word_id: &str,
) -> SubcutResult<&'a mut Word> {
    index.ensure_fresh(document.revision())?;
    let missing = || SubcutError::not_found(format!("word '{word_id}'"));
    let clip_id = index.clip_id_for_word(word_id).ok_or_else(missing)?;
    let slot = index.clip_slot(clip_id).ok_or_else(missing)?;
    let pos = index.word_position(word_id).ok_or_else(missing)?;
    document
        .clip_mut(slot)
        .and_then(|c| c.words.get_mut(pos))
        .filter(|w| w.id == word_id)
        .ok_or_else(missing)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/session.rs"]
mod tests;
