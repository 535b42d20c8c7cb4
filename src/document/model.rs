use std::collections::HashSet;

use crate::{
    animation::track::AnimationTrack,
    foundation::core::TimeRange,
    foundation::error::{SubcutError, SubcutResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Atomic timed text token; the smallest unit of authoritative timing.
pub struct Word {
    /// Globally unique word id, stable across split/merge.
    pub id: String,
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Recognition confidence, when the word came from speech-to-text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Asset ids mirrored from the track manager.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_assets: Vec<String>,
    /// Mirror of the authoritative per-word track list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animation_tracks: Vec<AnimationTrack>,
}

impl Word {
    pub fn new(id: impl Into<String>, text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start,
            end,
            confidence: None,
            applied_assets: Vec::new(),
            animation_tracks: Vec::new(),
        }
    }

    pub fn timing(&self) -> TimeRange {
        TimeRange::raw(self.start, self.end)
    }

    pub fn duration(&self) -> f64 {
        self.timing().duration()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Clip-local marker derived from an externally managed inserted text.
pub struct Sticker {
    pub id: String,
    /// Copy of the inserted text content.
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Id of the inserted text this sticker projects.
    pub original_inserted_text_id: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Overlay text owned outside the engine; the source of stickers.
pub struct InsertedText {
    pub id: String,
    pub content: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A contiguous subtitle segment with a speaker and an ordered word sequence.
pub struct Clip {
    /// Clip identifier (stable within a project).
    pub id: String,
    #[serde(default)]
    pub speaker: String,
    /// Owned, time-ordered words.
    pub words: Vec<Word>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stickers: Vec<Sticker>,
    /// Space-joined word texts.
    #[serde(default)]
    pub full_text: String,
    /// Display subtitle; kept equal to `full_text` by structural edits.
    #[serde(default)]
    pub subtitle: String,
    /// 1-based display index, renumbered after structural edits.
    #[serde(default)]
    pub timeline: usize,
}

impl Clip {
    /// Build a clip and derive its texts from `words`.
    pub fn new(id: impl Into<String>, speaker: impl Into<String>, words: Vec<Word>) -> Self {
        let mut clip = Self {
            id: id.into(),
            speaker: speaker.into(),
            words,
            stickers: Vec::new(),
            full_text: String::new(),
            subtitle: String::new(),
            timeline: 0,
        };
        clip.rebuild_text();
        clip
    }

    /// Recompute `full_text` and `subtitle` from the words.
    pub fn rebuild_text(&mut self) {
        let text = join_words(&self.words);
        self.subtitle = text.clone();
        self.full_text = text;
    }

    /// Span from the earliest word start to the latest word end.
    pub fn time_range(&self) -> Option<TimeRange> {
        self.words
            .iter()
            .map(Word::timing)
            .reduce(TimeRange::union)
    }

    /// Span from the first word's start to the last word's end, `0.0` when empty.
    pub fn duration(&self) -> f64 {
        match (self.words.first(), self.words.last()) {
            (Some(first), Some(last)) => (last.end - first.start).max(0.0),
            _ => 0.0,
        }
    }

    pub fn word_position(&self, word_id: &str) -> Option<usize> {
        self.words.iter().position(|w| w.id == word_id)
    }

    /// Check per-word timing sanity.
    pub fn validate(&self) -> SubcutResult<()> {
        if self.id.is_empty() {
            return Err(SubcutError::validation("clip id must be non-empty"));
        }
        for w in &self.words {
            if w.id.is_empty() {
                return Err(SubcutError::validation(format!(
                    "clip '{}' has a word with an empty id",
                    self.id
                )));
            }
            TimeRange::new(w.start, w.end).map_err(|e| {
                SubcutError::validation(format!("clip '{}' word '{}': {e}", self.id, w.id))
            })?;
        }
        Ok(())
    }
}

/// Space-join of word texts.
pub fn join_words(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reject clip lists that reuse a clip id or a word id.
pub fn ensure_unique_ids(clips: &[Clip]) -> SubcutResult<()> {
    let mut clip_ids = HashSet::new();
    let mut word_ids = HashSet::new();
    for clip in clips {
        if !clip_ids.insert(clip.id.as_str()) {
            return Err(SubcutError::validation(format!(
                "duplicate clip id '{}'",
                clip.id
            )));
        }
        for w in &clip.words {
            if !word_ids.insert(w.id.as_str()) {
                return Err(SubcutError::validation(format!(
                    "duplicate word id '{}' (clip '{}')",
                    w.id, clip.id
                )));
            }
        }
    }
    Ok(())
}

/// Set `timeline = position + 1` on every clip.
pub fn renumber(clips: &mut [Clip]) {
    for (i, clip) in clips.iter_mut().enumerate() {
        clip.timeline = i + 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
