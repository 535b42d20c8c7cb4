use std::collections::{BTreeSet, HashMap};

use crate::{
    document::model::{Clip, Word},
    foundation::error::{SubcutError, SubcutResult},
};

/// O(1) lookup maps derived from the active clips of one document revision.
///
/// The cache is a pure function of `(clips, deleted_clip_ids)`: it is only ever produced by
/// [`IndexCache::rebuild`] and never edited in place. Soft-deleted clips are excluded entirely.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexCache {
    revision: u64,
    word_to_clip: HashMap<String, String>,
    word_to_index: HashMap<String, usize>,
    clip_to_words: HashMap<String, Vec<String>>,
    /// Position among active clips.
    clip_to_index: HashMap<String, usize>,
    /// Position in the underlying clip vector, soft-deleted clips included.
    clip_to_slot: HashMap<String, usize>,
}

/// A word resolved through the index together with its owning clip.
#[derive(Clone, Copy, Debug)]
pub struct WordEntry<'a> {
    pub clip_id: &'a str,
    /// Position of the word within its clip.
    pub index: usize,
    pub word: &'a Word,
}

impl IndexCache {
    /// Build the maps for revision `0`.
    pub fn rebuild(clips: &[Clip], deleted: &BTreeSet<String>) -> Self {
        Self::rebuild_at(clips, deleted, 0)
    }

    /// Build the maps and stamp them with the document revision they describe.
    pub fn rebuild_at(clips: &[Clip], deleted: &BTreeSet<String>, revision: u64) -> Self {
        let word_count: usize = clips.iter().map(|c| c.words.len()).sum();
        let mut out = Self {
            revision,
            word_to_clip: HashMap::with_capacity(word_count),
            word_to_index: HashMap::with_capacity(word_count),
            clip_to_words: HashMap::with_capacity(clips.len()),
            clip_to_index: HashMap::with_capacity(clips.len()),
            clip_to_slot: HashMap::with_capacity(clips.len()),
        };

        let active = clips
            .iter()
            .enumerate()
            .filter(|(_, c)| !deleted.contains(&c.id));
        for (clip_index, (slot, clip)) in active.enumerate() {
            out.clip_to_index.insert(clip.id.clone(), clip_index);
            out.clip_to_slot.insert(clip.id.clone(), slot);
            let mut ids = Vec::with_capacity(clip.words.len());
            for (i, w) in clip.words.iter().enumerate() {
                out.word_to_clip.insert(w.id.clone(), clip.id.clone());
                out.word_to_index.insert(w.id.clone(), i);
                ids.push(w.id.clone());
            }
            out.clip_to_words.insert(clip.id.clone(), ids);
        }
        out
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Fail with [`SubcutError::StaleIndex`] unless the cache describes `current`.
    pub fn ensure_fresh(&self, current: u64) -> SubcutResult<()> {
        if self.revision != current {
            return Err(SubcutError::StaleIndex {
                built: self.revision,
                current,
            });
        }
        Ok(())
    }

    pub fn clip_id_for_word(&self, word_id: &str) -> Option<&str> {
        self.word_to_clip.get(word_id).map(String::as_str)
    }

    pub fn word_position(&self, word_id: &str) -> Option<usize> {
        self.word_to_index.get(word_id).copied()
    }

    pub fn word_ids_for_clip(&self, clip_id: &str) -> Option<&[String]> {
        self.clip_to_words.get(clip_id).map(Vec::as_slice)
    }

    /// Position of the clip among active clips.
    pub fn clip_position(&self, clip_id: &str) -> Option<usize> {
        self.clip_to_index.get(clip_id).copied()
    }

    /// Position of the clip in the full clip vector.
    pub fn clip_slot(&self, clip_id: &str) -> Option<usize> {
        self.clip_to_slot.get(clip_id).copied()
    }

    pub fn contains_word(&self, word_id: &str) -> bool {
        self.word_to_clip.contains_key(word_id)
    }

    pub fn contains_clip(&self, clip_id: &str) -> bool {
        self.clip_to_index.contains_key(clip_id)
    }

    pub fn word_count(&self) -> usize {
        self.word_to_clip.len()
    }

    pub fn clip_count(&self) -> usize {
        self.clip_to_index.len()
    }

    /// Compose the maps into `{clip_id, index, word}`.
    ///
    /// Returns `None` on any miss, including when `clips` is not the vector the cache was
    /// built from.
    pub fn word_entry<'a>(&self, clips: &'a [Clip], word_id: &str) -> Option<WordEntry<'a>> {
        let clip_id = self.word_to_clip.get(word_id)?;
        let index = *self.word_to_index.get(word_id)?;
        let slot = *self.clip_to_slot.get(clip_id)?;
        let clip = clips.get(slot)?;
        let word = clip.words.get(index)?;
        if clip.id != *clip_id || word.id != word_id {
            return None;
        }
        Some(WordEntry {
            clip_id: clip.id.as_str(),
            index,
            word,
        })
    }

    /// Resolve an active clip by id.
    pub fn clip<'a>(&self, clips: &'a [Clip], clip_id: &str) -> Option<&'a Clip> {
        let slot = *self.clip_to_slot.get(clip_id)?;
        clips.get(slot).filter(|c| c.id == clip_id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/index/cache.rs"]
mod tests;
