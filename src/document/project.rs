use std::collections::BTreeSet;

use crate::{
    document::model::{Clip, ensure_unique_ids},
    foundation::error::{SubcutError, SubcutResult},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Persisted project shape.
pub struct Project {
    /// Current clips, including soft-deleted ones.
    pub clips: Vec<Clip>,
    /// Restore-to-original snapshot.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub original_clips: Vec<Clip>,
    /// Soft-deleted clip ids; these clips stay in `clips` but are invisible to every
    /// component.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted_clip_ids: BTreeSet<String>,
}

impl Project {
    pub fn new(clips: Vec<Clip>) -> Self {
        Self {
            clips,
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> SubcutResult<Self> {
        let project: Self = serde_json::from_str(s)?;
        project.validate()?;
        Ok(project)
    }

    pub fn to_json_string_pretty(&self) -> SubcutResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate ids and word timings across `clips` and `original_clips`.
    pub fn validate(&self) -> SubcutResult<()> {
        ensure_unique_ids(&self.clips)?;
        ensure_unique_ids(&self.original_clips)?;
        for clip in self.clips.iter().chain(&self.original_clips) {
            clip.validate()?;
        }
        for id in &self.deleted_clip_ids {
            if !self.clips.iter().any(|c| &c.id == id) {
                return Err(SubcutError::validation(format!(
                    "deleted clip id '{id}' does not name a clip"
                )));
            }
        }
        Ok(())
    }

    pub fn is_deleted(&self, clip_id: &str) -> bool {
        self.deleted_clip_ids.contains(clip_id)
    }

    /// Clips that are not soft-deleted, in document order.
    pub fn active_clips(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(|c| !self.is_deleted(&c.id))
    }
}

/// A project plus the revision counter bumped on every structural mutation.
#[derive(Clone, Debug, Default)]
pub struct Document {
    project: Project,
    revision: u64,
}

impl Document {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            revision: 0,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn clips(&self) -> &[Clip] {
        &self.project.clips
    }

    pub fn deleted_clip_ids(&self) -> &BTreeSet<String> {
        &self.project.deleted_clip_ids
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mutate the project in place and bump the revision.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Project) -> R) -> R {
        let out = f(&mut self.project);
        self.revision += 1;
        out
    }

    /// Mutable access to one clip for edits that keep every clip and word id in place.
    ///
    /// The revision is not bumped, so an index built for it stays valid.
    pub fn clip_mut(&mut self, slot: usize) -> Option<&mut Clip> {
        self.project.clips.get_mut(slot)
    }

    /// Slice form of [`Document::clip_mut`] for in-place passes over every clip.
    pub fn clips_mut(&mut self) -> &mut [Clip] {
        &mut self.project.clips
    }

    /// Replace the clip vector wholesale and bump the revision.
    pub fn replace_clips(&mut self, clips: Vec<Clip>) {
        self.edit(|p| {
            p.clips = clips;
            let ids: BTreeSet<&str> = p.clips.iter().map(|c| c.id.as_str()).collect();
            p.deleted_clip_ids.retain(|id| ids.contains(id.as_str()));
        });
    }

    pub fn into_project(self) -> Project {
        self.project
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/project.rs"]
mod tests;
