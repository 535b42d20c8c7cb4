use std::collections::BTreeSet;

use crate::{
    config::ProcessorConfig,
    document::model::{Clip, renumber},
    foundation::error::SubcutResult,
    foundation::ids::IdGenerator,
    processor::measure::{GlyphWidthMeasure, TextMeasure},
    processor::merge::{MergeMode, merge_sequence},
    processor::split::{SplitMode, split_clip},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// One stage of a processing pipeline.
pub enum PipelineStep {
    /// Split every clip (or only the listed ones) with `mode`. Clips with fewer than two
    /// words pass through.
    Split {
        mode: SplitMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        only: Option<BTreeSet<String>>,
    },
    /// Merge the whole sequence with `mode`.
    Merge { mode: MergeMode },
}

/// Split/merge transforms bound to a layout configuration and a text measurer.
pub struct ClipProcessor {
    config: ProcessorConfig,
    measure: Box<dyn TextMeasure>,
}

impl Default for ClipProcessor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

impl ClipProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self::with_measure(config, Box::new(GlyphWidthMeasure::default()))
    }

    pub fn with_measure(config: ProcessorConfig, measure: Box<dyn TextMeasure>) -> Self {
        Self { config, measure }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn split(
        &self,
        clip: &Clip,
        mode: &SplitMode,
        ids: &mut dyn IdGenerator,
    ) -> SubcutResult<Vec<Clip>> {
        split_clip(clip, mode, &self.config, self.measure.as_ref(), ids)
    }

    pub fn merge(
        &self,
        clips: Vec<Clip>,
        mode: &MergeMode,
        ids: &mut dyn IdGenerator,
    ) -> SubcutResult<Vec<Clip>> {
        merge_sequence(clips, mode, &self.config, self.measure.as_ref(), ids)
    }

    /// Run ordered stages as pure transforms, renumbering display indices once at the end.
    ///
    /// Any stage error aborts the whole pipeline; the input is consumed either way, so
    /// callers keep their own copy when they need the original.
    #[tracing::instrument(skip(self, clips, steps, ids), fields(clips = clips.len(), steps = steps.len()))]
    pub fn process_pipeline(
        &self,
        clips: Vec<Clip>,
        steps: &[PipelineStep],
        ids: &mut dyn IdGenerator,
    ) -> SubcutResult<Vec<Clip>> {
        let mut current = clips;
        for step in steps {
            current = match step {
                PipelineStep::Split { mode, only } => {
                    let mut next = Vec::with_capacity(current.len());
                    for clip in current {
                        let selected = only.as_ref().is_none_or(|set| set.contains(&clip.id));
                        if selected && clip.words.len() >= 2 {
                            next.extend(self.split(&clip, mode, ids)?);
                        } else {
                            next.push(clip);
                        }
                    }
                    next
                }
                PipelineStep::Merge { mode } => self.merge(current, mode, ids)?,
            };
        }
        renumber(&mut current);
        Ok(current)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/processor/pipeline.rs"]
mod tests;
