use std::collections::{BTreeSet, HashSet};

use crate::{
    config::ProcessorConfig,
    document::model::{Clip, join_words},
    foundation::error::{SubcutError, SubcutResult},
    foundation::ids::IdGenerator,
    processor::measure::TextMeasure,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
/// How to combine clips.
pub enum MergeMode {
    /// Concatenate every input clip into one.
    Manual,
    /// Fold consecutive clips shorter than `min_secs` of the same speaker together; unset
    /// means the configured `min_clip_duration`.
    ShortClips {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_secs: Option<f64>,
    },
    /// Merge runs of the same speaker while the combined line fits the maximum width.
    BySpeaker,
}

/// Concatenate clips in input order into a single clip.
///
/// Word ids and timings are kept; the speaker and display index come from the first clip.
pub fn merge_clips(clips: &[Clip], ids: &mut dyn IdGenerator) -> SubcutResult<Clip> {
    let Some(first) = clips.first() else {
        return Err(SubcutError::invalid_range("merge needs at least one clip"));
    };
    if clips.len() == 1 {
        return Ok(first.clone());
    }

    let words: Vec<_> = clips.iter().flat_map(|c| c.words.iter().cloned()).collect();
    let mut stickers: Vec<_> = clips.iter().flat_map(|c| c.stickers.iter().cloned()).collect();
    stickers.sort_by(|a, b| a.start.total_cmp(&b.start));

    let text = join_words(&words);
    Ok(Clip {
        id: format!("merged_{}", ids.next_id()),
        speaker: first.speaker.clone(),
        words,
        stickers,
        full_text: text.clone(),
        subtitle: text,
        timeline: first.timeline,
    })
}

/// Merge the clips named by `selected` inside a document.
///
/// The selection must name at least two distinct active clips that are adjacent in active
/// document order. The merged clip takes the position of the earliest selected clip.
/// Soft-deleted clips between the selection are skipped over and kept.
pub fn merge_in_document(
    clips: &[Clip],
    deleted: &BTreeSet<String>,
    selected: &[String],
    ids: &mut dyn IdGenerator,
) -> SubcutResult<Vec<Clip>> {
    let wanted: HashSet<&str> = selected.iter().map(String::as_str).collect();
    if wanted.len() < 2 {
        return Err(SubcutError::invalid_range(
            "merge needs at least two distinct clips",
        ));
    }

    let active: Vec<(usize, &Clip)> = clips
        .iter()
        .enumerate()
        .filter(|(_, c)| !deleted.contains(&c.id))
        .collect();

    let positions: Vec<usize> = active
        .iter()
        .enumerate()
        .filter(|(_, (_, c))| wanted.contains(c.id.as_str()))
        .map(|(pos, _)| pos)
        .collect();
    if positions.len() != wanted.len() {
        let missing: Vec<&str> = wanted
            .iter()
            .copied()
            .filter(|id| !active.iter().any(|(_, c)| c.id == *id))
            .collect();
        return Err(SubcutError::not_found(format!(
            "clips not in the active document: {}",
            missing.join(", ")
        )));
    }
    if positions.windows(2).any(|w| w[1] != w[0] + 1) {
        return Err(SubcutError::invalid_range(format!(
            "clips [{}] are not contiguous",
            selected.join(", ")
        )));
    }

    let chosen: Vec<Clip> = positions.iter().map(|&p| active[p].1.clone()).collect();
    let merged = merge_clips(&chosen, ids)?;
    let first_slot = active[positions[0]].0;

    let mut out = Vec::with_capacity(clips.len() + 1 - chosen.len());
    for (slot, clip) in clips.iter().enumerate() {
        if slot == first_slot {
            out.push(merged.clone());
        } else if !wanted.contains(clip.id.as_str()) || deleted.contains(&clip.id) {
            out.push(clip.clone());
        }
    }
    Ok(out)
}

/// Apply an automatic (or whole-list manual) merge over a clip sequence.
pub fn merge_sequence(
    clips: Vec<Clip>,
    mode: &MergeMode,
    config: &ProcessorConfig,
    measure: &dyn TextMeasure,
    ids: &mut dyn IdGenerator,
) -> SubcutResult<Vec<Clip>> {
    match mode {
        MergeMode::Manual => {
            if clips.is_empty() {
                return Ok(clips);
            }
            Ok(vec![merge_clips(&clips, ids)?])
        }
        MergeMode::ShortClips { min_secs } => {
            let min_secs = min_secs.unwrap_or(config.min_clip_duration);
            if !min_secs.is_finite() || min_secs <= 0.0 {
                return Err(SubcutError::validation(format!(
                    "min_secs must be finite and > 0, got {min_secs}"
                )));
            }
            merge_short(clips, min_secs, ids)
        }
        MergeMode::BySpeaker => {
            if !config.merge_same_speaker {
                return Ok(clips);
            }
            merge_by_speaker(clips, config, measure, ids)
        }
    }
}

fn merge_short(
    clips: Vec<Clip>,
    min_secs: f64,
    ids: &mut dyn IdGenerator,
) -> SubcutResult<Vec<Clip>> {
    let mut out = Vec::with_capacity(clips.len());
    let mut buffer: Vec<Clip> = Vec::new();

    for clip in clips {
        if buffer.first().is_some_and(|b| b.speaker != clip.speaker) {
            out.push(merge_clips(&std::mem::take(&mut buffer), ids)?);
        }
        if clip.duration() < min_secs {
            buffer.push(clip);
        } else {
            if !buffer.is_empty() {
                out.push(merge_clips(&std::mem::take(&mut buffer), ids)?);
            }
            out.push(clip);
        }
    }
    if !buffer.is_empty() {
        out.push(merge_clips(&buffer, ids)?);
    }
    Ok(out)
}

fn merge_by_speaker(
    clips: Vec<Clip>,
    config: &ProcessorConfig,
    measure: &dyn TextMeasure,
    ids: &mut dyn IdGenerator,
) -> SubcutResult<Vec<Clip>> {
    let font = config.font_size_px();
    let max_width = config.max_line_width_px();
    let space = measure.width(" ", font);

    let mut out = Vec::with_capacity(clips.len());
    let mut buffer: Vec<Clip> = Vec::new();
    let mut buffer_width = 0.0;

    for clip in clips {
        let width = measure.width(&join_words(&clip.words), font);
        let same_speaker = buffer.first().is_some_and(|b| b.speaker == clip.speaker);
        if same_speaker && buffer_width + space + width <= max_width {
            buffer_width += space + width;
            buffer.push(clip);
            continue;
        }
        if !buffer.is_empty() {
            out.push(merge_clips(&std::mem::take(&mut buffer), ids)?);
        }
        buffer_width = width;
        buffer.push(clip);
    }
    if !buffer.is_empty() {
        out.push(merge_clips(&buffer, ids)?);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/processor/merge.rs"]
mod tests;
