use crate::{
    config::ProcessorConfig,
    document::model::{Clip, Sticker, Word},
    foundation::error::{SubcutError, SubcutResult},
    foundation::ids::IdGenerator,
    processor::measure::TextMeasure,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
/// How to divide a clip.
///
/// Manual positions are always word boundaries: `AtWord(i)` starts the second clip at word
/// `i`. `AtFraction` is converted to the word boundary nearest to that fraction of the
/// clip's time span before splitting.
pub enum SplitMode {
    /// Bisect at `ceil(n / 2)`.
    Half,
    /// Split before word `index`; requires `0 < index < n`.
    AtWord { index: usize },
    /// Split at the word boundary nearest to `fraction` of the clip span; `0 < fraction < 1`.
    AtFraction { fraction: f64 },
    /// Greedy fill of lines up to the configured maximum line width.
    LineBreak,
    /// Even word-count chunks so that no chunk is expected to exceed `max_secs`, or the
    /// configured `max_clip_duration` when unset.
    Duration {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_secs: Option<f64>,
    },
}

impl SplitMode {
    /// Whether the mode may legitimately decide not to split.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::LineBreak | Self::Duration { .. })
    }
}

/// Word indices at which new clips start, strictly increasing and within `1..n`.
pub fn split_boundaries(
    clip: &Clip,
    mode: &SplitMode,
    config: &ProcessorConfig,
    measure: &dyn TextMeasure,
) -> SubcutResult<Vec<usize>> {
    let n = clip.words.len();
    if n < 2 {
        return Err(SubcutError::invalid_range(format!(
            "clip '{}' has {n} word(s); splitting needs at least 2",
            clip.id
        )));
    }

    match *mode {
        SplitMode::Half => Ok(vec![n.div_ceil(2)]),
        SplitMode::AtWord { index } => {
            if index == 0 || index >= n {
                return Err(SubcutError::invalid_range(format!(
                    "split index {index} is outside 1..{n} for clip '{}'",
                    clip.id
                )));
            }
            Ok(vec![index])
        }
        SplitMode::AtFraction { fraction } => {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(SubcutError::invalid_range(format!(
                    "split fraction must be in (0, 1), got {fraction}"
                )));
            }
            Ok(vec![nearest_boundary(&clip.words, fraction)])
        }
        SplitMode::LineBreak => Ok(line_break_boundaries(&clip.words, config, measure)),
        SplitMode::Duration { max_secs } => {
            let max_secs = max_secs.unwrap_or(config.max_clip_duration);
            if !max_secs.is_finite() || max_secs <= 0.0 {
                return Err(SubcutError::validation(format!(
                    "max_secs must be finite and > 0, got {max_secs}"
                )));
            }
            let duration = clip.duration();
            if duration <= max_secs {
                return Ok(Vec::new());
            }
            let target = (duration / max_secs).ceil() as usize;
            let per = n.div_ceil(target.max(1));
            Ok((per..n).step_by(per.max(1)).collect())
        }
    }
}

/// Split a clip into consecutive clips; word timings and ids are carried over verbatim.
///
/// Automatic modes that find nothing to split, including on clips of fewer than two words,
/// return the clip unchanged; a manual mode that yields no boundary is an error.
pub fn split_clip(
    clip: &Clip,
    mode: &SplitMode,
    config: &ProcessorConfig,
    measure: &dyn TextMeasure,
    ids: &mut dyn IdGenerator,
) -> SubcutResult<Vec<Clip>> {
    if mode.is_automatic() && clip.words.len() < 2 {
        return Ok(vec![clip.clone()]);
    }
    let boundaries = split_boundaries(clip, mode, config, measure)?;
    if boundaries.is_empty() {
        if mode.is_automatic() {
            return Ok(vec![clip.clone()]);
        }
        return Err(SubcutError::invalid_range(format!(
            "{mode:?} found no split point in clip '{}'",
            clip.id
        )));
    }

    let mut starts = Vec::with_capacity(boundaries.len() + 1);
    starts.push(0);
    starts.extend(boundaries);

    let mut pieces: Vec<Clip> = starts
        .iter()
        .enumerate()
        .map(|(i, &from)| {
            let to = starts.get(i + 1).copied().unwrap_or(clip.words.len());
            let mut piece = Clip::new(
                format!("{}_split_{}", clip.id, ids.next_id()),
                clip.speaker.clone(),
                clip.words[from..to].to_vec(),
            );
            piece.timeline = clip.timeline;
            piece
        })
        .collect();

    for sticker in &clip.stickers {
        let target = owning_piece(&pieces, sticker);
        pieces[target].stickers.push(sticker.clone());
    }

    tracing::debug!(clip_id = %clip.id, pieces = pieces.len(), "split clip");
    Ok(pieces)
}

fn owning_piece(pieces: &[Clip], sticker: &Sticker) -> usize {
    pieces
        .iter()
        .rposition(|p| p.words.first().is_some_and(|w| w.start <= sticker.start))
        .unwrap_or(0)
}

fn nearest_boundary(words: &[Word], fraction: f64) -> usize {
    let first = words[0].start;
    let last = words[words.len() - 1].end;
    let t = first + (last - first) * fraction;

    (1..words.len())
        .min_by(|&a, &b| {
            let da = (gap_center(words, a) - t).abs();
            let db = (gap_center(words, b) - t).abs();
            da.total_cmp(&db)
        })
        .unwrap_or(1)
}

fn gap_center(words: &[Word], boundary: usize) -> f64 {
    (words[boundary - 1].end + words[boundary].start) / 2.0
}

fn line_break_boundaries(
    words: &[Word],
    config: &ProcessorConfig,
    measure: &dyn TextMeasure,
) -> Vec<usize> {
    let font = config.font_size_px();
    let max_width = config.max_line_width_px();
    let space = measure.width(" ", font);

    let mut out = Vec::new();
    let mut line_width = 0.0;
    let mut line_len = 0usize;
    for (i, w) in words.iter().enumerate() {
        let word_width = measure.width(&w.text, font);
        let gap = if line_len > 0 { space } else { 0.0 };
        let total = line_width + gap + word_width;
        if total > max_width && line_len > 0 {
            out.push(i);
            line_width = word_width;
            line_len = 1;
        } else {
            line_width = total;
            line_len += 1;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/processor/split.rs"]
mod tests;
