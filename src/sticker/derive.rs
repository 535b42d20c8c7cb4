use std::collections::BTreeSet;

use crate::document::model::{Clip, InsertedText, Sticker};

/// Sticker projected from one inserted text.
pub fn sticker_for(text: &InsertedText) -> Sticker {
    Sticker {
        id: format!("sticker_{}", text.id),
        text: text.content.clone(),
        start: text.start,
        end: text.end,
        original_inserted_text_id: text.id.clone(),
    }
}

/// Slot of the active clip whose word span contains `t`.
///
/// When spans overlap, the clip whose center is closest to `t` wins.
pub fn find_clip_at_time(clips: &[Clip], deleted: &BTreeSet<String>, t: f64) -> Option<usize> {
    clips
        .iter()
        .enumerate()
        .filter(|(_, c)| !deleted.contains(&c.id))
        .filter_map(|(slot, c)| {
            let range = c.time_range()?;
            range
                .contains(t)
                .then(|| (slot, (range.center() - t).abs()))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(slot, _)| slot)
}

/// Recompute every clip's stickers from the inserted texts.
///
/// Existing stickers are discarded; each text lands on the clip playing at its start time
/// and texts outside every clip are dropped. Stickers within a clip are sorted by start.
pub fn derive_stickers(
    clips: &[Clip],
    deleted: &BTreeSet<String>,
    texts: &[InsertedText],
) -> Vec<Clip> {
    let mut out: Vec<Clip> = clips
        .iter()
        .map(|c| Clip {
            stickers: Vec::new(),
            ..c.clone()
        })
        .collect();

    let mut seen = BTreeSet::new();
    for text in texts {
        if !seen.insert(text.id.as_str()) {
            continue;
        }
        if let Some(slot) = find_clip_at_time(clips, deleted, text.start) {
            out[slot].stickers.push(sticker_for(text));
        }
    }
    for clip in &mut out {
        clip.stickers.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
    out
}

/// Refresh text and timing of the sticker projecting `text`; returns whether any matched.
pub fn update_sticker(clips: &mut [Clip], text: &InsertedText) -> bool {
    let mut hit = false;
    for clip in clips.iter_mut() {
        for s in clip
            .stickers
            .iter_mut()
            .filter(|s| s.original_inserted_text_id == text.id)
        {
            s.text = text.content.clone();
            s.start = text.start;
            s.end = text.end;
            hit = true;
        }
        clip.stickers.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
    hit
}

#[cfg(test)]
#[path = "../../tests/unit/sticker/derive.rs"]
mod tests;
