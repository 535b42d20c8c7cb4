use crate::{document::model::Clip, foundation::core::MIN_WORD_SECS};

/// Proportionally rescale every word of `clip` into `[new_start, new_end]`.
///
/// Each word keeps its relative position within the old clip span, then is clamped into
/// the new span with a minimum width of [`MIN_WORD_SECS`]. Returns `None` when either the
/// old or the new span is not strictly positive.
pub fn rescale_clip_timing(clip: &Clip, new_start: f64, new_end: f64) -> Option<Clip> {
    let old = clip.time_range()?;
    let old_duration = old.end - old.start;
    let new_duration = new_end - new_start;
    if !(old_duration > 0.0 && new_duration > 0.0) || !new_start.is_finite() {
        return None;
    }

    let mut out = clip.clone();
    for w in &mut out.words {
        let rel_start = (w.start - old.start) / old_duration;
        let rel_end = (w.end - old.start) / old_duration;
        let scaled_start = new_start + rel_start * new_duration;
        let scaled_end = new_start + rel_end * new_duration;

        w.start = new_start.max((scaled_end - MIN_WORD_SECS).min(scaled_start));
        w.end = new_end.min((scaled_start + MIN_WORD_SECS).max(scaled_end));
    }
    Some(out)
}

/// Move a clip by `delta` seconds without changing word durations.
pub fn shift_clip_timing(clip: &Clip, delta: f64) -> Clip {
    let mut out = clip.clone();
    for w in &mut out.words {
        w.start += delta;
        w.end += delta;
    }
    for s in &mut out.stickers {
        s.start += delta;
        s.end += delta;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/processor/timing.rs"]
mod tests;
