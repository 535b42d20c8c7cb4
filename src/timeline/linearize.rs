use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
    document::model::Clip,
    foundation::error::{SubcutError, SubcutResult},
    foundation::ids::IdGenerator,
    timeline::clip::TimelineClip,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Playback timeline: timeline clips plus an explicit play order.
pub struct Timeline {
    pub clips: Vec<TimelineClip>,
    /// Timeline-clip ids in play order.
    pub clip_order: Vec<String>,
    /// Whether start times are derived from `clip_order`.
    pub sequential: bool,
    pub total_duration: f64,
    pub playback_position: f64,
    /// Source span of every projected document clip at the last sync.
    #[serde(skip)]
    source_spans: HashMap<String, (f64, f64)>,
}

impl Timeline {
    /// One subtitle timeline clip per active clip with words, in document order.
    pub fn from_clips(clips: &[Clip], deleted: &BTreeSet<String>) -> Self {
        let clips: Vec<TimelineClip> = clips
            .iter()
            .filter(|c| !deleted.contains(&c.id))
            .filter_map(TimelineClip::from_clip)
            .collect();
        let total_duration = clips.iter().map(TimelineClip::end_time).fold(0.0, f64::max);
        Self {
            clip_order: clips.iter().map(|c| c.id.clone()).collect(),
            source_spans: clips
                .iter()
                .map(|c| (c.source_clip_id.clone(), (c.in_point, c.out_point)))
                .collect(),
            clips,
            sequential: false,
            total_duration,
            playback_position: 0.0,
        }
    }

    pub fn clip(&self, id: &str) -> Option<&TimelineClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Timeline-clip id for a source clip.
    pub fn id_for_source(&self, source_clip_id: &str) -> Option<&str> {
        self.clips
            .iter()
            .find(|c| c.source_clip_id == source_clip_id)
            .map(|c| c.id.as_str())
    }

    /// Lay out clips back to back in `order`.
    ///
    /// Listed clips get running-sum start times and are enabled. Unknown and repeated ids
    /// are ignored. Clips missing from the order are kept, disabled, and parked at the end
    /// of the computed span. Re-running with the same order changes nothing.
    #[tracing::instrument(skip(self, order), fields(order = order.len()))]
    pub fn linearize(&mut self, order: &[String]) {
        let known: HashSet<&str> = self.clips.iter().map(|c| c.id.as_str()).collect();
        let mut seen = HashSet::new();
        let order: Vec<String> = order
            .iter()
            .filter(|id| known.contains(id.as_str()) && seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut by_id: HashMap<String, TimelineClip> = HashMap::with_capacity(self.clips.len());
        let mut rest = Vec::new();
        let in_order: HashSet<&str> = order.iter().map(String::as_str).collect();
        for clip in self.clips.drain(..) {
            if in_order.contains(clip.id.as_str()) {
                by_id.insert(clip.id.clone(), clip);
            } else {
                rest.push(clip);
            }
        }

        let mut cursor = 0.0;
        let mut placed = Vec::with_capacity(order.len() + rest.len());
        for id in &order {
            if let Some(mut clip) = by_id.remove(id) {
                clip.start_time = cursor;
                clip.enabled = true;
                cursor += clip.duration;
                placed.push(clip);
            }
        }
        for mut clip in rest {
            clip.start_time = cursor;
            clip.enabled = false;
            placed.push(clip);
        }

        self.clips = placed;
        self.clip_order = order;
        self.sequential = true;
        self.total_duration = cursor;
        self.playback_position = self.playback_position.clamp(0.0, cursor);
    }

    /// Re-run [`Timeline::linearize`] with the stored order.
    pub fn recalculate(&mut self) {
        let order = self.clip_order.clone();
        self.linearize(&order);
    }

    /// Sum of durations of clips present in the play order.
    pub fn sequential_duration(&self) -> f64 {
        let in_order: HashSet<&str> = self.clip_order.iter().map(String::as_str).collect();
        self.clips
            .iter()
            .filter(|c| in_order.contains(c.id.as_str()))
            .map(|c| c.duration)
            .sum()
    }

    /// Enabled clip playing at `t`.
    pub fn clip_at_time(&self, t: f64) -> Option<&TimelineClip> {
        self.clips.iter().find(|c| c.enabled && c.contains(t))
    }

    /// Move the playhead, clamped to the timeline span.
    pub fn seek(&mut self, t: f64) -> f64 {
        self.playback_position = if t.is_finite() {
            t.clamp(0.0, self.total_duration.max(0.0))
        } else {
            0.0
        };
        self.playback_position
    }

    /// Change a clip's source trim; its duration follows.
    pub fn trim(&mut self, id: &str, in_point: f64, out_point: f64) -> SubcutResult<()> {
        if !(in_point.is_finite() && out_point.is_finite()) || in_point >= out_point {
            return Err(SubcutError::invalid_range(format!(
                "trim [{in_point}, {out_point}] is empty"
            )));
        }
        let clip = self.clip_mut(id)?;
        if clip.locked {
            return Err(SubcutError::validation(format!("timeline clip '{id}' is locked")));
        }
        clip.in_point = in_point;
        clip.out_point = out_point;
        clip.duration = out_point - in_point;
        self.refresh_span();
        Ok(())
    }

    /// Cut a clip at playback time `t`; returns the id of the new right-hand clip.
    pub fn split_at(
        &mut self,
        id: &str,
        t: f64,
        ids: &mut dyn IdGenerator,
    ) -> SubcutResult<String> {
        let pos = self
            .clips
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| SubcutError::not_found(format!("timeline clip '{id}'")))?;
        let left = &mut self.clips[pos];
        if !(t > left.start_time && t < left.end_time()) {
            return Err(SubcutError::invalid_range(format!(
                "split time {t} is outside ({}, {})",
                left.start_time,
                left.end_time()
            )));
        }

        let offset = t - left.start_time;
        let mut right = left.clone();
        right.id = format!("{id}_split_{}", ids.next_id());
        right.in_point = left.in_point + offset;
        right.start_time = t;
        right.duration = left.duration - offset;
        left.out_point = left.in_point + offset;
        left.duration = offset;

        let right_id = right.id.clone();
        self.clips.insert(pos + 1, right);
        if let Some(order_pos) = self.clip_order.iter().position(|o| o == id) {
            self.clip_order.insert(order_pos + 1, right_id.clone());
        }
        self.refresh_span();
        Ok(right_id)
    }

    /// Reconcile with the document after structural edits.
    ///
    /// Trims are kept while their source clip's span is unchanged. When the span moved, every
    /// timeline clip cut from that source (split pieces included) is remapped proportionally
    /// into the new span. Clips whose source is gone are dropped; new source clips are
    /// inserted into the play order right after the timeline entry of the preceding
    /// document clip.
    pub fn sync_with_clips(&mut self, clips: &[Clip], deleted: &BTreeSet<String>) {
        let fresh = Self::from_clips(clips, deleted);
        let fresh_by_source: HashMap<&str, &TimelineClip> = fresh
            .clips
            .iter()
            .map(|c| (c.source_clip_id.as_str(), c))
            .collect();

        let mut kept: Vec<TimelineClip> = Vec::with_capacity(fresh.clips.len());
        for mut clip in self.clips.drain(..) {
            let Some(src) = fresh_by_source.get(clip.source_clip_id.as_str()) else {
                continue;
            };
            let span = (src.in_point, src.out_point);
            let previous = self.source_spans.get(&clip.source_clip_id).copied();
            if previous != Some(span) {
                let in_before = clip.in_point;
                remap_trim(&mut clip, previous, span);
                if !self.sequential {
                    clip.start_time += clip.in_point - in_before;
                }
            }
            kept.push(clip);
        }

        let kept_ids: HashSet<String> = kept.iter().map(|c| c.id.clone()).collect();
        let mut order: Vec<String> = self
            .clip_order
            .iter()
            .filter(|id| kept_ids.contains(*id))
            .cloned()
            .collect();

        let mut previous: Option<String> = None;
        for src in &fresh.clips {
            if !kept.iter().any(|c| c.source_clip_id == src.source_clip_id) {
                let at = previous
                    .as_ref()
                    .and_then(|p| order.iter().position(|o| o == p))
                    .map(|i| i + 1)
                    .unwrap_or(0);
                order.insert(at.min(order.len()), src.id.clone());
                kept.push(src.clone());
            }
            previous = Some(src.id.clone());
        }

        self.clips = kept;
        self.clip_order = order;
        self.source_spans = fresh.source_spans;
        if self.sequential {
            self.recalculate();
        } else {
            self.total_duration = self.clips.iter().map(TimelineClip::end_time).fold(0.0, f64::max);
        }
    }

    fn clip_mut(&mut self, id: &str) -> SubcutResult<&mut TimelineClip> {
        self.clips
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| SubcutError::not_found(format!("timeline clip '{id}'")))
    }

    fn refresh_span(&mut self) {
        if self.sequential {
            self.recalculate();
        } else {
            self.total_duration = self.clips.iter().map(TimelineClip::end_time).fold(0.0, f64::max);
        }
    }
}

/// Map a clip's trim from the `previous` source span into `span`, then clamp it there.
fn remap_trim(clip: &mut TimelineClip, previous: Option<(f64, f64)>, (start, end): (f64, f64)) {
    let end = end.max(start);
    let (in_point, out_point) = match previous {
        Some((old_start, old_end)) if old_end > old_start => {
            let scale = (end - start) / (old_end - old_start);
            (
                start + (clip.in_point - old_start) * scale,
                start + (clip.out_point - old_start) * scale,
            )
        }
        _ => (clip.in_point, clip.out_point),
    };
    clip.in_point = in_point.clamp(start, end);
    clip.out_point = out_point.clamp(clip.in_point, end);
    clip.duration = clip.out_point - clip.in_point;
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/linearize.rs"]
mod tests;
