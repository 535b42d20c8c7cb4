use crate::document::model::Clip;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Track kind a timeline clip plays on.
pub enum TrackKind {
    Video,
    Audio,
    #[default]
    Subtitle,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Playback projection of a [`Clip`].
///
/// `in_point`/`out_point` trim the source range; `start_time`/`duration` place the clip on
/// the playback timeline independently of its source timing.
pub struct TimelineClip {
    pub id: String,
    pub source_clip_id: String,
    /// Source-time trim start in seconds.
    pub in_point: f64,
    /// Source-time trim end in seconds.
    pub out_point: f64,
    /// Playback start in seconds.
    pub start_time: f64,
    /// Playback duration in seconds.
    pub duration: f64,
    #[serde(default)]
    pub track: TrackKind,
    #[serde(default)]
    pub track_index: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_unit")]
    pub volume: f64,
    #[serde(default = "default_unit")]
    pub opacity: f64,
}

fn default_true() -> bool {
    true
}

fn default_unit() -> f64 {
    1.0
}

impl TimelineClip {
    /// Project a subtitle clip; `None` for clips without words.
    pub fn from_clip(clip: &Clip) -> Option<Self> {
        let (first, last) = (clip.words.first()?, clip.words.last()?);
        let duration = (last.end - first.start).max(0.0);
        Some(Self {
            id: format!("timeline_{}", clip.id),
            source_clip_id: clip.id.clone(),
            in_point: first.start,
            out_point: last.end,
            start_time: first.start,
            duration,
            track: TrackKind::Subtitle,
            track_index: 0,
            enabled: true,
            locked: false,
            volume: 1.0,
            opacity: 1.0,
        })
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Half-open containment `[start_time, end_time)`.
    pub fn contains(&self, t: f64) -> bool {
        self.start_time <= t && t < self.end_time()
    }
}
