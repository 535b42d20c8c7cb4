use crate::foundation::core::{MIN_WORD_SECS, TimeRange};

/// Free-form plugin parameters attached to a track.
pub type Params = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Display color of a track; a pure function of its position on the word.
pub enum TrackColor {
    /// Position 0.
    Blue,
    /// Position 1.
    Green,
    /// Position 2.
    Purple,
}

impl TrackColor {
    pub fn for_position(position: usize) -> Self {
        match position {
            0 => Self::Blue,
            1 => Self::Green,
            _ => Self::Purple,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Animation strength bounds.
pub struct Intensity {
    pub min: f64,
    pub max: f64,
}

impl Default for Intensity {
    fn default() -> Self {
        Self { min: 0.3, max: 0.7 }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// One side of a [`TimeOffset`]: absolute seconds, or a percentage of the word duration
/// written as a string such as `"-25%"`.
pub enum OffsetValue {
    /// Offset in seconds.
    Seconds(f64),
    /// Offset as a percentage string of the word duration.
    Percent(String),
}

impl OffsetValue {
    /// Resolve to seconds against the duration of the word the track is bound to.
    ///
    /// Unparseable percentage strings resolve to `0.0`.
    pub fn resolve(&self, word_duration: f64) -> f64 {
        match self {
            Self::Seconds(s) if s.is_finite() => *s,
            Self::Seconds(_) => 0.0,
            Self::Percent(raw) => {
                let trimmed = raw.trim();
                let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
                match number.parse::<f64>() {
                    Ok(pct) if pct.is_finite() => pct / 100.0 * word_duration,
                    _ => {
                        tracing::warn!(offset = %raw, "unparseable percentage offset, using 0");
                        0.0
                    }
                }
            }
        }
    }
}

impl From<f64> for OffsetValue {
    fn from(value: f64) -> Self {
        Self::Seconds(value)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Start/end offset applied to a word's base timing, serialized as a two-element array.
pub struct TimeOffset(pub OffsetValue, pub OffsetValue);

impl TimeOffset {
    pub fn zero() -> Self {
        Self::seconds(0.0, 0.0)
    }

    pub fn seconds(start: f64, end: f64) -> Self {
        Self(OffsetValue::Seconds(start), OffsetValue::Seconds(end))
    }

    /// Resolve both sides to seconds.
    pub fn resolve(&self, word_duration: f64) -> (f64, f64) {
        (self.0.resolve(word_duration), self.1.resolve(word_duration))
    }
}

impl Default for TimeOffset {
    fn default() -> Self {
        Self::zero()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// The animation asset a track binds to a word.
pub struct AssetRef {
    /// Stable asset id; unique per word.
    pub id: String,
    /// Human-readable asset name.
    pub name: String,
    /// Plugin providing the animation, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_key: Option<String>,
}

impl AssetRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plugin_key: None,
        }
    }

    pub fn with_plugin_key(mut self, key: impl Into<String>) -> Self {
        self.plugin_key = Some(key.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// An animation effect bound to one word with its own timing window.
pub struct AnimationTrack {
    pub asset_id: String,
    pub asset_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_key: Option<String>,
    /// Effective animation window in seconds.
    pub timing: TimeRange,
    #[serde(default)]
    pub intensity: Intensity,
    pub color: TrackColor,
    /// Offset from the word's base timing that produced `timing`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<TimeOffset>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: Params,
}

/// Derive the animation window for a word from its base timing and a plugin offset.
///
/// Windows that start before zero are clamped to zero with at least
/// [`MIN_WORD_SECS`] of width. Degenerate windows are replaced by a window of
/// 10–50% of the word duration (capped at 0.5s) centered on the word midpoint.
pub fn derive_window(base: TimeRange, offset: Option<&TimeOffset>) -> TimeRange {
    let duration = base.duration();
    let (off_start, off_end) = offset.map(|o| o.resolve(duration)).unwrap_or((0.0, 0.0));

    let mut start = base.start + off_start;
    let mut end = base.end + off_end;

    if start < 0.0 {
        start = 0.0;
        end = end.max(MIN_WORD_SECS);
    }

    let window = TimeRange::raw(start, end);
    if !window.is_degenerate() {
        return window;
    }

    let center = base.start + duration / 2.0;
    let width = (duration * 0.5).clamp(MIN_WORD_SECS, 0.5);
    tracing::debug!(
        start,
        end,
        center,
        width,
        "degenerate animation window, recentering on word midpoint"
    );
    TimeRange::raw((center - width / 2.0).max(0.0), center + width / 2.0)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/track.rs"]
mod tests;
