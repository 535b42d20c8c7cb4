//! Engine configuration, loaded from JSON or defaulted.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    animation::track::Intensity,
    foundation::error::{SubcutError, SubcutResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Layout and duration thresholds used by automatic split/merge.
pub struct ProcessorConfig {
    pub video_width: f64,
    pub video_height: f64,
    /// Font size as a fraction of the video height.
    pub font_size_ratio: f64,
    /// Fraction of the video width reserved on each side.
    pub horizontal_margin: f64,
    /// Short-clip merge threshold when a merge step names none.
    pub min_clip_duration: f64,
    /// Duration split limit when a split step names none.
    pub max_clip_duration: f64,
    /// Whether speaker-run merging is enabled.
    pub merge_same_speaker: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            video_width: 1920.0,
            video_height: 1080.0,
            font_size_ratio: 0.05,
            horizontal_margin: 0.1,
            min_clip_duration: 0.5,
            max_clip_duration: 5.0,
            merge_same_speaker: true,
        }
    }
}

impl ProcessorConfig {
    /// Font size in pixels.
    pub fn font_size_px(&self) -> f64 {
        self.video_height * self.font_size_ratio
    }

    /// Maximum line width in pixels for automatic line breaking.
    ///
    /// Half of the safe-area width, narrowed a further 5% for large fonts, so that
    /// renderer-side wrapping never kicks in.
    pub fn max_line_width_px(&self) -> f64 {
        let safe = self.video_width * (1.0 - 2.0 * self.horizontal_margin);
        let font_adjust = if self.font_size_ratio > 0.06 { 0.95 } else { 1.0 };
        (safe * 0.5 * font_adjust).floor()
    }

    pub fn validate(&self) -> SubcutResult<()> {
        for (name, v) in [
            ("video_width", self.video_width),
            ("video_height", self.video_height),
            ("font_size_ratio", self.font_size_ratio),
            ("min_clip_duration", self.min_clip_duration),
            ("max_clip_duration", self.max_clip_duration),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SubcutError::validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }
        if !(0.0..0.5).contains(&self.horizontal_margin) {
            return Err(SubcutError::validation(format!(
                "horizontal_margin must be in [0, 0.5), got {}",
                self.horizontal_margin
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Minimum intervals between re-entrant sticker operations.
pub struct StickerConfig {
    /// Full sticker re-derivation.
    pub sync_interval_ms: u64,
    /// Single sticker update.
    pub update_interval_ms: u64,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            sync_interval_ms: 100,
            update_interval_ms: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Top-level engine configuration.
pub struct EngineConfig {
    pub processor: ProcessorConfig,
    pub stickers: StickerConfig,
    /// Intensity assigned to newly added tracks.
    pub default_intensity: Intensity,
    /// Per-word timing undo depth.
    pub timing_history_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            processor: ProcessorConfig::default(),
            stickers: StickerConfig::default(),
            default_intensity: Intensity::default(),
            timing_history_depth: 50,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> SubcutResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("load config '{}'", path.display()))
    }

    pub fn validate(&self) -> SubcutResult<()> {
        self.processor.validate()?;
        let i = self.default_intensity;
        if !(i.min.is_finite() && i.max.is_finite()) || i.min > i.max {
            return Err(SubcutError::validation(format!(
                "default_intensity must satisfy min <= max, got [{}, {}]",
                i.min, i.max
            )));
        }
        if self.timing_history_depth == 0 {
            return Err(SubcutError::validation("timing_history_depth must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
