use crate::foundation::error::{SubcutError, SubcutResult};

/// Maximum number of animation tracks a single word may carry.
pub const MAX_TRACKS_PER_WORD: usize = 3;

/// Minimum width, in seconds, of a word after a timing rescale.
pub const MIN_WORD_SECS: f64 = 0.1;

/// Windows narrower than this are treated as degenerate.
pub const DEGENERATE_WINDOW_SECS: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Closed time interval `[start, end]` in seconds.
pub struct TimeRange {
    /// Interval start in seconds.
    pub start: f64,
    /// Interval end in seconds.
    pub end: f64,
}

impl TimeRange {
    /// Build a range, rejecting non-finite bounds and `start > end`.
    pub fn new(start: f64, end: f64) -> SubcutResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SubcutError::validation(format!(
                "time range bounds must be finite, got [{start}, {end}]"
            )));
        }
        if start > end {
            return Err(SubcutError::validation(format!(
                "time range start must be <= end, got [{start}, {end}]"
            )));
        }
        Ok(Self { start, end })
    }

    /// Build a range without validation.
    pub const fn raw(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Width of the range, never negative.
    pub fn duration(self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn center(self) -> f64 {
        self.start + (self.end - self.start) / 2.0
    }

    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// `true` when the range is inverted or narrower than [`DEGENERATE_WINDOW_SECS`].
    pub fn is_degenerate(self) -> bool {
        self.start >= self.end || self.end - self.start < DEGENERATE_WINDOW_SECS
    }

    /// Smallest range covering both inputs.
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
