use std::collections::VecDeque;

use crate::foundation::core::TimeRange;

/// Bounded undo/redo stack of timings for one word.
///
/// The entry under the cursor is the word's current timing. Recording after an undo drops
/// the redo tail; the oldest entries fall off once `depth` is exceeded.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingHistory {
    entries: VecDeque<TimeRange>,
    cursor: usize,
}

impl TimingHistory {
    /// Start a history whose first entry is the word's timing before any edit.
    pub fn seeded(initial: TimeRange) -> Self {
        Self {
            entries: VecDeque::from([initial]),
            cursor: 0,
        }
    }

    pub fn current(&self) -> Option<TimeRange> {
        self.entries.get(self.cursor).copied()
    }

    pub fn record(&mut self, timing: TimeRange, depth: usize) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(timing);
        while self.entries.len() > depth.max(1) {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> Option<TimeRange> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    pub fn redo(&mut self) -> Option<TimeRange> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/history.rs"]
mod tests;
