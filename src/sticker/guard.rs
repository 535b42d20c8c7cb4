use std::{
    cell::Cell,
    collections::HashMap,
    rc::Rc,
    time::{Duration, Instant},
};

/// Monotonic time source for debouncing.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock; clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Logical operations guarded against feedback loops with the inserted-text owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardedOp {
    /// Re-derive every sticker from the inserted texts.
    SyncStickers,
    /// Refresh one sticker from an edited inserted text.
    UpdateSticker,
}

/// Rejects a repeat of the same logical operation within its minimum interval.
#[derive(Clone, Debug, Default)]
pub struct ReentrancyGuard {
    intervals: HashMap<GuardedOp, Duration>,
    last_entry: HashMap<GuardedOp, Duration>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, op: GuardedOp, interval: Duration) -> Self {
        self.intervals.insert(op, interval);
        self
    }

    /// Record an entry at `now`; `false` when the previous entry is too recent.
    pub fn try_enter(&mut self, op: GuardedOp, now: Duration) -> bool {
        let interval = self.intervals.get(&op).copied().unwrap_or_default();
        if let Some(last) = self.last_entry.get(&op)
            && now.saturating_sub(*last) < interval
        {
            tracing::debug!(?op, ?interval, "re-entrant call rejected");
            return false;
        }
        self.last_entry.insert(op, now);
        true
    }

    pub fn reset(&mut self) {
        self.last_entry.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sticker/guard.rs"]
mod tests;
