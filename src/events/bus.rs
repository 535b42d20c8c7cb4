//! Typed engine events and synchronous listener dispatch.
//!
//! - Listeners are invoked in subscription order.
//! - A failing listener never stops delivery to the others: its error is logged and
//!   returned in the [`DispatchReport`], and the engine decides whether to roll back.

/// Side effects the engine announces after a mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// The renderer-facing scenario for this word must be regenerated.
    ScenarioRefresh { word_id: String },
    /// Track mirrors were written into the word's clip data.
    TracksMirrored { word_id: String },
    /// The clip vector was replaced; the index now describes `revision`.
    ClipsReplaced { revision: u64 },
    /// Timeline placement changed.
    TimelineChanged { total_duration: f64 },
    /// Stickers were re-derived or updated.
    StickersChanged { count: usize },
}

impl EngineEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ScenarioRefresh { .. } => "scenario_refresh",
            Self::TracksMirrored { .. } => "tracks_mirrored",
            Self::ClipsReplaced { .. } => "clips_replaced",
            Self::TimelineChanged { .. } => "timeline_changed",
            Self::StickersChanged { .. } => "stickers_changed",
        }
    }
}

/// Receives engine events.
pub trait EngineListener {
    fn on_event(&mut self, event: &EngineEvent) -> anyhow::Result<()>;
}

impl<F> EngineListener for F
where
    F: FnMut(&EngineEvent) -> anyhow::Result<()>,
{
    fn on_event(&mut self, event: &EngineEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Result of delivering one event.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failures: Vec<(ListenerId, anyhow::Error)>,
}

impl DispatchReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered set of listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Box<dyn EngineListener>)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl EngineListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener, collecting failures.
    pub fn emit(&mut self, event: &EngineEvent) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (id, listener) in &mut self.listeners {
            match listener.on_event(event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    tracing::warn!(
                        listener = id.0,
                        event = event.kind(),
                        error = %err,
                        "listener failed"
                    );
                    report.failures.push((*id, err));
                }
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/bus.rs"]
mod tests;
