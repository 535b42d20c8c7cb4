use crate::{
    document::model::InsertedText,
    engine::session::Engine,
    events::bus::EngineEvent,
    foundation::error::SubcutResult,
    sticker::derive::{derive_stickers, update_sticker},
    sticker::guard::GuardedOp,
    timeline::linearize::Timeline,
};

impl Engine {
    /// Re-derive every clip's stickers from the inserted texts.
    ///
    /// Returns `false` without touching anything when called again within the sync
    /// interval.
    pub fn sync_stickers(&mut self, texts: &[InsertedText]) -> bool {
        if !self.guard.try_enter(GuardedOp::SyncStickers, self.clock.now()) {
            return false;
        }
        let derived = derive_stickers(
            self.document.clips(),
            self.document.deleted_clip_ids(),
            texts,
        );
        let mut count = 0;
        for (clip, fresh) in self.document.clips_mut().iter_mut().zip(derived) {
            count += fresh.stickers.len();
            clip.stickers = fresh.stickers;
        }
        self.notify(EngineEvent::StickersChanged { count });
        true
    }

    /// Refresh the sticker projecting one edited inserted text.
    ///
    /// Returns `false` when rate-limited or when no sticker projects `text`.
    pub fn update_sticker(&mut self, text: &InsertedText) -> bool {
        if !self.guard.try_enter(GuardedOp::UpdateSticker, self.clock.now()) {
            return false;
        }
        let hit = update_sticker(self.document.clips_mut(), text);
        if hit {
            self.notify(EngineEvent::StickersChanged { count: 1 });
        }
        hit
    }

    /// Drop timeline edits and project the active clips in document order again.
    pub fn init_timeline(&mut self) {
        self.timeline =
            Timeline::from_clips(self.document.clips(), self.document.deleted_clip_ids());
        self.notify_timeline();
    }

    /// Lay out the timeline back to back in the given source-clip order.
    ///
    /// Unknown clip ids are ignored; clips left out are disabled and parked at the end.
    pub fn linearize_timeline(&mut self, source_clip_ids: &[String]) {
        let order: Vec<String> = source_clip_ids
            .iter()
            .filter_map(|id| self.timeline.id_for_source(id).map(str::to_string))
            .collect();
        self.timeline.linearize(&order);
        self.notify_timeline();
    }

    /// Lay out the timeline back to back in active document order.
    pub fn linearize_document_order(&mut self) {
        let order: Vec<String> = self
            .document
            .project()
            .active_clips()
            .map(|c| c.id.clone())
            .collect();
        self.linearize_timeline(&order);
    }

    pub fn trim_timeline_clip(
        &mut self,
        timeline_clip_id: &str,
        in_point: f64,
        out_point: f64,
    ) -> SubcutResult<()> {
        self.timeline.trim(timeline_clip_id, in_point, out_point)?;
        self.notify_timeline();
        Ok(())
    }

    /// Cut a timeline clip at playback time `t`; returns the new right-hand clip id.
    pub fn split_timeline_clip(
        &mut self,
        timeline_clip_id: &str,
        t: f64,
    ) -> SubcutResult<String> {
        let id = self.timeline.split_at(timeline_clip_id, t, self.ids.as_mut())?;
        self.notify_timeline();
        Ok(id)
    }

    pub fn seek(&mut self, t: f64) -> f64 {
        self.timeline.seek(t)
    }
}
