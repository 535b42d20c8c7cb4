//! Subcut is a non-destructive subtitle and timeline editing engine.
//!
//! A project is an ordered list of clips, each holding timed words. The public API is
//! centered on [`Engine`]:
//!
//! - Load and validate a [`Project`]
//! - Split, merge, retime and reorder clips while the word index stays coherent
//! - Bind up to three animation tracks per word and keep them mirrored into the document
//! - Project the clips onto a playback [`Timeline`] and linearize it back to back
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
/// Engine, processor and sticker settings.
pub mod config;
pub(crate) mod document;
pub(crate) mod engine;
pub(crate) mod events;
pub(crate) mod index;
pub(crate) mod manifest;
pub(crate) mod processor;
pub(crate) mod selection;
pub(crate) mod sticker;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    DEGENERATE_WINDOW_SECS, MAX_TRACKS_PER_WORD, MIN_WORD_SECS, TimeRange,
};
pub use crate::foundation::error::{SubcutError, SubcutResult};
pub use crate::foundation::ids::{IdGenerator, SequentialIdGen, UuidIdGen};

pub use crate::document::edit::{move_word, reorder_clips, reorder_words, retokenize_clip};
pub use crate::document::model::{Clip, InsertedText, Sticker, Word, join_words, renumber};
pub use crate::document::project::{Document, Project};
pub use crate::index::cache::{IndexCache, WordEntry};
pub use crate::selection::state::{SelectionState, WordRef, WordState};

pub use crate::animation::manager::{
    AutofillResolver, BatchSummary, NoAutofill, Rejection, TrackChange, TrackList, TrackManager,
};
pub use crate::animation::track::{
    AnimationTrack, AssetRef, Intensity, OffsetValue, Params, TimeOffset, TrackColor,
    derive_window,
};
pub use crate::manifest::loader::{
    DirManifestSource, InMemoryManifestSource, ManifestLoader, ManifestSource, PluginManifest,
    SchemaProperty,
};

pub use crate::config::{EngineConfig, ProcessorConfig, StickerConfig};
pub use crate::processor::measure::{GlyphWidthMeasure, TextMeasure};
pub use crate::processor::merge::{MergeMode, merge_clips, merge_in_document, merge_sequence};
pub use crate::processor::pipeline::{ClipProcessor, PipelineStep};
pub use crate::processor::split::{SplitMode, split_boundaries, split_clip};
pub use crate::processor::timing::{rescale_clip_timing, shift_clip_timing};

pub use crate::timeline::clip::{TimelineClip, TrackKind};
pub use crate::timeline::linearize::Timeline;

pub use crate::sticker::derive::{derive_stickers, find_clip_at_time, sticker_for, update_sticker};
pub use crate::sticker::guard::{Clock, GuardedOp, ManualClock, ReentrancyGuard, SystemClock};

pub use crate::engine::history::TimingHistory;
pub use crate::engine::session::Engine;
pub use crate::events::bus::{DispatchReport, EngineEvent, EngineListener, EventBus, ListenerId};
