//! The editing facade: one owned document plus every structure derived from it.
//!
//! Operations are split by concern: clip structure, animation tracks, word timing and
//! selection, stickers and playback timeline.

pub(crate) mod history;
mod playback;
pub(crate) mod session;
mod structure;
mod tracks;
mod words;
