//! Playback timeline projection and sequential linearization.

pub(crate) mod clip;
pub(crate) mod linearize;
