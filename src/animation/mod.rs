//! Per-word animation tracks: window derivation, capacity and the color law.

pub(crate) mod manager;
pub(crate) mod track;
