//! Authoritative document: clips of timed words, stickers, and the persisted project shape.

pub(crate) mod edit;
pub(crate) mod model;
pub(crate) mod project;
