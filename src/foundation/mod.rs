//! Shared primitives: error taxonomy, time ranges and identifier generation.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod ids;
