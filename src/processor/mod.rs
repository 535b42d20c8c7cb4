//! Structural clip transforms: split, merge, proportional retiming and ordered pipelines.

pub(crate) mod measure;
pub(crate) mod merge;
pub(crate) mod pipeline;
pub(crate) mod split;
pub(crate) mod timing;
