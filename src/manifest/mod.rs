//! Plugin manifests: shape, default-parameter extraction and a cached loader.

pub(crate) mod loader;
