//! Derived word/clip lookup maps.

pub(crate) mod cache;
