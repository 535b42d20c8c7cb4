//! Stickers as a derived projection of inserted texts, plus the debounce guard that keeps
//! the two views from driving each other in a loop.

pub(crate) mod derive;
pub(crate) mod guard;
