/// Convenience result type used across subcut.
pub type SubcutResult<T> = Result<T, SubcutError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Track-capacity overflow and degenerate animation windows are not errors: the first is
/// reported as a rejected [`crate::TrackChange`], the second is recovered by recentering.
#[derive(thiserror::Error, Debug)]
pub enum SubcutError {
    /// Invalid user-provided or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A structural edit addressed clips or words that cannot be combined or divided.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A lookup was attempted against an index built from an older document revision.
    #[error("stale index: built at revision {built}, document is at revision {current}")]
    StaleIndex {
        /// Revision the index was built from.
        built: u64,
        /// Current document revision.
        current: u64,
    },

    /// A clip, word, or track id does not exist in the active document.
    #[error("not found: {0}")]
    NotFound(String),

    /// Errors while resolving plugin manifests.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies, listeners or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SubcutError {
    /// Build a [`SubcutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SubcutError::InvalidRange`] value.
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Build a [`SubcutError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`SubcutError::Manifest`] value.
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    /// Build a [`SubcutError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SubcutError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
