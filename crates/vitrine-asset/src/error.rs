//! Load failure type

use std::path::PathBuf;
use thiserror::Error;

/// A model or texture that could not be loaded.
///
/// `cause` is flattened to a string so the error can be cloned into both the
/// log and the `LoadEvent::Failed` notification.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Failed to load {}: {cause}", path.display())]
pub struct AssetLoadError {
    pub path: PathBuf,
    pub cause: String,
}

impl AssetLoadError {
    pub fn new(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        Self {
            path: path.into(),
            cause: cause.to_string(),
        }
    }
}
