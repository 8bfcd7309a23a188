//! Error types for Vitrine

use thiserror::Error;

/// The main error type for Vitrine operations
#[derive(Debug, Error)]
pub enum VitrineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("Invalid character slot: {0} (expected 0, 1 or 2)")]
    InvalidSlot(usize),
}

/// Result type alias for Vitrine operations
pub type Result<T> = std::result::Result<T, VitrineError>;

impl From<toml::de::Error> for VitrineError {
    fn from(err: toml::de::Error) -> Self {
        VitrineError::TomlParseError(err.to_string())
    }
}
