//! Error types for the diagram generator
//!
//! Only the outer surfaces (configuration, output files, CLI) fail with
//! these. The translation core degrades into [`crate::diagram::Diagnostics`]
//! instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for diagram operations
pub type Result<T> = std::result::Result<T, DiagramError>;

/// Diagram generator errors
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Invalid input {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
