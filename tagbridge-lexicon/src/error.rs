//! Model loading errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a lexicon model
#[derive(Error, Debug)]
pub enum LexiconError {
    /// The model file could not be read
    #[error("failed to read model {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The model file is not valid TOML for the schema
    #[error("failed to parse model: {0}")]
    Parse(#[from] toml::de::Error),

    /// The model parsed but is unusable
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl From<LexiconError> for tagbridge_core::Error {
    fn from(err: LexiconError) -> Self {
        match err {
            LexiconError::Io { source, .. } => tagbridge_core::Error::Io(source),
            other => tagbridge_core::Error::Config(other.to_string()),
        }
    }
}

/// Result alias for model loading
pub type Result<T> = std::result::Result<T, LexiconError>;
