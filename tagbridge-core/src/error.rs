//! Error types for the bridge layer

use std::fmt;
use thiserror::Error;

/// Engine stage that reported a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Sentence segmentation and tokenization
    Tokenizer,
    /// POS tagging and lemmatization
    Tagger,
    /// Dependency parsing
    Parser,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Tokenizer => write!(f, "tokenizer"),
            Stage::Tagger => write!(f, "tagger"),
            Stage::Parser => write!(f, "parser"),
        }
    }
}

/// Bridge-level errors
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or unusable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine rejected the tokenizer options
    #[error("invalid tokenizer options '{options}': {reason}")]
    InvalidOptions {
        /// The options string as given
        options: String,
        /// Why the engine rejected it
        reason: String,
    },

    /// The engine reported an error while processing a sentence
    #[error("{stage} failed on sentence {sentence}: {message}")]
    Pipeline {
        /// The stage that failed
        stage: Stage,
        /// Zero-based index of the sentence being processed
        sentence: usize,
        /// Engine-provided error text
        message: String,
    },

    /// A record buffer could not be allocated
    #[error("allocation of {requested} bytes failed")]
    Allocation {
        /// Size of the failed request in bytes
        requested: usize,
    },

    /// The worker pool could not be started
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// One text of a batch failed, failing the whole batch
    #[error("batch item {index} failed: {source}")]
    Batch {
        /// Index of the first text observed to fail
        index: usize,
        /// The failure of that text
        #[source]
        source: Box<Error>,
    },

    /// Configuration error
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text serialization error
    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl Error {
    /// Build a pipeline error for `stage` at sentence index `sentence`
    pub fn pipeline(stage: Stage, sentence: usize, message: impl Into<String>) -> Self {
        Error::Pipeline {
            stage,
            sentence,
            message: message.into(),
        }
    }

    /// The engine's own error text, if this error came from the engine
    pub fn engine_message(&self) -> Option<&str> {
        match self {
            Error::Pipeline { message, .. } => Some(message),
            Error::InvalidOptions { reason, .. } => Some(reason),
            Error::Batch { source, .. } => source.engine_message(),
            _ => None,
        }
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, Error>;
