//! Failure causes inside the boundary
//!
//! None of these cross into C; entry points turn them into a status or a
//! null result and log them.

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum BoundaryError {
    #[error("{0} is null")]
    Null(&'static str),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("text {0} is null or not valid UTF-8")]
    InvalidBatchText(usize),

    #[error("unknown model handle {0}")]
    UnknownModel(u64),

    #[error(transparent)]
    Bridge(#[from] tagbridge_core::Error),

    #[error(transparent)]
    Lexicon(#[from] tagbridge_lexicon::LexiconError),

    #[error("panic inside {0}")]
    Panic(&'static str),
}

pub(crate) type Result<T> = std::result::Result<T, BoundaryError>;
