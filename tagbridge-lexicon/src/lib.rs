//! Lexicon-driven reference engine
//!
//! A [`LexiconModel`] is loaded from a TOML file and implements
//! [`tagbridge_core::Model`]: Unicode segmentation for tokenization, lexicon
//! lookup for tagging and a single-root attachment parser. It is small enough
//! to ship with the bridge and exercise every path of it.

#![warn(missing_docs)]

pub mod error;
pub mod model;
mod tagger;
pub mod tokenizer;

pub use error::{LexiconError, Result};
pub use model::{LexiconEntry, LexiconModel, ModelFile};
pub use tokenizer::{LexiconReader, TokenizerOptions};
