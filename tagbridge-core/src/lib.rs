//! Flat document records over an NLP engine
//!
//! This crate turns an engine's sentence/word object graph into flat,
//! caller-owned records: every string of a [`Document`] lives in a single
//! bump [`Arena`], every sentence owns one contiguous `#[repr(C)]` token
//! array, and the whole tree is released at once. A [`BatchScheduler`] runs
//! the conversion over many texts on a fixed worker pool with all-or-nothing
//! semantics.
//!
//! The tokenizer, tagger and parser are external; they are reached through
//! the [`Model`] and [`SentenceReader`] traits.

#![warn(missing_docs)]

pub mod arena;
pub mod builder;
pub mod config;
pub mod conllu;
pub mod engine;
pub mod error;
mod materializer;
pub mod record;
pub mod scheduler;

// Re-export key types
pub use arena::{Arena, ArenaStr, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};
pub use builder::{DocumentBuilder, Pipeline};
pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use conllu::{TextTagger, ERROR_PREFIX};
pub use engine::{EngineSentence, Model, MultiwordToken, SentenceReader, Word};
pub use error::{Error, Result, Stage};
pub use record::{Batch, Document, Sentence, Token, HEAD_NOT_COMPUTED, ROOT_HEAD};
pub use scheduler::BatchScheduler;

/// Version of this library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tag `text` into a document, optionally parsing
pub fn tag_structured(
    model: &dyn Model,
    text: &str,
    parse: bool,
    config: &BridgeConfig,
) -> Result<Document> {
    DocumentBuilder::new(model, config).build(text, &Pipeline::tagger(parse))
}

/// Tokenize `text` into a document; linguistic fields stay empty and every
/// head is [`HEAD_NOT_COMPUTED`]
pub fn tokenize_structured(
    model: &dyn Model,
    text: &str,
    tokenizer_options: &str,
    config: &BridgeConfig,
) -> Result<Document> {
    DocumentBuilder::new(model, config).build(text, &Pipeline::tokenizer(tokenizer_options))
}

/// Tag every text in parallel; fails as a whole if any text fails
pub fn tag_batch<S>(
    model: &dyn Model,
    texts: &[S],
    parse: bool,
    config: &BridgeConfig,
) -> Result<Batch>
where
    S: AsRef<str> + Sync,
{
    BatchScheduler::new(config).run(model, texts, &Pipeline::tagger(parse))
}

/// Tag `text` and serialize it as CoNLL-U
pub fn tag_as_text(model: &dyn Model, text: &str, config: &BridgeConfig) -> String {
    TextTagger::new(model, config).tag_or_error(text)
}
