//! Capability interface of the external NLP engine
//!
//! The bridge never tokenizes, tags or parses by itself. It drives a [`Model`]
//! one sentence at a time through this narrow surface and reads the engine's
//! [`EngineSentence`] object graph back out.

use crate::error::Result;
use std::ops::Range;

/// Form of the synthetic root word every sentence starts with
pub const ROOT_FORM: &str = "<root>";

/// One word as the engine represents it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Sentence-local id; 0 is the synthetic root
    pub id: i32,
    /// Surface form
    pub form: String,
    /// Lemma
    pub lemma: String,
    /// Universal POS tag
    pub upostag: String,
    /// Language-specific POS tag
    pub xpostag: String,
    /// Morphological features
    pub feats: String,
    /// Head id, -1 until the parser assigns one
    pub head: i32,
    /// Dependency relation
    pub deprel: String,
    /// Miscellaneous annotations (e.g. `SpaceAfter=No`)
    pub misc: String,
    /// Byte range of the word in the input, when the tokenizer knows it
    pub range: Option<Range<usize>>,
}

impl Word {
    /// Create a word with no annotations
    pub fn new(id: i32, form: impl Into<String>) -> Self {
        Self {
            id,
            form: form.into(),
            lemma: String::new(),
            upostag: String::new(),
            xpostag: String::new(),
            feats: String::new(),
            head: -1,
            deprel: String::new(),
            misc: String::new(),
            range: None,
        }
    }

    /// Byte range of the word as `(start, end)`, if the engine recorded one
    pub fn token_range(&self) -> Option<(usize, usize)> {
        self.range.as_ref().map(|r| (r.start, r.end))
    }
}

/// A surface token that expands into several words (e.g. "don't" → do + n't)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiwordToken {
    /// Id of the first word covered
    pub first: i32,
    /// Id of the last word covered
    pub last: i32,
    /// Surface form
    pub form: String,
    /// Byte range of the surface token
    pub range: Option<Range<usize>>,
}

/// Engine-side sentence object
///
/// `words[0]` is always the synthetic root; real words start at id 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSentence {
    /// Words including the leading root
    pub words: Vec<Word>,
    /// Multiword surface tokens
    pub multiword_tokens: Vec<MultiwordToken>,
}

impl Default for EngineSentence {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSentence {
    /// Create a sentence holding only the root
    pub fn new() -> Self {
        Self {
            words: vec![Word::new(0, ROOT_FORM)],
            multiword_tokens: Vec::new(),
        }
    }

    /// Reset to the root-only state, keeping allocated capacity
    pub fn clear(&mut self) {
        self.words.truncate(1);
        self.multiword_tokens.clear();
    }

    /// Whether the sentence has no real words
    pub fn is_empty(&self) -> bool {
        self.words.len() <= 1
    }

    /// Append a word with the next id
    pub fn add_word(&mut self, form: impl Into<String>) -> &mut Word {
        let id = i32::try_from(self.words.len()).unwrap_or(i32::MAX);
        self.words.push(Word::new(id, form));
        let last = self.words.len() - 1;
        &mut self.words[last]
    }

    /// Real words, skipping the root
    pub fn real_words(&self) -> impl Iterator<Item = &Word> {
        self.words.iter().filter(|w| w.id > 0)
    }
}

/// Splits a text into successive sentences
pub trait SentenceReader {
    /// Start a new document over `text`
    fn set_text(&mut self, text: &str);

    /// Fill `sentence` with the next sentence.
    ///
    /// Returns `Ok(false)` at the end of the text. `sentence` is cleared by
    /// the reader before it is filled.
    fn next_sentence(&mut self, sentence: &mut EngineSentence) -> std::result::Result<bool, String>;
}

/// A loaded engine model
pub trait Model: Send + Sync {
    /// Create a tokenizer over this model; `options` follows the engine's
    /// `key=value;key` convention, empty for defaults
    fn new_tokenizer(&self, options: &str) -> Result<Box<dyn SentenceReader + '_>>;

    /// Tag one sentence in place
    fn tag(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String>;

    /// Parse one tagged sentence in place
    fn parse(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String>;

    /// Model name for diagnostics
    fn name(&self) -> &str {
        "model"
    }
}
