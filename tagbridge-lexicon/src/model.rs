//! Model file schema and the [`Model`] implementation

use crate::error::{LexiconError, Result};
use crate::tagger;
use crate::tokenizer::{LexiconReader, TokenizerOptions};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tagbridge_core::{EngineSentence, Model, SentenceReader};

const DEMO_MODEL: &str = include_str!("../models/en-demo.toml");

/// `[model]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelInfo {
    /// Model name
    pub name: String,
    /// Language code
    #[serde(default)]
    pub language: String,
}

/// `[tokenizer]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerSection {
    /// Longest sentence the tokenizer accepts, 0 for no limit
    pub max_sentence_words: usize,
}

/// `[tagger]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaggerSection {
    /// Fail on forms missing from the lexicon
    pub strict: bool,
    /// Tag for forms missing from the lexicon
    pub default_upos: String,
}

impl Default for TaggerSection {
    fn default() -> Self {
        Self {
            strict: false,
            default_upos: "X".to_string(),
        }
    }
}

/// `[parser]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserSection {
    /// Universal tags eligible as sentence root, in no particular order
    pub root_upos: Vec<String>,
}

/// One `[lexicon]` entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexiconEntry {
    /// Lemma; the lowercase form when empty
    pub lemma: String,
    /// Universal tag
    pub upos: String,
    /// Language-specific tag
    pub xpos: String,
    /// Morphological features
    pub feats: String,
}

/// Whole model file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    /// Identification
    pub model: ModelInfo,
    /// Tokenizer limits
    #[serde(default)]
    pub tokenizer: TokenizerSection,
    /// Tagger behavior
    #[serde(default)]
    pub tagger: TaggerSection,
    /// Parser behavior
    #[serde(default)]
    pub parser: ParserSection,
    /// Known forms keyed by lowercase form
    #[serde(default)]
    pub lexicon: HashMap<String, LexiconEntry>,
    /// Surfaces that expand into several words
    #[serde(default)]
    pub multiword: HashMap<String, Vec<String>>,
}

impl ModelFile {
    fn normalize(mut self) -> Result<Self> {
        if self.model.name.trim().is_empty() {
            return Err(LexiconError::InvalidModel("model name is empty".to_string()));
        }
        if self.tagger.default_upos.is_empty() {
            return Err(LexiconError::InvalidModel("tagger.default_upos is empty".to_string()));
        }
        if let Some((surface, parts)) = self.multiword.iter().find(|(_, parts)| parts.len() < 2) {
            return Err(LexiconError::InvalidModel(format!(
                "multiword '{surface}' needs at least two parts, got {}",
                parts.len()
            )));
        }
        if let Some((surface, _)) = self
            .multiword
            .iter()
            .find(|(_, parts)| parts.iter().any(|p| p.trim().is_empty()))
        {
            return Err(LexiconError::InvalidModel(format!(
                "multiword '{surface}' has an empty part"
            )));
        }

        self.lexicon = self.lexicon.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
        self.multiword = self.multiword.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
        Ok(self)
    }
}

/// A loaded lexicon model
#[derive(Debug, Clone)]
pub struct LexiconModel {
    file: ModelFile,
}

impl LexiconModel {
    /// Parse a model from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ModelFile = toml::from_str(content)?;
        let file = file.normalize()?;
        tracing::debug!(
            name = %file.model.name,
            entries = file.lexicon.len(),
            multiword = file.multiword.len(),
            "lexicon model parsed"
        );
        Ok(Self { file })
    }

    /// Load a model file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The small English model shipped with the crate
    pub fn demo() -> Result<Self> {
        Self::from_toml_str(DEMO_MODEL)
    }

    /// Parsed model file
    pub fn file(&self) -> &ModelFile {
        &self.file
    }

    /// Language code
    pub fn language(&self) -> &str {
        &self.file.model.language
    }
}

impl Model for LexiconModel {
    fn new_tokenizer(&self, options: &str) -> tagbridge_core::Result<Box<dyn SentenceReader + '_>> {
        let options = TokenizerOptions::parse(options)?;
        Ok(Box::new(LexiconReader::new(&self.file, options)))
    }

    fn tag(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String> {
        tagger::tag(&self.file, sentence)
    }

    fn parse(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String> {
        tagger::parse(&self.file, sentence)
    }

    fn name(&self) -> &str {
        &self.file.model.name
    }
}
