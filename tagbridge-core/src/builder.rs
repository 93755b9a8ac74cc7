//! Document construction
//!
//! The builder drives the engine one sentence at a time:
//! tokenize → tag (optional) → parse (optional, only after tagging) →
//! materialize. Any stage failure tears down everything built so far for the
//! text; nothing partial is ever returned.

use crate::arena::Arena;
use crate::config::BridgeConfig;
use crate::engine::{EngineSentence, Model};
use crate::error::{Error, Result, Stage};
use crate::materializer::{materialize, Annotation};
use crate::record::Document;

/// Which engine stages to run for a text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// Run the tagger
    pub tag: bool,
    /// Run the parser; only honored together with `tag`
    pub parse: bool,
    /// Tokenizer options overriding the configured ones
    pub tokenizer_options: Option<String>,
}

impl Pipeline {
    /// Tokenize and tag, optionally parse
    pub fn tagger(parse: bool) -> Self {
        Self {
            tag: true,
            parse,
            tokenizer_options: None,
        }
    }

    /// Tokenize only, with the given tokenizer options
    pub fn tokenizer(options: impl Into<String>) -> Self {
        Self {
            tag: false,
            parse: false,
            tokenizer_options: Some(options.into()),
        }
    }

    /// Whether the parser will actually run
    pub fn parses(&self) -> bool {
        self.tag && self.parse
    }

    pub(crate) fn annotation(&self) -> Annotation {
        if self.tag {
            Annotation::Tagged
        } else {
            Annotation::TokensOnly
        }
    }
}

/// Run the engine over `text`, handing every processed sentence to `sink`.
///
/// Returns the number of sentences processed. The sentence buffer is reset
/// between rounds, so per-sentence working memory does not accumulate.
pub(crate) fn drive<F>(
    model: &dyn Model,
    text: &str,
    pipeline: &Pipeline,
    options: &str,
    mut sink: F,
) -> Result<usize>
where
    F: FnMut(usize, &EngineSentence) -> Result<()>,
{
    let mut reader = model.new_tokenizer(options)?;
    reader.set_text(text);

    let mut sentence = EngineSentence::new();
    let mut index = 0;
    loop {
        match reader.next_sentence(&mut sentence) {
            Ok(true) => {}
            Ok(false) => break,
            Err(message) => return Err(Error::pipeline(Stage::Tokenizer, index, message)),
        }
        if pipeline.tag {
            model
                .tag(&mut sentence)
                .map_err(|message| Error::pipeline(Stage::Tagger, index, message))?;
        }
        if pipeline.parses() {
            model
                .parse(&mut sentence)
                .map_err(|message| Error::pipeline(Stage::Parser, index, message))?;
        }

        sink(index, &sentence)?;
        sentence.clear();
        index += 1;
    }
    Ok(index)
}

/// Builds one [`Document`] per input text
pub struct DocumentBuilder<'m> {
    model: &'m dyn Model,
    arena_block_size: usize,
    tokenizer_options: String,
}

impl<'m> DocumentBuilder<'m> {
    /// Create a builder over `model`
    pub fn new(model: &'m dyn Model, config: &BridgeConfig) -> Self {
        Self {
            model,
            arena_block_size: config.arena_block_size,
            tokenizer_options: config.tokenizer_options.clone(),
        }
    }

    /// Process `text` into a document
    pub fn build(&self, text: &str, pipeline: &Pipeline) -> Result<Document> {
        self.build_inner(text, pipeline).inspect_err(|e| {
            tracing::warn!(model = self.model.name(), error = %e, "document build failed");
        })
    }

    fn build_inner(&self, text: &str, pipeline: &Pipeline) -> Result<Document> {
        let options = pipeline
            .tokenizer_options
            .as_deref()
            .unwrap_or(&self.tokenizer_options);
        let annotation = pipeline.annotation();

        let mut arena = Arena::with_block_size(self.arena_block_size);
        let mut sentences = Vec::new();
        drive(self.model, text, pipeline, options, |_, sentence| {
            sentences.push(materialize(sentence, &mut arena, annotation)?);
            Ok(())
        })?;

        // Ownership of the arena moves to the document here and nowhere else
        let document = Document::new(sentences, arena);
        tracing::debug!(
            sentences = document.sentence_count(),
            tokens = document.token_count(),
            arena_blocks = document.arena().block_count(),
            "document built"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SentenceReader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Splits on '|' into sentences and on spaces into words
    struct PipeModel {
        tagged: AtomicUsize,
        parsed: AtomicUsize,
    }

    struct PipeReader {
        sentences: Vec<String>,
        next: usize,
    }

    impl SentenceReader for PipeReader {
        fn set_text(&mut self, text: &str) {
            self.sentences = text.split('|').map(str::to_string).collect();
            self.next = 0;
        }

        fn next_sentence(
            &mut self,
            sentence: &mut EngineSentence,
        ) -> std::result::Result<bool, String> {
            sentence.clear();
            let Some(text) = self.sentences.get(self.next) else {
                return Ok(false);
            };
            self.next += 1;
            if text.contains('!') {
                return Err("bang".to_string());
            }
            for word in text.split_whitespace() {
                sentence.add_word(word);
            }
            Ok(true)
        }
    }

    impl Model for PipeModel {
        fn new_tokenizer(&self, options: &str) -> Result<Box<dyn SentenceReader + '_>> {
            if !options.is_empty() {
                return Err(Error::InvalidOptions {
                    options: options.to_string(),
                    reason: "none supported".to_string(),
                });
            }
            Ok(Box::new(PipeReader {
                sentences: Vec::new(),
                next: 0,
            }))
        }

        fn tag(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String> {
            self.tagged.fetch_add(1, Ordering::Relaxed);
            for w in sentence.words.iter_mut().skip(1) {
                if w.form == "?" {
                    return Err("cannot tag '?'".to_string());
                }
                w.upostag = "X".to_string();
            }
            Ok(())
        }

        fn parse(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String> {
            self.parsed.fetch_add(1, Ordering::Relaxed);
            for w in sentence.words.iter_mut().skip(1) {
                w.head = 0;
            }
            Ok(())
        }
    }

    fn model() -> PipeModel {
        PipeModel {
            tagged: AtomicUsize::new(0),
            parsed: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_builds_sentences_in_order() {
        let m = model();
        let builder = DocumentBuilder::new(&m, &BridgeConfig::default());
        let doc = builder.build("a b|c|d e f", &Pipeline::tagger(false)).unwrap();
        let counts: Vec<_> = doc.sentences().iter().map(|s| s.len()).collect();
        assert_eq!(counts, [2, 1, 3]);
        assert_eq!(m.tagged.load(Ordering::Relaxed), 3);
        assert_eq!(m.parsed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_parse_requires_tag() {
        let m = model();
        let builder = DocumentBuilder::new(&m, &BridgeConfig::default());
        let pipeline = Pipeline {
            tag: false,
            parse: true,
            tokenizer_options: None,
        };
        let doc = builder.build("a b", &pipeline).unwrap();
        assert_eq!(m.parsed.load(Ordering::Relaxed), 0);
        assert_eq!(doc.sentences()[0].tokens()[0].head(), -1);

        let doc = builder.build("a b", &Pipeline::tagger(true)).unwrap();
        assert_eq!(m.parsed.load(Ordering::Relaxed), 1);
        assert_eq!(doc.sentences()[0].tokens()[0].head(), 0);
    }

    #[test]
    fn test_tokenizer_error_fails_document() {
        let m = model();
        let builder = DocumentBuilder::new(&m, &BridgeConfig::default());
        let err = builder.build("a|b!|c", &Pipeline::tagger(false)).unwrap_err();
        match err {
            Error::Pipeline { stage, sentence, .. } => {
                assert_eq!(stage, Stage::Tokenizer);
                assert_eq!(sentence, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tagger_error_fails_document() {
        let m = model();
        let builder = DocumentBuilder::new(&m, &BridgeConfig::default());
        let err = builder.build("a|b ?", &Pipeline::tagger(false)).unwrap_err();
        assert!(matches!(err, Error::Pipeline { stage: Stage::Tagger, sentence: 1, .. }));
        assert_eq!(err.engine_message(), Some("cannot tag '?'"));
    }

    #[test]
    fn test_tagger_error_ignored_without_tagging() {
        let m = model();
        let builder = DocumentBuilder::new(&m, &BridgeConfig::default());
        let doc = builder.build("a|b ?", &Pipeline::tokenizer("")).unwrap();
        assert_eq!(doc.token_count(), 3);
    }

    #[test]
    fn test_invalid_options_propagate() {
        let m = model();
        let builder = DocumentBuilder::new(&m, &BridgeConfig::default());
        let err = builder.build("a", &Pipeline::tokenizer("bogus")).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions { .. }));
    }

    #[test]
    fn test_empty_text_is_empty_document() {
        let m = model();
        let builder = DocumentBuilder::new(&m, &BridgeConfig::default());
        let doc = builder.build("", &Pipeline::tagger(false)).unwrap();
        // "" splits into one empty sentence
        assert_eq!(doc.sentence_count(), 1);
        assert!(doc.sentences()[0].is_empty());
    }
}
