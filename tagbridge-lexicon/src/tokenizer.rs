//! UAX #29 tokenizer
//!
//! Sentences come from Unicode sentence boundaries (or lines, when the input
//! is presegmented) and words from Unicode word boundaries. Whitespace
//! segments are dropped. Surfaces listed under `[multiword]` expand into
//! their parts; the parts carry no byte range of their own.

use crate::model::ModelFile;
use std::ops::Range;
use tagbridge_core::{EngineSentence, Error, MultiwordToken, SentenceReader};
use unicode_segmentation::UnicodeSegmentation;

const SPACE_AFTER_NO: &str = "SpaceAfter=No";

/// Options accepted by [`LexiconReader`], written `key=value;key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// One sentence per input line
    pub presegmented: bool,
    /// Record byte ranges on words
    pub ranges: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            presegmented: false,
            ranges: true,
        }
    }
}

impl TokenizerOptions {
    /// Parse an option string; unknown keys are rejected
    pub fn parse(options: &str) -> tagbridge_core::Result<Self> {
        let invalid = |reason: String| Error::InvalidOptions {
            options: options.to_string(),
            reason,
        };

        let mut parsed = Self::default();
        for item in options.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match item.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (item, None),
            };
            let flag = match value {
                None | Some("1") | Some("true") => true,
                Some("0") | Some("false") => false,
                Some(other) => {
                    return Err(invalid(format!(
                        "option '{key}' expects 0 or 1, got '{other}'"
                    )))
                }
            };
            match key {
                "presegmented" => parsed.presegmented = flag,
                "ranges" => parsed.ranges = flag,
                _ => return Err(invalid(format!("unknown option '{key}'"))),
            }
        }
        Ok(parsed)
    }
}

/// Sentence reader over a lexicon model
pub struct LexiconReader<'m> {
    model: &'m ModelFile,
    options: TokenizerOptions,
    text: String,
    spans: Vec<Range<usize>>,
    next: usize,
}

impl<'m> LexiconReader<'m> {
    /// Create a reader with no text
    pub fn new(model: &'m ModelFile, options: TokenizerOptions) -> Self {
        Self {
            model,
            options,
            text: String::new(),
            spans: Vec::new(),
            next: 0,
        }
    }
}

fn sentence_spans(text: &str, presegmented: bool) -> Vec<Range<usize>> {
    let spans: Vec<Range<usize>> = if presegmented {
        let mut offset = 0;
        text.split_inclusive('\n')
            .map(|line| {
                let span = offset..offset + line.len();
                offset = span.end;
                span
            })
            .collect()
    } else {
        text.split_sentence_bound_indices()
            .map(|(start, s)| start..start + s.len())
            .collect()
    };
    spans
        .into_iter()
        .filter(|span| !text[span.clone()].trim().is_empty())
        .collect()
}

fn fill(
    model: &ModelFile,
    options: TokenizerOptions,
    text: &str,
    span: Range<usize>,
    sentence: &mut EngineSentence,
) -> Result<(), String> {
    let base = span.start;
    for (offset, form) in text[span].split_word_bound_indices() {
        if form.trim().is_empty() {
            continue;
        }
        let start = base + offset;
        let end = start + form.len();
        let space_after = text[end..].chars().next().map_or(true, char::is_whitespace);
        let range = options.ranges.then_some(start..end);

        match model.multiword.get(&form.to_lowercase()) {
            Some(parts) => {
                let first = i32::try_from(sentence.words.len()).unwrap_or(i32::MAX);
                for part in parts {
                    sentence.add_word(part.as_str());
                }
                let last = i32::try_from(sentence.words.len() - 1).unwrap_or(i32::MAX);
                if let (false, Some(word)) = (space_after, sentence.words.last_mut()) {
                    word.misc = SPACE_AFTER_NO.to_string();
                }
                sentence.multiword_tokens.push(MultiwordToken {
                    first,
                    last,
                    form: form.to_string(),
                    range,
                });
            }
            None => {
                let word = sentence.add_word(form);
                word.range = range;
                if !space_after {
                    word.misc = SPACE_AFTER_NO.to_string();
                }
            }
        }
    }

    let limit = model.tokenizer.max_sentence_words;
    let count = sentence.words.len() - 1;
    if limit > 0 && count > limit {
        return Err(format!("sentence has {count} words, limit is {limit}"));
    }
    Ok(())
}

impl SentenceReader for LexiconReader<'_> {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.spans = sentence_spans(text, self.options.presegmented);
        self.next = 0;
    }

    fn next_sentence(&mut self, sentence: &mut EngineSentence) -> Result<bool, String> {
        sentence.clear();
        let Some(span) = self.spans.get(self.next).cloned() else {
            return Ok(false);
        };
        self.next += 1;
        fill(self.model, self.options, &self.text, span, sentence)?;
        Ok(true)
    }
}
