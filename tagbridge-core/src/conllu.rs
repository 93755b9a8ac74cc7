//! CoNLL-U serialization for the text-returning tagging path

use crate::builder::{drive, Pipeline};
use crate::config::BridgeConfig;
use crate::engine::{EngineSentence, Model, Word};
use crate::error::Result;
use std::fmt::{self, Write};

/// Prefix of the string returned when tagging fails
pub const ERROR_PREFIX: &str = "ERROR: ";

fn field(value: &str) -> &str {
    if value.is_empty() {
        "_"
    } else {
        value
    }
}

fn space_after(word: &Word) -> bool {
    !word.misc.split('|').any(|m| m == "SpaceAfter=No")
}

/// Reconstruct the sentence text from its surface tokens
pub fn sentence_text(sentence: &EngineSentence) -> String {
    let words: Vec<&Word> = sentence.real_words().collect();
    let mut text = String::new();
    let mut i = 0;
    while i < words.len() {
        let word = words[i];
        let (form, last) = match sentence.multiword_tokens.iter().find(|t| t.first == word.id) {
            Some(token) => {
                let mut last = i;
                while last + 1 < words.len() && words[last + 1].id <= token.last {
                    last += 1;
                }
                (token.form.as_str(), last)
            }
            None => (word.form.as_str(), i),
        };
        text.push_str(form);
        if last + 1 < words.len() && space_after(words[last]) {
            text.push(' ');
        }
        i = last + 1;
    }
    text
}

/// Write one sentence as a CoNLL-U block
pub fn write_sentence<W: Write>(
    sentence: &EngineSentence,
    sent_id: usize,
    out: &mut W,
) -> fmt::Result {
    writeln!(out, "# sent_id = {sent_id}")?;
    writeln!(out, "# text = {}", sentence_text(sentence))?;

    for word in sentence.real_words() {
        if let Some(token) = sentence.multiword_tokens.iter().find(|t| t.first == word.id) {
            writeln!(
                out,
                "{}-{}\t{}\t_\t_\t_\t_\t_\t_\t_\t_",
                token.first, token.last, token.form
            )?;
        }
        let head = if word.head < 0 {
            "_".to_string()
        } else {
            word.head.to_string()
        };
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t_\t{}",
            word.id,
            field(&word.form),
            field(&word.lemma),
            field(&word.upostag),
            field(&word.xpostag),
            field(&word.feats),
            head,
            field(&word.deprel),
            field(&word.misc),
        )?;
    }
    writeln!(out)
}

/// Tags text and returns it as CoNLL-U
pub struct TextTagger<'m> {
    model: &'m dyn Model,
    tokenizer_options: String,
}

impl<'m> TextTagger<'m> {
    /// Create a tagger over `model`
    pub fn new(model: &'m dyn Model, config: &BridgeConfig) -> Self {
        Self {
            model,
            tokenizer_options: config.tokenizer_options.clone(),
        }
    }

    /// Tokenize, tag (and optionally parse) `text` into CoNLL-U
    pub fn tag(&self, text: &str, parse: bool) -> Result<String> {
        let mut out = String::new();
        drive(
            self.model,
            text,
            &Pipeline::tagger(parse),
            &self.tokenizer_options,
            |index, sentence| Ok(write_sentence(sentence, index + 1, &mut out)?),
        )?;
        Ok(out)
    }

    /// Like [`TextTagger::tag`] without parsing, but a failure becomes a
    /// visible string starting with [`ERROR_PREFIX`]
    pub fn tag_or_error(&self, text: &str) -> String {
        self.tag(text, false).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "text tagging failed");
            let message = e.engine_message().map_or_else(|| e.to_string(), str::to_string);
            format!("{ERROR_PREFIX}{message}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MultiwordToken;

    fn sentence() -> EngineSentence {
        let mut s = EngineSentence::new();
        let w = s.add_word("Dogs");
        w.lemma = "dog".into();
        w.upostag = "NOUN".into();
        let w = s.add_word("run");
        w.lemma = "run".into();
        w.upostag = "VERB".into();
        w.misc = "SpaceAfter=No".into();
        let w = s.add_word(".");
        w.upostag = "PUNCT".into();
        s
    }

    #[test]
    fn test_sentence_text_honors_space_after() {
        assert_eq!(sentence_text(&sentence()), "Dogs run.");
    }

    #[test]
    fn test_write_sentence_columns() {
        let mut out = String::new();
        write_sentence(&sentence(), 1, &mut out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "# sent_id = 1");
        assert_eq!(lines[1], "# text = Dogs run.");
        assert_eq!(lines[2], "1\tDogs\tdog\tNOUN\t_\t_\t_\t_\t_\t_");
        assert_eq!(lines[3], "2\trun\trun\tVERB\t_\t_\t_\t_\t_\tSpaceAfter=No");
        assert_eq!(lines[4], "3\t.\t_\tPUNCT\t_\t_\t_\t_\t_\t_");
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn test_multiword_token_line() {
        let mut s = EngineSentence::new();
        s.add_word("I");
        s.add_word("do");
        s.add_word("n't");
        s.multiword_tokens.push(MultiwordToken {
            first: 2,
            last: 3,
            form: "don't".into(),
            range: Some(2..7),
        });
        assert_eq!(sentence_text(&s), "I don't");

        let mut out = String::new();
        write_sentence(&s, 4, &mut out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[3], "2-3\tdon't\t_\t_\t_\t_\t_\t_\t_\t_");
        assert!(lines[4].starts_with("2\tdo\t"));
        assert!(lines[5].starts_with("3\tn't\t"));
    }

    #[test]
    fn test_parsed_head_written() {
        let mut s = sentence();
        s.words[1].head = 2;
        s.words[1].deprel = "nsubj".into();
        let mut out = String::new();
        write_sentence(&s, 1, &mut out).unwrap();
        assert!(out.contains("1\tDogs\tdog\tNOUN\t_\t_\t2\tnsubj\t_\t_"));
    }
}
