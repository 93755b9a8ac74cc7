//! Scripted engine shared by the integration tests
//!
//! - words are whitespace separated; a trailing `.`, `!` or `?` is split off
//!   and ends the sentence
//! - `BADTOKEN` makes the tokenizer fail, `FAIL` the tagger, `NOPARSE` the parser
//! - `SYNTH` is emitted without a byte range
//! - `SLOW` makes the tagger sleep a little

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tagbridge_core::{EngineSentence, Error, Model, Result, SentenceReader};

#[derive(Default)]
pub struct ScriptModel {
    pub tokenizers: AtomicUsize,
    pub tagged_sentences: AtomicUsize,
}

impl ScriptModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokenizers(&self) -> usize {
        self.tokenizers.load(Ordering::SeqCst)
    }
}

struct ScriptReader {
    text: String,
    sentences: Vec<Vec<(usize, usize)>>,
    next: usize,
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn push_word(
    text: &str,
    s: usize,
    e: usize,
    current: &mut Vec<(usize, usize)>,
    sentences: &mut Vec<Vec<(usize, usize)>>,
) {
    let last = text[s..e].chars().last().unwrap_or(' ');
    if is_terminator(last) {
        let cut = e - last.len_utf8();
        if cut > s {
            current.push((s, cut));
        }
        current.push((cut, e));
        sentences.push(std::mem::take(current));
    } else {
        current.push((s, e));
    }
}

fn segment(text: &str) -> Vec<Vec<(usize, usize)>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                push_word(text, s, i, &mut current, &mut sentences);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        push_word(text, s, text.len(), &mut current, &mut sentences);
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

impl SentenceReader for ScriptReader {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.sentences = segment(text);
        self.next = 0;
    }

    fn next_sentence(
        &mut self,
        sentence: &mut EngineSentence,
    ) -> std::result::Result<bool, String> {
        sentence.clear();
        let Some(words) = self.sentences.get(self.next) else {
            return Ok(false);
        };
        self.next += 1;
        for &(s, e) in words {
            let form = &self.text[s..e];
            if form == "BADTOKEN" {
                return Err("tokenizer rejected BADTOKEN".to_string());
            }
            let word = sentence.add_word(form);
            if form != "SYNTH" {
                word.range = Some(s..e);
            }
        }
        Ok(true)
    }
}

impl Model for ScriptModel {
    fn new_tokenizer(&self, options: &str) -> Result<Box<dyn SentenceReader + '_>> {
        if !options.is_empty() && options != "presegmented" {
            return Err(Error::InvalidOptions {
                options: options.to_string(),
                reason: "unknown option".to_string(),
            });
        }
        self.tokenizers.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptReader {
            text: String::new(),
            sentences: Vec::new(),
            next: 0,
        }))
    }

    fn tag(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String> {
        self.tagged_sentences.fetch_add(1, Ordering::SeqCst);
        for word in sentence.words.iter_mut().skip(1) {
            match word.form.as_str() {
                "FAIL" => return Err("tagger refused FAIL".to_string()),
                "SLOW" => thread::sleep(Duration::from_millis(20)),
                _ => {}
            }
            let upos = match word.form.as_str() {
                "Dogs" | "cats" => "NOUN",
                "run" | "sleep" => "VERB",
                f if f.chars().all(|c| c.is_ascii_punctuation()) => "PUNCT",
                _ => "X",
            };
            word.upostag = upos.to_string();
            word.xpostag = upos.to_lowercase();
            word.lemma = word.form.to_lowercase();
            word.feats = "Mock=Yes".to_string();
        }
        Ok(())
    }

    fn parse(&self, sentence: &mut EngineSentence) -> std::result::Result<(), String> {
        if sentence.words.iter().any(|w| w.form == "NOPARSE") {
            return Err("parser refused NOPARSE".to_string());
        }
        for word in sentence.words.iter_mut().skip(1) {
            if word.id == 1 {
                word.head = 0;
                word.deprel = "root".to_string();
            } else {
                word.head = 1;
                word.deprel = "dep".to_string();
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "script"
    }
}
