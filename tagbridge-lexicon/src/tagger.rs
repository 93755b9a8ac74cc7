//! Lexicon lookup tagging and a head-attachment parser

use crate::model::ModelFile;
use tagbridge_core::{EngineSentence, Word};

fn is_punctuation(form: &str) -> bool {
    form.chars().all(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

fn is_number(form: &str) -> bool {
    form.chars().any(char::is_numeric)
        && form
            .chars()
            .all(|c| c.is_numeric() || matches!(c, '.' | ','))
}

fn tag_word(model: &ModelFile, word: &mut Word) -> Result<(), String> {
    let key = word.form.to_lowercase();
    if let Some(entry) = model.lexicon.get(&key) {
        word.lemma = if entry.lemma.is_empty() { key } else { entry.lemma.clone() };
        word.upostag = entry.upos.clone();
        word.xpostag = entry.xpos.clone();
        word.feats = entry.feats.clone();
        return Ok(());
    }

    let upos = if is_punctuation(&word.form) {
        "PUNCT"
    } else if is_number(&word.form) {
        "NUM"
    } else if model.tagger.strict {
        return Err(format!("unknown word form '{}'", word.form));
    } else {
        model.tagger.default_upos.as_str()
    };
    word.upostag = upos.to_string();
    word.lemma = if upos == "PUNCT" { word.form.clone() } else { key };
    Ok(())
}

/// Tag every real word of `sentence`
pub(crate) fn tag(model: &ModelFile, sentence: &mut EngineSentence) -> Result<(), String> {
    for word in sentence.words.iter_mut().skip(1) {
        tag_word(model, word)?;
    }
    Ok(())
}

/// Attach every word to a single root
pub(crate) fn parse(model: &ModelFile, sentence: &mut EngineSentence) -> Result<(), String> {
    if let Some(word) = sentence.real_words().find(|w| w.upostag.is_empty()) {
        return Err(format!("word {} '{}' is not tagged", word.id, word.form));
    }
    let Some(root) = sentence
        .real_words()
        .find(|w| model.parser.root_upos.contains(&w.upostag))
        .or_else(|| sentence.real_words().next())
        .map(|w| w.id)
    else {
        return Ok(());
    };

    for word in sentence.words.iter_mut().skip(1) {
        if word.id == root {
            word.head = 0;
            word.deprel = "root".to_string();
        } else {
            word.head = root;
            word.deprel = if word.upostag == "PUNCT" { "punct" } else { "dep" }.to_string();
        }
    }
    Ok(())
}
