//! Engine sentence → flat token array

use crate::arena::Arena;
use crate::engine::{EngineSentence, Word};
use crate::error::{Error, Result};
use crate::record::{Sentence, Token, TokenStrings, HEAD_NOT_COMPUTED};
use std::mem::size_of;

/// Which engine stages produced annotations for a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Annotation {
    /// Only the tokenizer ran; linguistic fields are left empty
    TokensOnly,
    /// The tagger (and possibly the parser) ran
    Tagged,
}

/// Materialize one processed sentence into a [`Sentence`] record.
///
/// Words with an id ≤ 0 are structural artifacts and are skipped. Strings are
/// copied into `arena`, so the result is only meaningful while that arena is
/// alive; the document builder keeps both together.
pub(crate) fn materialize(
    sentence: &EngineSentence,
    arena: &mut Arena,
    annotation: Annotation,
) -> Result<Sentence> {
    let mut tokens = Vec::new();
    tokens
        .try_reserve_exact(sentence.words.len())
        .map_err(|_| Error::Allocation {
            requested: sentence.words.len() * size_of::<Token>(),
        })?;

    for word in sentence.words.iter().filter(|w| w.id > 0) {
        tokens.push(materialize_word(word, arena, annotation));
    }

    Ok(Sentence::new(tokens))
}

fn materialize_word(word: &Word, arena: &mut Arena, annotation: Annotation) -> Token {
    let (start, end) = word.token_range().unwrap_or((0, 0));
    let form = arena.allocate(&word.form);

    let (head, strings) = match annotation {
        Annotation::Tagged => (
            word.head,
            TokenStrings {
                form,
                lemma: arena.allocate(&word.lemma),
                upos: arena.allocate(&word.upostag),
                xpostag: arena.allocate(&word.xpostag),
                feats: arena.allocate(&word.feats),
                deprel: arena.allocate(&word.deprel),
            },
        ),
        Annotation::TokensOnly => (
            HEAD_NOT_COMPUTED,
            TokenStrings {
                form,
                lemma: arena.allocate_empty(),
                upos: arena.allocate_empty(),
                xpostag: arena.allocate_empty(),
                feats: arena.allocate_empty(),
                deprel: arena.allocate_empty(),
            },
        ),
    };

    Token::new(word.id, head, strings, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_sentence() -> EngineSentence {
        let mut s = EngineSentence::new();
        let words = [("Dogs", "NOUN", 0..4), ("run", "VERB", 5..8), (".", "PUNCT", 8..9)];
        for (form, upos, range) in words {
            let w = s.add_word(form);
            w.lemma = form.to_lowercase();
            w.upostag = upos.to_string();
            w.range = Some(range);
        }
        s
    }

    #[test]
    fn test_skips_root_and_keeps_order() {
        let s = tagged_sentence();
        let mut arena = Arena::new();
        let out = materialize(&s, &mut arena, Annotation::Tagged).unwrap();
        let ids: Vec<_> = out.tokens().iter().map(Token::id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(out.tokens()[1].form(), "run");
        assert_eq!(out.tokens()[1].upos(), "VERB");
        assert_eq!(out.tokens()[1].span(), Some(5..8));
    }

    #[test]
    fn test_non_positive_ids_are_filtered() {
        let mut s = tagged_sentence();
        s.words.push(Word::new(-3, "artifact"));
        let mut arena = Arena::new();
        let out = materialize(&s, &mut arena, Annotation::Tagged).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_tokens_only_blanks_annotations() {
        let mut s = tagged_sentence();
        s.words[1].head = 2;
        let mut arena = Arena::new();
        let out = materialize(&s, &mut arena, Annotation::TokensOnly).unwrap();
        for t in out.tokens() {
            assert_eq!(t.head(), HEAD_NOT_COMPUTED);
            assert_eq!(t.lemma(), "");
            assert_eq!(t.upos(), "");
            assert_eq!(t.xpostag(), "");
            assert_eq!(t.feats(), "");
            assert_eq!(t.deprel(), "");
        }
        assert_eq!(out.tokens()[0].form(), "Dogs");
    }

    #[test]
    fn test_tagged_copies_head_verbatim() {
        let mut s = tagged_sentence();
        s.words[1].head = 2;
        s.words[2].head = 0;
        s.words[2].deprel = "root".into();
        let mut arena = Arena::new();
        let out = materialize(&s, &mut arena, Annotation::Tagged).unwrap();
        assert_eq!(out.tokens()[0].head(), 2);
        assert_eq!(out.tokens()[1].head(), 0);
        assert_eq!(out.tokens()[1].deprel(), "root");
        assert_eq!(out.tokens()[2].head(), HEAD_NOT_COMPUTED);
    }

    #[test]
    fn test_missing_range_is_zero_zero() {
        let mut s = tagged_sentence();
        s.words[2].range = None;
        let mut arena = Arena::new();
        let out = materialize(&s, &mut arena, Annotation::Tagged).unwrap();
        let t = &out.tokens()[1];
        assert_eq!((t.start(), t.end()), (0, 0));
        assert_eq!(t.span(), None);
    }

    #[test]
    fn test_root_only_sentence_is_empty_not_error() {
        let s = EngineSentence::new();
        let mut arena = Arena::new();
        let out = materialize(&s, &mut arena, Annotation::Tagged).unwrap();
        assert!(out.is_empty());
    }
}
