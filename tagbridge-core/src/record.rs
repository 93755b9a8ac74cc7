//! Flat output records
//!
//! Ownership is a strict tree: a [`Batch`] owns its documents, a [`Document`]
//! owns its sentences and the [`Arena`] holding every string, a [`Sentence`]
//! owns its token array. Records are only ever handed out by reference from
//! their owner, so a `&str` read from a token can never outlive the arena.

use crate::arena::{Arena, ArenaStr};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::ops::Range;

/// Head value meaning "the parser did not run"
pub const HEAD_NOT_COMPUTED: i32 = -1;

/// Head value of the sentence root
pub const ROOT_HEAD: i32 = 0;

/// One word of output
///
/// The layout is `#[repr(C)]` so a sentence's token array can be passed to a
/// C host without conversion.
#[repr(C)]
#[derive(Debug)]
pub struct Token {
    id: i32,
    head: i32,
    form: ArenaStr,
    lemma: ArenaStr,
    upos: ArenaStr,
    xpostag: ArenaStr,
    feats: ArenaStr,
    deprel: ArenaStr,
    start: usize,
    end: usize,
}

/// Strings of one token, already interned in the document's arena
pub(crate) struct TokenStrings {
    pub form: ArenaStr,
    pub lemma: ArenaStr,
    pub upos: ArenaStr,
    pub xpostag: ArenaStr,
    pub feats: ArenaStr,
    pub deprel: ArenaStr,
}

impl Token {
    pub(crate) fn new(id: i32, head: i32, strings: TokenStrings, start: usize, end: usize) -> Self {
        Self {
            id,
            head,
            form: strings.form,
            lemma: strings.lemma,
            upos: strings.upos,
            xpostag: strings.xpostag,
            feats: strings.feats,
            deprel: strings.deprel,
            start,
            end,
        }
    }

    fn read(&self, s: &ArenaStr) -> &str {
        // SAFETY: tokens are only reachable through the document that owns
        // both them and the arena their strings point into.
        unsafe { s.as_str() }
    }

    /// 1-based sentence-local id
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Raw head id: 0 for the root, [`HEAD_NOT_COMPUTED`] without parsing
    pub fn head(&self) -> i32 {
        self.head
    }

    /// Head id, or `None` when it was not computed
    pub fn head_id(&self) -> Option<i32> {
        (self.head != HEAD_NOT_COMPUTED).then_some(self.head)
    }

    /// Surface form
    pub fn form(&self) -> &str {
        self.read(&self.form)
    }

    /// Lemma, empty when not computed
    pub fn lemma(&self) -> &str {
        self.read(&self.lemma)
    }

    /// Universal POS tag, empty when not computed
    pub fn upos(&self) -> &str {
        self.read(&self.upos)
    }

    /// Language-specific POS tag, empty when not computed
    pub fn xpostag(&self) -> &str {
        self.read(&self.xpostag)
    }

    /// Morphological features, empty when not computed
    pub fn feats(&self) -> &str {
        self.read(&self.feats)
    }

    /// Dependency relation, empty when not computed
    pub fn deprel(&self) -> &str {
        self.read(&self.deprel)
    }

    /// Raw start byte offset; 0 together with `end() == 0` means unknown
    pub fn start(&self) -> usize {
        self.start
    }

    /// Raw end byte offset (exclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Byte range in the input, or `None` when the engine could not report it
    ///
    /// The 0/0 pair is a "missing" sentinel, never a real empty span.
    pub fn span(&self) -> Option<Range<usize>> {
        (self.start != 0 || self.end != 0).then_some(self.start..self.end)
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Token", 10)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("head", &self.head)?;
        state.serialize_field("form", self.form())?;
        state.serialize_field("lemma", self.lemma())?;
        state.serialize_field("upos", self.upos())?;
        state.serialize_field("xpostag", self.xpostag())?;
        state.serialize_field("feats", self.feats())?;
        state.serialize_field("deprel", self.deprel())?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.end()
    }
}

/// One sentence of output
#[derive(Debug, Default)]
pub struct Sentence {
    tokens: Box<[Token]>,
}

impl Sentence {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_boxed_slice(),
        }
    }

    /// Tokens in original word order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token survived filtering
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Serialize for Sentence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tokens.iter())
    }
}

/// One processed input text
#[derive(Debug)]
pub struct Document {
    sentences: Vec<Sentence>,
    arena: Arena,
}

impl Document {
    pub(crate) fn new(sentences: Vec<Sentence>, arena: Arena) -> Self {
        Self { sentences, arena }
    }

    /// Sentences in input order
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Number of sentences
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Total number of tokens over all sentences
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }

    /// Iterate over every token in document order
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens().iter())
    }

    /// The arena owning every string of this document
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Tear the document down: the arena, every token array and the
    /// sentence array are freed together.
    pub fn release(self) {
        drop(self);
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Document", 1)?;
        state.serialize_field("sentences", &self.sentences)?;
        state.end()
    }
}

/// Documents of one batch, index-aligned with the input texts
#[derive(Debug, Default)]
pub struct Batch {
    documents: Vec<Document>,
}

impl Batch {
    pub(crate) fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Documents in input order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Take ownership of the documents
    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// Release every document, then the batch itself
    pub fn release(self) {
        for document in self.documents {
            document.release();
        }
    }
}

impl Serialize for Batch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.documents.iter())
    }
}
