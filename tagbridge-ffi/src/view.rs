//! `#[repr(C)]` views over documents and batches

use crate::registry::{Registry, NULL_HANDLE};
use std::ptr;
use tagbridge_core::{Batch, Document, Sentence, Token};

/// Tokens of one sentence, pointing straight into the document
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbSentenceView {
    /// First token, null when `count` is 0
    pub tokens: *const Token,
    /// Number of tokens
    pub count: usize,
}

/// A document handed to C; release with `tb_free_doc`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbDocView {
    /// First sentence, null when `count` is 0
    pub sentences: *const TbSentenceView,
    /// Number of sentences
    pub count: usize,
    /// Registry id owning the document, 0 once released
    pub handle: u64,
}

/// An index-aligned batch of documents; release with `tb_free_batch`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TbBatchView {
    /// First document, null when `count` is 0
    pub docs: *mut TbDocView,
    /// Number of documents
    pub count: usize,
    /// Registry id owning the document array, 0 once released
    pub handle: u64,
}

impl TbDocView {
    /// The empty view every failure leaves behind
    pub const fn zeroed() -> Self {
        Self {
            sentences: ptr::null(),
            count: 0,
            handle: NULL_HANDLE,
        }
    }
}

impl TbBatchView {
    /// The empty view every failure leaves behind
    pub const fn zeroed() -> Self {
        Self {
            docs: ptr::null_mut(),
            count: 0,
            handle: NULL_HANDLE,
        }
    }
}

impl TbSentenceView {
    fn of(sentence: &Sentence) -> Self {
        let tokens = sentence.tokens();
        Self {
            tokens: if tokens.is_empty() { ptr::null() } else { tokens.as_ptr() },
            count: tokens.len(),
        }
    }
}

/// A boxed slice kept as a raw pointer so C may read and write through it
struct RawSlice<T> {
    ptr: *mut T,
    len: usize,
}

impl<T> RawSlice<T> {
    fn new(items: Vec<T>) -> Self {
        let len = items.len();
        let ptr = Box::into_raw(items.into_boxed_slice()).cast::<T>();
        Self { ptr, len }
    }

    fn as_ptr(&self) -> *mut T {
        if self.len == 0 {
            ptr::null_mut()
        } else {
            self.ptr
        }
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        // SAFETY: ptr/len come from a live boxed slice owned by self
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }.iter()
    }
}

impl<T> Drop for RawSlice<T> {
    fn drop(&mut self) {
        // SAFETY: reconstitutes the box leaked in `new`, exactly once
        drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(self.ptr, self.len)) });
    }
}

// SAFETY: the pointees are plain data owned by the slice; C callers must not
// use one view from several threads while it is being released
unsafe impl<T> Send for RawSlice<T> {}

struct OwnedDocument {
    _views: RawSlice<TbSentenceView>,
    _document: Document,
}

struct OwnedBatch {
    docs: RawSlice<TbDocView>,
}

static DOCUMENTS: Registry<OwnedDocument> = Registry::new();
static BATCHES: Registry<OwnedBatch> = Registry::new();

/// Register `document` and describe it for C
pub(crate) fn publish_document(document: Document) -> TbDocView {
    let views = RawSlice::new(document.sentences().iter().map(TbSentenceView::of).collect());
    let sentences = views.as_ptr().cast_const();
    let count = views.len;
    let handle = DOCUMENTS.insert(OwnedDocument {
        _views: views,
        _document: document,
    });
    TbDocView {
        sentences,
        count,
        handle,
    }
}

/// Register every document of `batch` and the array describing them
pub(crate) fn publish_batch(batch: Batch) -> TbBatchView {
    let docs = RawSlice::new(batch.into_documents().into_iter().map(publish_document).collect());
    let ptr = docs.as_ptr();
    let count = docs.len;
    let handle = BATCHES.insert(OwnedBatch { docs });
    TbBatchView { docs: ptr, count, handle }
}

/// Drop the document behind `handle`; false when nothing was registered
pub(crate) fn release_document(handle: u64) -> bool {
    DOCUMENTS.remove(handle).is_some()
}

/// Drop every document of the batch behind `handle`, then its array
pub(crate) fn release_batch(handle: u64) -> bool {
    let Some(batch) = BATCHES.remove(handle) else {
        return false;
    };
    // Slots already released through tb_free_doc hold handle 0
    for doc in batch.docs.iter() {
        release_document(doc.handle);
    }
    true
}

/// Live objects per registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveHandles {
    /// Loaded models
    pub models: usize,
    /// Published documents, including those inside batches
    pub documents: usize,
    /// Published batches
    pub batches: usize,
}

pub(crate) fn live_documents() -> (usize, usize) {
    (DOCUMENTS.len(), BATCHES.len())
}
