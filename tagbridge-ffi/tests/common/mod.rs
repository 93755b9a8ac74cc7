//! Helpers for driving the C interface from Rust

#![allow(dead_code)]

use std::ffi::{c_char, CStr, CString};
use std::io::Write;
use tagbridge::*;

pub const STRICT_MODEL: &str = r#"
[model]
name = "strict"

[tagger]
strict = true

[lexicon]
dogs = { lemma = "dog", upos = "NOUN" }
cats = { lemma = "cat", upos = "NOUN" }
run = { lemma = "run", upos = "VERB" }
"#;

pub fn demo_model_path() -> CString {
    CString::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../tagbridge-lexicon/models/en-demo.toml"
    ))
    .unwrap()
}

pub fn load_demo() -> TbModel {
    let model = unsafe { tb_model_load(demo_model_path().as_ptr()) };
    assert_ne!(model, NULL_HANDLE);
    model
}

pub fn load_strict() -> TbModel {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(STRICT_MODEL.as_bytes()).unwrap();
    let path = CString::new(file.path().to_str().unwrap()).unwrap();
    let model = unsafe { tb_model_load(path.as_ptr()) };
    assert_ne!(model, NULL_HANDLE);
    model
}

pub fn c(text: &str) -> CString {
    CString::new(text).unwrap()
}

/// A view filled with junk, to check that failures overwrite it
pub fn dirty_doc() -> TbDocView {
    TbDocView {
        sentences: std::ptr::NonNull::dangling().as_ptr(),
        count: 99,
        handle: u64::MAX,
    }
}

pub fn is_zeroed(doc: &TbDocView) -> bool {
    doc.sentences.is_null() && doc.count == 0 && doc.handle == NULL_HANDLE
}

/// # Safety
/// `doc` must be a live view written by the library
pub unsafe fn sentences(doc: &TbDocView) -> Vec<&[TbToken]> {
    if doc.count == 0 {
        return Vec::new();
    }
    let views = unsafe { std::slice::from_raw_parts(doc.sentences, doc.count) };
    views
        .iter()
        .map(|s| {
            if s.count == 0 {
                &[][..]
            } else {
                unsafe { std::slice::from_raw_parts(s.tokens, s.count) }
            }
        })
        .collect()
}

/// # Safety
/// `text` must come from `tb_tag_conllu`; it is released here
pub unsafe fn take_string(text: *mut c_char) -> String {
    assert!(!text.is_null());
    let owned = unsafe { CStr::from_ptr(text) }.to_str().unwrap().to_string();
    unsafe { tb_string_free(text) };
    owned
}
