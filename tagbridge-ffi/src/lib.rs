//! C ABI for tagbridge
//!
//! Every entry point is `tb_`-prefixed. Handles are registry ids, never
//! pointers: an id that was freed or never issued is rejected instead of
//! dereferenced. No panic and no Rust error crosses the boundary; failures
//! return `false`, `0` or an `ERROR: ` string, and a failed structured call
//! leaves its output zeroed so that releasing it is a no-op.
//!
//! See `include/tagbridge.h` for the C declarations.

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

mod error;
mod model;
mod registry;
mod view;

pub use registry::NULL_HANDLE;
pub use tagbridge_core::{Token as TbToken, HEAD_NOT_COMPUTED, ROOT_HEAD};
pub use view::{LiveHandles, TbBatchView, TbDocView, TbSentenceView};

use error::{BoundaryError, Result};
use std::ffi::{c_char, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use tagbridge_core::{tag_as_text, tag_batch, tag_structured, tokenize_structured, ERROR_PREFIX};

/// Model handle as seen from C
pub type TbModel = u64;

const VERSION_BYTES: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();

const VERSION: &CStr = match CStr::from_bytes_with_nul(VERSION_BYTES) {
    Ok(version) => version,
    Err(_) => c"",
};

/// Run `f`, turning a panic into an error
fn call<T>(entry: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        tracing::error!(entry, "panic caught at the boundary");
        Err(BoundaryError::Panic(entry))
    })
}

/// Run `f`, logging any failure and returning `fallback` instead
fn guard<T>(entry: &'static str, fallback: T, f: impl FnOnce() -> Result<T>) -> T {
    call(entry, f).unwrap_or_else(|err| {
        tracing::warn!(entry, error = %err, "call failed");
        fallback
    })
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`
unsafe fn str_arg<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(BoundaryError::Null(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| BoundaryError::InvalidUtf8(name))
}

fn into_c_string(text: String) -> *mut c_char {
    let mut bytes = text.into_bytes();
    bytes.retain(|&b| b != 0);
    CString::new(bytes).map_or(ptr::null_mut(), CString::into_raw)
}

/// Library version, valid for the life of the process
#[no_mangle]
pub extern "C" fn tb_version() -> *const c_char {
    VERSION.as_ptr()
}

/// Route log events to stderr through `env_logger`.
///
/// `RUST_LOG` wins when set; otherwise `filter` (e.g. `"debug"`,
/// `"tagbridge_core=trace"`) applies, `"warn"` when null. Returns false if a
/// logger was already installed.
///
/// # Safety
/// `filter` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn tb_init_logging(filter: *const c_char) -> bool {
    let filter = if filter.is_null() {
        "warn"
    } else {
        unsafe { str_arg(filter, "filter") }.unwrap_or("warn")
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init()
        .is_ok()
}

/// Load a model file. Returns [`NULL_HANDLE`] on failure.
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn tb_model_load(path: *const c_char) -> TbModel {
    unsafe { tb_model_load_with_config(path, ptr::null()) }
}

/// Load a model file together with a bridge settings file (TOML: `arena_block_size`,
/// `max_threads`, `tokenizer_options`). A null `config_path` means defaults.
///
/// # Safety
/// `path` and `config_path` must each be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn tb_model_load_with_config(
    path: *const c_char,
    config_path: *const c_char,
) -> TbModel {
    guard("tb_model_load", NULL_HANDLE, || {
        let path = unsafe { str_arg(path, "model path") }?;
        let config_path = if config_path.is_null() {
            None
        } else {
            Some(unsafe { str_arg(config_path, "config path") }?)
        };
        model::load(path, config_path)
    })
}

/// Release a model. Unknown handles and [`NULL_HANDLE`] are ignored.
#[no_mangle]
pub extern "C" fn tb_model_free(model: TbModel) {
    if model::free(model) {
        tracing::debug!(handle = model, "model released");
    }
}

/// Tag `text` and return it as CoNLL-U, or a string starting with `ERROR: `.
///
/// Release the result with [`tb_string_free`]. Null only if the result could
/// not be allocated.
///
/// # Safety
/// `text` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn tb_tag_conllu(model: TbModel, text: *const c_char) -> *mut c_char {
    let result = call("tb_tag_conllu", || {
        let text = unsafe { str_arg(text, "text") }?;
        let loaded = model::lookup(model)?;
        Ok(tag_as_text(&loaded.model, text, &loaded.config))
    });
    let text = result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "tb_tag_conllu failed");
        format!("{ERROR_PREFIX}{err}")
    });
    into_c_string(text)
}

/// Release a string returned by [`tb_tag_conllu`]; null is ignored.
///
/// # Safety
/// `text` must be null or a pointer returned by [`tb_tag_conllu`] that has not
/// been released yet.
#[no_mangle]
pub unsafe extern "C" fn tb_string_free(text: *mut c_char) {
    if !text.is_null() {
        drop(unsafe { CString::from_raw(text) });
    }
}

/// # Safety
/// `out` must be null or valid for writes.
unsafe fn structured(
    entry: &'static str,
    out: *mut TbDocView,
    f: impl FnOnce() -> Result<tagbridge_core::Document>,
) -> bool {
    if out.is_null() {
        tracing::warn!(entry, "output view is null");
        return false;
    }
    unsafe { out.write(TbDocView::zeroed()) };
    match guard(entry, None, || f().map(|doc| Some(view::publish_document(doc)))) {
        Some(view) => {
            unsafe { out.write(view) };
            true
        }
        None => false,
    }
}

/// Tokenize, tag and optionally parse `text` into `*out`.
///
/// On failure returns false and `*out` is zeroed. The previous contents of
/// `*out` are overwritten, not released.
///
/// # Safety
/// `text` must be null or a NUL-terminated string; `out` must be null or valid
/// for writes.
#[no_mangle]
pub unsafe extern "C" fn tb_tag_structured(
    model: TbModel,
    text: *const c_char,
    parse: bool,
    out: *mut TbDocView,
) -> bool {
    unsafe {
        structured("tb_tag_structured", out, || {
            let text = str_arg(text, "text")?;
            let loaded = model::lookup(model)?;
            Ok(tag_structured(&loaded.model, text, parse, &loaded.config)?)
        })
    }
}

/// Tokenize `text` into `*out` with the given tokenizer options (null or
/// empty for defaults). Linguistic fields are empty and heads are -1.
///
/// # Safety
/// `text` and `options` must each be null or a NUL-terminated string; `out`
/// must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn tb_tokenize_structured(
    model: TbModel,
    text: *const c_char,
    options: *const c_char,
    out: *mut TbDocView,
) -> bool {
    unsafe {
        structured("tb_tokenize_structured", out, || {
            let text = str_arg(text, "text")?;
            let options = if options.is_null() { "" } else { str_arg(options, "options")? };
            let loaded = model::lookup(model)?;
            Ok(tokenize_structured(&loaded.model, text, options, &loaded.config)?)
        })
    }
}

/// Release a document and zero `*doc`. Null, zeroed or already released
/// views are ignored.
///
/// # Safety
/// `doc` must be null or point to a view written by this library.
#[no_mangle]
pub unsafe extern "C" fn tb_free_doc(doc: *mut TbDocView) {
    if doc.is_null() {
        return;
    }
    let handle = unsafe { (*doc).handle };
    view::release_document(handle);
    unsafe { doc.write(TbDocView::zeroed()) };
}

/// Tag `count` texts in parallel into `*out`, index-aligned with `texts`.
///
/// Any failing text fails the whole call: false is returned, `*out` is zeroed
/// and no document survives.
///
/// # Safety
/// `texts` must point to `count` pointers, each null or a NUL-terminated
/// string (it may be null when `count` is 0); `out` must be null or valid for
/// writes.
#[no_mangle]
pub unsafe extern "C" fn tb_tag_batch(
    model: TbModel,
    texts: *const *const c_char,
    count: usize,
    parse: bool,
    out: *mut TbBatchView,
) -> bool {
    if out.is_null() {
        tracing::warn!("tb_tag_batch: output view is null");
        return false;
    }
    unsafe { out.write(TbBatchView::zeroed()) };

    let view = guard("tb_tag_batch", None, || {
        let raw: &[*const c_char] = match (texts.is_null(), count) {
            (_, 0) => &[],
            (true, _) => return Err(BoundaryError::Null("texts")),
            (false, n) => unsafe { std::slice::from_raw_parts(texts, n) },
        };
        let texts = raw
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                unsafe { str_arg(p, "text") }.map_err(|_| BoundaryError::InvalidBatchText(i))
            })
            .collect::<Result<Vec<&str>>>()?;
        let loaded = model::lookup(model)?;
        let batch = tag_batch(&loaded.model, &texts, parse, &loaded.config)?;
        Ok(Some(view::publish_batch(batch)))
    });

    match view {
        Some(view) => {
            unsafe { out.write(view) };
            true
        }
        None => false,
    }
}

/// Release every document of a batch, then the batch, and zero `*batch`.
///
/// Documents already released one by one through [`tb_free_doc`] are skipped.
/// Null, zeroed or already released views are ignored.
///
/// # Safety
/// `batch` must be null or point to a view written by this library.
#[no_mangle]
pub unsafe extern "C" fn tb_free_batch(batch: *mut TbBatchView) {
    if batch.is_null() {
        return;
    }
    let handle = unsafe { (*batch).handle };
    view::release_batch(handle);
    unsafe { batch.write(TbBatchView::zeroed()) };
}

/// Objects currently alive behind handles
pub fn live_handles() -> LiveHandles {
    let (documents, batches) = view::live_documents();
    LiveHandles {
        models: model::live(),
        documents,
        batches,
    }
}
