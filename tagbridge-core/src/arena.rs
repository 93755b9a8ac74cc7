//! Bump-pointer string arena
//!
//! Every string reachable from a [`Document`](crate::Document) lives in the
//! document's arena. The arena hands out [`ArenaStr`] pointers to
//! NUL-terminated copies; those pointers never move and stay valid until the
//! arena itself is dropped. Individual strings are never freed.
//!
//! Blocks are allocated directly from the global allocator so that an
//! allocation failure is observable. When that happens the arena degrades to a
//! shared static empty string instead of failing the conversion, and counts
//! the event in [`Arena::fallback_count`].

use std::alloc::{self, Layout};
use std::ffi::{c_char, CStr};
use std::fmt;
use std::ptr::{self, NonNull};

/// Default size of an arena block in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Largest block size a configuration may ask for (1 GiB)
pub const MAX_BLOCK_SIZE: usize = 1 << 30;

/// Every allocation starts at a pointer-aligned offset
const ALIGN: usize = std::mem::align_of::<usize>();

static EMPTY: [c_char; 1] = [0];

/// Stable pointer to a NUL-terminated UTF-8 string owned by an [`Arena`]
///
/// The layout is a single non-null `const char*`, so token records holding
/// these can be handed across a C boundary as they are.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ArenaStr(NonNull<c_char>);

// SAFETY: the pointee is never written after allocation, and dereferencing is
// only possible inside this crate while the owning arena is borrowed.
unsafe impl Send for ArenaStr {}
unsafe impl Sync for ArenaStr {}

impl ArenaStr {
    /// The process-wide static empty string
    pub fn empty_static() -> Self {
        ArenaStr(NonNull::from(&EMPTY[0]))
    }

    /// Raw pointer to the first byte of the string
    pub fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr()
    }

    /// Whether this is the static empty string used as allocation fallback
    pub fn is_static_empty(&self) -> bool {
        ptr::eq(self.as_ptr(), &EMPTY[0])
    }

    /// Read the string.
    ///
    /// # Safety
    ///
    /// The arena that produced this pointer must still be alive for `'a`.
    pub(crate) unsafe fn as_str<'a>(&self) -> &'a str {
        // SAFETY: the caller guarantees the backing block is alive; every
        // arena string is a copy of a `&str` followed by a NUL byte, so the
        // bytes up to the first NUL are valid UTF-8.
        let cstr = unsafe { CStr::from_ptr(self.as_ptr()) };
        cstr.to_str().unwrap_or_default()
    }
}

impl fmt::Debug for ArenaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArenaStr").field(&self.0).finish()
    }
}

/// One allocation from the global allocator
///
/// Every byte below `filled` has been written: strings, their NUL
/// terminators and the zeroed alignment padding between them.
struct Block {
    ptr: NonNull<u8>,
    size: usize,
    filled: usize,
}

impl Block {
    fn layout(size: usize) -> Option<Layout> {
        Layout::from_size_align(size, ALIGN).ok()
    }

    fn allocate(size: usize) -> Option<Self> {
        let layout = Self::layout(size)?;
        // SAFETY: `size` is at least 1 (every request includes the NUL byte).
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw).map(|ptr| Block {
            ptr,
            size,
            filled: 0,
        })
    }

    /// Copy `text` and a NUL byte to the next aligned offset, if it fits
    fn write(&mut self, text: &str) -> Option<NonNull<c_char>> {
        let start = align_up(self.filled);
        let end = start.checked_add(text.len() + 1)?;
        if end > self.size {
            return None;
        }

        // SAFETY: `filled <= start < end <= size`, so every write stays inside
        // the block; the region past `filled` has never been handed out, and
        // `text` cannot overlap a block we own exclusively.
        let dst = unsafe {
            let base = self.ptr.as_ptr();
            ptr::write_bytes(base.add(self.filled), 0, start - self.filled);
            let dst = base.add(start);
            ptr::copy_nonoverlapping(text.as_ptr(), dst, text.len());
            dst.add(text.len()).write(0);
            dst
        };
        self.filled = end;
        NonNull::new(dst.cast::<c_char>())
    }

    /// Whether `p` points into the written part of this block
    fn contains(&self, p: *const c_char) -> bool {
        let start = self.ptr.as_ptr() as usize;
        let addr = p as usize;
        addr >= start && addr - start < self.filled
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        if let Some(layout) = Self::layout(self.size) {
            // SAFETY: the block was allocated with exactly this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

/// Append-only string pool backing one document
pub struct Arena {
    blocks: Vec<Block>,
    block_size: usize,
    used: usize,
    fallbacks: usize,
}

// SAFETY: the arena exclusively owns its blocks; the raw pointers are never
// shared with another arena and shared access only reads.
unsafe impl Send for Arena {}
unsafe impl Sync for Arena {}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Create an arena with the default block size
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Create an arena whose blocks are at least `block_size` bytes
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_size: block_size.max(1),
            used: 0,
            fallbacks: 0,
        }
    }

    /// Copy `text` into the arena and return a stable pointer to it
    pub fn allocate(&mut self, text: &str) -> ArenaStr {
        let required = text.len() + 1;
        if let Some(dst) = self.blocks.last_mut().and_then(|block| block.write(text)) {
            self.used += required;
            return ArenaStr(dst);
        }

        let size = self.block_size.max(required);
        let Some(mut block) = Block::allocate(size) else {
            self.fallbacks += 1;
            tracing::warn!(
                requested = size,
                "arena block allocation failed, using static empty string"
            );
            return ArenaStr::empty_static();
        };
        let dst = block.write(text);
        self.blocks.push(block);
        match dst {
            Some(dst) => {
                self.used += required;
                ArenaStr(dst)
            }
            None => ArenaStr::empty_static(),
        }
    }

    /// Allocate an empty string
    pub fn allocate_empty(&mut self) -> ArenaStr {
        self.allocate("")
    }

    /// Read back a string, if it was allocated by this arena.
    ///
    /// Pointers outside the written part of every block, including those of
    /// arenas already dropped, resolve to `None`.
    pub fn resolve(&self, text: &ArenaStr) -> Option<&str> {
        let owned = text.is_static_empty()
            || self.blocks.iter().any(|block| block.contains(text.as_ptr()));
        // SAFETY: the pointer lies in the written part of a live block (or is
        // the static empty string). That part is fully initialized and ends
        // with a NUL byte, so the read stops inside it; `&self` keeps the
        // block alive.
        owned.then(|| unsafe { text.as_str() })
    }

    /// Number of blocks allocated so far
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes handed out, including NUL terminators but not alignment padding
    pub fn bytes_used(&self) -> usize {
        self.used
    }

    /// Number of allocations that degraded to the static empty string
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }

    /// Free every block at once. Equivalent to dropping the arena.
    pub fn release(self) {
        drop(self);
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("blocks", &self.blocks.len())
            .field("block_size", &self.block_size)
            .field("bytes_used", &self.used)
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}

fn align_up(offset: usize) -> usize {
    offset.next_multiple_of(ALIGN)
}
