//! Handle registries
//!
//! Every object handed across the boundary is owned by a registry and named
//! by a `u64` id. Ids start at 1 and are never reused, so a stale or forged
//! id finds nothing instead of freed memory.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The id no object ever has
pub const NULL_HANDLE: u64 = 0;

pub(crate) struct Registry<T> {
    next: AtomicU64,
    entries: Mutex<BTreeMap<u64, T>>,
}

impl<T> Registry<T> {
    pub(crate) const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, T>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, value: T) -> u64 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, value);
        id
    }

    pub(crate) fn remove(&self, id: u64) -> Option<T> {
        if id == NULL_HANDLE {
            return None;
        }
        self.lock().remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

impl<T: Clone> Registry<T> {
    pub(crate) fn get(&self, id: u64) -> Option<T> {
        self.lock().get(&id).cloned()
    }
}
