//! Memoized results derived from one graph snapshot.
//!
//! Each [`InteractionGraph`](crate::graph::InteractionGraph) owns exactly one
//! [`DerivedCache`]. The snapshot never mutates, so entries stay valid for its
//! whole lifetime; building a new snapshot starts from an empty cache. Entries
//! are keyed by a string that must encode every parameter the computation
//! depends on (e.g. `"communities:passes=10"`).

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

type Slot = Arc<dyn Any + Send + Sync>;

/// Type-erased, thread-safe memo table.
#[derive(Default)]
pub struct DerivedCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl DerivedCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `compute` on a
    /// miss.
    ///
    /// The lock is not held while `compute` runs, so two threads racing on
    /// the same key may both compute; the first insert wins and both get
    /// the same `Arc` back afterwards. A stored value of a different type
    /// under the same key is replaced.
    pub fn get_or_compute<T, F>(&self, key: &str, compute: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.lookup::<T>(key) {
            debug!(key, "derived cache hit");
            return hit;
        }

        let fresh: Arc<T> = Arc::new(compute());
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slots
            .get(key)
            .and_then(|slot| Arc::clone(slot).downcast::<T>().ok())
        {
            return existing;
        }
        slots.insert(key.to_string(), Arc::clone(&fresh) as Slot);
        debug!(key, "derived cache filled");
        fresh
    }

    fn lookup<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(key)
            .and_then(|slot| Arc::clone(slot).downcast::<T>().ok())
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry at once.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for DerivedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn computes_once_per_key() {
        let cache = DerivedCache::new();
        let calls = Cell::new(0);

        let a = cache.get_or_compute("answer", || {
            calls.set(calls.get() + 1);
            42_u32
        });
        let b = cache.get_or_compute("answer", || {
            calls.set(calls.get() + 1);
            0_u32
        });

        assert_eq!(*a, 42);
        assert_eq!(*b, 42);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let cache = DerivedCache::new();
        let a = cache.get_or_compute("passes=1", || vec![1_u8]);
        let b = cache.get_or_compute("passes=2", || vec![2_u8]);
        assert_eq!(*a, vec![1]);
        assert_eq!(*b, vec![2]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_empties_everything() {
        let cache = DerivedCache::new();
        cache.get_or_compute("x", || 1_i32);
        cache.get_or_compute("y", || 2_i32);
        cache.clear();
        assert!(cache.is_empty());
        let again = cache.get_or_compute("x", || 3_i32);
        assert_eq!(*again, 3);
    }

    #[test]
    fn type_mismatch_recomputes() {
        let cache = DerivedCache::new();
        cache.get_or_compute("k", || 1_i32);
        let s = cache.get_or_compute("k", || String::from("text"));
        assert_eq!(s.as_str(), "text");
    }
}
