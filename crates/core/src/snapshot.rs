//! Immutable point-in-time copies of a collection's contents
//!
//! A [`Snapshot`] is taken under the owning collection's lock and never
//! changes afterward. Clones share the same allocation.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Immutable, fixed-length, ordered copy of a sequence.
pub struct Snapshot<T> {
    items: Arc<[T]>,
}

impl<T> Snapshot<T> {
    /// Snapshot holding no elements
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    /// Number of elements captured
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing was captured
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`, if captured
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Captured elements as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Check whether two snapshots share the same allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl<T: Clone> Snapshot<T> {
    /// Copy `items` into a new snapshot
    pub fn from_slice(items: &[T]) -> Self {
        Self {
            items: Arc::from(items),
        }
    }

    /// Copy the captured elements into a `Vec`
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }
}

impl<T> From<Vec<T>> for Snapshot<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Snapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items[..] == other.items[..]
    }
}

impl<T: Eq> Eq for Snapshot<T> {}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
