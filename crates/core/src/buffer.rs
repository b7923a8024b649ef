//! Growable, index-addressable element storage
//!
//! `MemoryBuffer` is the storage every collection in this workspace is built
//! on. It exposes list primitives (get/set/insert/remove/search) with
//! bounds-checked, `Result`-returning variants so callers never panic on a
//! bad index.
//!
//! # Growth
//!
//! Capacity doubles when full, starting from [`MemoryBuffer::MIN_CAPACITY`],
//! giving amortized O(1) `push`.

use crate::error::{check_index, check_insert_index, check_range, Error, Result};
use std::ops::Range;

/// Owned, contiguous, growable storage.
///
/// Invariant: indices `[0, len())` are valid, and `len()` is the number of
/// live elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBuffer<T> {
    items: Vec<T>,
}

impl<T> MemoryBuffer<T> {
    /// Smallest non-zero capacity allocated on first growth
    pub const MIN_CAPACITY: usize = 4;

    /// Create an empty buffer without allocating
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create a buffer with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of live elements
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Allocated capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// View of the live elements
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Mutable view of the live elements
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Result<&T> {
        check_index(index, self.len())?;
        Ok(&self.items[index])
    }

    /// Replace the element at `index`, returning the previous value
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        check_index(index, self.len())?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    /// Append one element, returning its index
    pub fn push(&mut self, value: T) -> usize {
        self.grow_for(1);
        self.items.push(value);
        self.items.len() - 1
    }

    /// Append all `values`, returning the index of the first one
    pub fn append(&mut self, values: Vec<T>) -> usize {
        let start = self.items.len();
        self.grow_for(values.len());
        self.items.extend(values);
        start
    }

    /// Insert at `index`, shifting later elements right
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        check_insert_index(index, self.len())?;
        self.grow_for(1);
        self.items.insert(index, value);
        Ok(())
    }

    /// Insert all `values` starting at `index`
    pub fn insert_many(&mut self, index: usize, values: Vec<T>) -> Result<()> {
        check_insert_index(index, self.len())?;
        self.grow_for(values.len());
        self.items.splice(index..index, values);
        Ok(())
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_index(index, self.len())?;
        Ok(self.items.remove(index))
    }

    /// Remove `count` elements starting at `start`
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<Vec<T>> {
        check_range(start, count, self.len())?;
        Ok(self.items.drain(start..start + count).collect())
    }

    /// Remove every element matching `pred`, returning them in order
    ///
    /// `pred` runs over every element before anything moves, so a panicking
    /// predicate leaves the buffer untouched.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let hits: Vec<bool> = self.items.iter().map(|item| pred(item)).collect();
        if !hits.contains(&true) {
            return Vec::new();
        }
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for (item, hit) in self.items.drain(..).zip(hits) {
            if hit {
                removed.push(item);
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        removed
    }

    /// Drop all elements, keeping capacity
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Index of the first element in `start..start + count` matching `pred`
    pub fn position_in<F>(&self, start: usize, count: usize, mut pred: F) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        check_range(start, count, self.len())?;
        Ok(self.items[start..start + count]
            .iter()
            .position(|item| pred(item))
            .map(|i| i + start))
    }

    /// Index of the last element in `start..start + count` matching `pred`
    pub fn rposition_in<F>(&self, start: usize, count: usize, mut pred: F) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        check_range(start, count, self.len())?;
        Ok(self.items[start..start + count]
            .iter()
            .rposition(|item| pred(item))
            .map(|i| i + start))
    }

    /// Reverse element order in place
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    /// Move the element at `from` so it ends up at `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.len();
        check_index(from, len)?;
        check_index(to, len)?;
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    /// Iterate the live elements
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consume the buffer, returning its elements
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    fn grow_for(&mut self, additional: usize) {
        let required = self.items.len() + additional;
        if required <= self.items.capacity() {
            return;
        }
        let doubled = (self.items.capacity() * 2).max(Self::MIN_CAPACITY);
        let target = doubled.max(required);
        self.items.reserve_exact(target - self.items.len());
    }
}

impl<T: Clone> MemoryBuffer<T> {
    /// Append a copy of every element in `values`
    ///
    /// An empty `values` is rejected; a bulk write must carry data.
    pub fn write(&mut self, values: &[T]) -> Result<Range<usize>> {
        if values.is_empty() {
            return Err(Error::ArgumentInvalid("empty buffer write".into()));
        }
        let start = self.items.len();
        self.grow_for(values.len());
        self.items.extend_from_slice(values);
        Ok(start..self.items.len())
    }

    /// Copy `count` elements starting at `start` into `dest[offset..]`
    ///
    /// Both ranges are validated before anything is written.
    pub fn copy_to(&self, start: usize, dest: &mut [T], offset: usize, count: usize) -> Result<()> {
        check_range(start, count, self.len())?;
        check_range(offset, count, dest.len())?;
        dest[offset..offset + count].clone_from_slice(&self.items[start..start + count]);
        Ok(())
    }
}

impl<T> Default for MemoryBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for MemoryBuffer<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for MemoryBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
