//! ObservableCollection: mutation-notifying indexable sequence
//!
//! ## Design
//!
//! `ObservableCollection` owns a [`MemoryBuffer`], a [`Comparer`] and a
//! [`ChangeNotifier`]. It performs no locking; exclusive access comes from
//! `&mut self`. The concurrent variant wraps one of these behind a locker.
//!
//! ## Notification rules
//!
//! - Every successful structural mutation fires exactly one
//!   [`CollectionChanged`], synchronously, before the mutator returns.
//! - `clear`, `sort`, `sort_by` and `reverse` fire a single `Reset`, never
//!   per-element events. `clear` fires even when already empty.
//! - No-ops (`remove` of an absent value, `try_add` of a present one, empty
//!   range operations, `move_item` onto the same index) fire nothing.
//! - Failed operations (bad index or range) fire nothing and leave the
//!   contents unchanged.
//!
//! [`Comparer`]: lockstep_core::Comparer

use lockstep_core::comparer::{natural, SharedComparer};
use lockstep_core::error::{check_insert_index, check_range};
use lockstep_core::{
    ChangeNotifier, CollectionChanged, Error, MemoryBuffer, Result, Snapshot, SubscriptionId,
};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Outcome of [`ObservableCollection::add_or_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No equal element existed; the value was appended at this index
    Added(usize),
    /// An equal element at this index was replaced
    Updated(usize),
}

impl Upsert {
    /// Index the value ended up at
    pub fn index(&self) -> usize {
        match self {
            Upsert::Added(i) | Upsert::Updated(i) => *i,
        }
    }

    /// Whether the value was newly added
    pub fn was_added(&self) -> bool {
        matches!(self, Upsert::Added(_))
    }
}

/// Ordered, indexable, mutable sequence that broadcasts every structural change.
///
/// # Example
///
/// ```
/// use lockstep_collections::ObservableCollection;
/// use lockstep_core::ChangeAction;
/// use std::sync::{Arc, Mutex};
///
/// let mut numbers = ObservableCollection::new();
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&log);
/// numbers.subscribe(move |e| sink.lock().unwrap().push(e.action));
///
/// numbers.add(3);
/// numbers.add(1);
/// numbers.sort();
///
/// assert_eq!(numbers.as_slice(), &[1, 3]);
/// assert_eq!(
///     *log.lock().unwrap(),
///     vec![ChangeAction::Add, ChangeAction::Add, ChangeAction::Reset]
/// );
/// ```
pub struct ObservableCollection<T> {
    buffer: MemoryBuffer<T>,
    comparer: SharedComparer<T>,
    notifier: Arc<ChangeNotifier<T>>,
}

impl<T: Ord + 'static> ObservableCollection<T> {
    /// Create an empty collection ordered by `T: Ord`
    pub fn new() -> Self {
        Self::with_comparer(natural())
    }

    /// Create an empty collection with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_buffer(MemoryBuffer::with_capacity(capacity), natural())
    }
}

impl<T> ObservableCollection<T> {
    /// Create an empty collection using `comparer` for equality and ordering
    pub fn with_comparer(comparer: SharedComparer<T>) -> Self {
        Self::from_buffer(MemoryBuffer::new(), comparer)
    }

    /// Create a collection holding `items`, using `comparer`
    pub fn from_vec_with_comparer(items: Vec<T>, comparer: SharedComparer<T>) -> Self {
        Self::from_buffer(MemoryBuffer::from(items), comparer)
    }

    pub(crate) fn from_buffer(buffer: MemoryBuffer<T>, comparer: SharedComparer<T>) -> Self {
        Self {
            buffer,
            comparer,
            notifier: Arc::new(ChangeNotifier::new()),
        }
    }

    /// Shared handle to the subscriber registry
    pub(crate) fn notifier(&self) -> &Arc<ChangeNotifier<T>> {
        &self.notifier
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the collection is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Allocated capacity of the backing buffer
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Elements as a slice
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    /// Iterate the elements in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.buffer.iter()
    }

    /// Comparer used for equality and sorting
    pub fn comparer(&self) -> &SharedComparer<T> {
        &self.comparer
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Result<&T> {
        self.buffer.get(index)
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    /// Register a change handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CollectionChanged<T>) + Send + Sync + 'static,
    {
        self.notifier.subscribe(handler)
    }

    /// Remove a change handler; `false` if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Number of registered change handlers
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Check if an element equal to `value` exists
    pub fn contains(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }

    /// Index of the first element equal to `value`
    pub fn index_of(&self, value: &T) -> Option<usize> {
        let cmp = &self.comparer;
        self.buffer.iter().position(|item| cmp.equals(item, value))
    }

    /// Index of the first element equal to `value` at or after `start`
    pub fn index_of_from(&self, value: &T, start: usize) -> Result<Option<usize>> {
        let count = self.tail_count(start)?;
        self.index_of_in(value, start, count)
    }

    /// Index of the first element equal to `value` in `start..start + count`
    pub fn index_of_in(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>> {
        let cmp = &self.comparer;
        self.buffer
            .position_in(start, count, |item| cmp.equals(item, value))
    }

    /// Index of the last element equal to `value`
    pub fn last_index_of(&self, value: &T) -> Option<usize> {
        let cmp = &self.comparer;
        self.buffer.iter().rposition(|item| cmp.equals(item, value))
    }

    /// Index of the last element equal to `value` at or before `start`
    pub fn last_index_of_from(&self, value: &T, start: usize) -> Result<Option<usize>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.last_index_of_in(value, start, start.saturating_add(1))
    }

    /// Search backward over the `count` elements ending at `start`
    ///
    /// Covers indices `start + 1 - count ..= start`.
    pub fn last_index_of_in(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>> {
        let first = self.backward_range(start, count)?;
        let cmp = &self.comparer;
        self.buffer
            .rposition_in(first, count, |item| cmp.equals(item, value))
    }

    /// First element matching `pred`
    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.buffer.iter().find(|item| pred(item))
    }

    /// Last element matching `pred`
    pub fn find_last<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.buffer.iter().rev().find(|item| pred(item))
    }

    /// Index of the first element matching `pred`
    pub fn find_index<F>(&self, pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.buffer.iter().position(pred)
    }

    /// Index of the first element matching `pred` at or after `start`
    pub fn find_index_from<F>(&self, start: usize, pred: F) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        let count = self.tail_count(start)?;
        self.buffer.position_in(start, count, pred)
    }

    /// Index of the last element matching `pred`
    pub fn find_last_index<F>(&self, pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.buffer.iter().rposition(pred)
    }

    /// Check if any element matches `pred`
    pub fn exists<F>(&self, pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.buffer.iter().any(pred)
    }

    fn tail_count(&self, start: usize) -> Result<usize> {
        let len = self.len();
        if start > len {
            return Err(Error::ArgumentOutOfRange {
                start,
                count: 0,
                len,
            });
        }
        Ok(len - start)
    }

    fn backward_range(&self, start: usize, count: usize) -> Result<usize> {
        let len = self.len();
        let out_of_range = || Error::ArgumentOutOfRange { start, count, len };
        if count == 0 {
            return if start <= len { Ok(start) } else { Err(out_of_range()) };
        }
        if start >= len || count > start + 1 {
            return Err(out_of_range());
        }
        Ok(start + 1 - count)
    }
}

impl<T: Clone> ObservableCollection<T> {
    // ========================================================================
    // Mutators
    // ========================================================================

    /// Replace the element at `index`, returning the previous value
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let old = self.buffer.set(index, value.clone())?;
        self.notifier
            .notify(&CollectionChanged::replaced(value, old.clone(), index));
        Ok(old)
    }

    /// Append `value`, returning its index
    pub fn add(&mut self, value: T) -> usize {
        let index = self.buffer.push(value.clone());
        self.notifier.notify(&CollectionChanged::added(value, index));
        index
    }

    /// Append every item, firing one Add event; returns the number added
    pub fn add_range<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return 0;
        }
        let count = items.len();
        let start = self.buffer.append(items.clone());
        self.notifier
            .notify(&CollectionChanged::added_many(items, start));
        count
    }

    /// Append a copy of every element of `items`, firing one Add event
    ///
    /// A bulk write must carry data: an empty slice fails with
    /// `ArgumentInvalid` and fires nothing.
    pub fn add_slice(&mut self, items: &[T]) -> Result<usize> {
        let written = self.buffer.write(items)?;
        self.notifier
            .notify(&CollectionChanged::added_many(items.to_vec(), written.start));
        Ok(written.len())
    }

    /// Insert `value` at `index` (`index <= len()`)
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.buffer.insert(index, value.clone())?;
        self.notifier.notify(&CollectionChanged::added(value, index));
        Ok(())
    }

    /// Insert every item starting at `index`; returns the number inserted
    pub fn insert_range<I>(&mut self, index: usize, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        check_insert_index(index, self.len())?;
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return Ok(0);
        }
        let count = items.len();
        self.buffer.insert_many(index, items.clone())?;
        self.notifier
            .notify(&CollectionChanged::added_many(items, index));
        Ok(count)
    }

    /// Remove the first element equal to `value`
    pub fn remove(&mut self, value: &T) -> bool {
        match self.index_of(value) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let removed = self.buffer.remove_at(index)?;
        self.notifier
            .notify(&CollectionChanged::removed(removed.clone(), index));
        Ok(removed)
    }

    /// Remove `count` elements starting at `start`
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<Vec<T>> {
        check_range(start, count, self.len())?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let removed = self.buffer.remove_range(start, count)?;
        self.notifier.notify(&CollectionChanged::removed_many(
            removed.clone(),
            Some(start),
        ));
        Ok(removed)
    }

    /// Remove every element matching `pred`; returns the number removed
    ///
    /// Fires one Remove event carrying all removed elements. The event has
    /// no index because the removed elements need not be contiguous.
    pub fn remove_where<F>(&mut self, pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let removed = self.buffer.remove_where(pred);
        let count = removed.len();
        if count > 0 {
            self.notifier
                .notify(&CollectionChanged::removed_many(removed, None));
        }
        count
    }

    /// Remove the first element matching `pred`
    pub fn remove_first_where<F>(&mut self, pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.find_index(pred)?;
        self.remove_at(index).ok()
    }

    /// Append `value` unless an equal element already exists
    pub fn try_add(&mut self, value: T) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.add(value);
        true
    }

    /// Replace the first equal element, or append if none exists
    pub fn add_or_update(&mut self, value: T) -> Upsert {
        match self.index_of(&value) {
            Some(index) => {
                let old = std::mem::replace(&mut self.buffer.as_mut_slice()[index], value.clone());
                self.notifier
                    .notify(&CollectionChanged::replaced(value, old, index));
                Upsert::Updated(index)
            }
            None => Upsert::Added(self.add(value)),
        }
    }

    /// Move the element at `from` to `to`
    ///
    /// Moving an element onto its own index is a no-op and fires nothing.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        if from == to {
            self.buffer.get(from)?;
            return Ok(());
        }
        self.buffer.move_item(from, to)?;
        let item = self.buffer.get(to)?.clone();
        self.notifier
            .notify(&CollectionChanged::moved(item, from, to));
        Ok(())
    }

    /// Remove every element, firing a single Reset
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.notifier.notify(&CollectionChanged::reset());
    }

    /// Stable sort by the collection's comparer, firing a single Reset
    pub fn sort(&mut self) {
        let comparer = Arc::clone(&self.comparer);
        self.sort_by(|a, b| comparer.compare(a, b));
    }

    /// Stable sort by `compare`, firing a single Reset
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.buffer.as_mut_slice().sort_by(compare);
        self.notifier.notify(&CollectionChanged::reset());
    }

    /// Reverse element order, firing a single Reset
    pub fn reverse(&mut self) {
        self.buffer.reverse();
        self.notifier.notify(&CollectionChanged::reset());
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Copy every element into `dest[offset..]`
    pub fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<()> {
        self.buffer.copy_to(0, dest, offset, self.len())
    }

    /// Copy `count` elements starting at `index` into `dest[offset..]`
    pub fn copy_range_to(
        &self,
        index: usize,
        dest: &mut [T],
        offset: usize,
        count: usize,
    ) -> Result<()> {
        self.buffer.copy_to(index, dest, offset, count)
    }

    /// All elements matching `pred`, in order
    pub fn find_all<F>(&self, mut pred: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.buffer
            .iter()
            .filter(|item| pred(item))
            .cloned()
            .collect()
    }

    /// Point-in-time copy of the contents
    pub fn to_snapshot(&self) -> Snapshot<T> {
        Snapshot::from_slice(self.buffer.as_slice())
    }

    /// Point-in-time copy of the elements matching `pred`
    pub fn to_snapshot_where<F>(&self, pred: F) -> Snapshot<T>
    where
        F: FnMut(&T) -> bool,
    {
        Snapshot::from(self.find_all(pred))
    }

    /// Copy of the contents as a `Vec`
    pub fn to_vec(&self) -> Vec<T> {
        self.buffer.as_slice().to_vec()
    }
}

impl<T: Ord + 'static> Default for ObservableCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + 'static> From<Vec<T>> for ObservableCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec_with_comparer(items, natural())
    }
}

impl<T: Ord + 'static> FromIterator<T> for ObservableCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_buffer(iter.into_iter().collect(), natural())
    }
}

impl<T: Clone> Extend<T> for ObservableCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<'a, T> IntoIterator for &'a ObservableCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCollection")
            .field("items", &self.buffer.as_slice())
            .field("subscribers", &self.notifier.subscriber_count())
            .finish()
    }
}
