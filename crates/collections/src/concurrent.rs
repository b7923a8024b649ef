//! ConcurrentObservableCollection: lock-guarded observable collection
//!
//! ## Design
//!
//! The collection pairs an [`ObservableCollection`] with a [`Locker`]. The
//! locker is the sole owner of permission to read or write the contents:
//! every operation enters it, runs the corresponding base operation, and
//! exits. Each operation has a synchronous form that blocks the calling
//! thread and an `_async` form that suspends the calling task and accepts a
//! [`CancellationToken`].
//!
//! The contents sit behind a `parking_lot::RwLock` that is only taken while
//! the locker is held. It is never contended by conflicting access; it
//! exists so the contents can be reached through `&self` without `unsafe`.
//!
//! ## Notifications are delivered under the lock
//!
//! Change handlers run synchronously inside the critical section, so a
//! handler observing the collection from the same thread sees state
//! consistent with the event. Two consequences:
//!
//! - A slow handler extends lock hold time for every other caller.
//! - A handler must not call back into the same collection's operations:
//!   the locker is not re-entrant and the call deadlocks. Subscribing and
//!   unsubscribing from a handler is fine; the registry has its own lock.
//!
//! ## Cancellation
//!
//! Cancellation is honored only while waiting for the locker. A token that
//! is already canceled fails the call with `OperationCanceled` before
//! anything is touched; once the lock is held the operation runs to
//! completion.
//!
//! ## Thread Safety
//!
//! `ConcurrentObservableCollection<T>` is `Send + Sync` for
//! `T: Send + Sync`. Share it with `Arc`.

use crate::enumerator::{AsyncLockerEnumerator, LockedCollection, LockerEnumerator};
use crate::observable::{ObservableCollection, Upsert};
use futures::future::BoxFuture;
use futures::{Stream, StreamExt};
use lockstep_concurrency::{Locker, LockerKind};
use lockstep_core::comparer::SharedComparer;
use lockstep_core::{
    ChangeNotifier, CollectionChanged, Error, MemoryBuffer, Result, Snapshot, SubscriptionId,
};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Observable collection whose every operation is serialized by a [`Locker`].
///
/// # Example
///
/// ```
/// use lockstep_collections::ConcurrentObservableCollection;
/// use std::sync::Arc;
/// use std::thread;
///
/// let names = Arc::new(ConcurrentObservableCollection::new());
/// let handles: Vec<_> = (0..4)
///     .map(|i| {
///         let names = Arc::clone(&names);
///         thread::spawn(move || names.add(i).unwrap())
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(names.len().unwrap(), 4);
/// ```
pub struct ConcurrentObservableCollection<T> {
    locker: Locker,
    inner: RwLock<ObservableCollection<T>>,
    notifier: Arc<ChangeNotifier<T>>,
    /// Token for synchronous entry, which is never canceled
    uncancelable: CancellationToken,
}

impl<T: Ord + 'static> ConcurrentObservableCollection<T> {
    /// Create an empty collection ordered by `T: Ord`, guarded by a mutex
    pub fn new() -> Self {
        Self::from_observable(ObservableCollection::new())
    }

    /// Create an empty collection with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_observable(ObservableCollection::with_capacity(capacity))
    }

    /// Create a collection holding `items`
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_observable(ObservableCollection::from(items))
    }
}

impl<T> ConcurrentObservableCollection<T> {
    /// Create an empty collection using `comparer`, guarded by a mutex
    pub fn with_comparer(comparer: SharedComparer<T>) -> Self {
        Self::from_observable(ObservableCollection::with_comparer(comparer))
    }

    /// Create a collection holding `items`, using `comparer`
    pub fn from_vec_with_comparer(items: Vec<T>, comparer: SharedComparer<T>) -> Self {
        Self::from_observable(ObservableCollection::from_vec_with_comparer(
            items, comparer,
        ))
    }

    /// Wrap an existing collection behind a mutex locker
    ///
    /// Subscribers already registered on `collection` keep receiving events.
    pub fn from_observable(collection: ObservableCollection<T>) -> Self {
        Self::from_parts(collection, Locker::default())
    }

    /// Wrap an existing collection behind a locker of `kind`
    ///
    /// The locker must be mutually exclusive: a counting semaphore with more
    /// than one permit is rejected with `ArgumentInvalid`.
    pub fn with_locker(collection: ObservableCollection<T>, kind: LockerKind) -> Result<Self> {
        if !kind.is_mutually_exclusive() {
            return Err(Error::ArgumentInvalid(format!(
                "collection locker must be mutually exclusive, got {}",
                kind
            )));
        }
        Ok(Self::from_parts(collection, Locker::new(kind)?))
    }

    pub(crate) fn from_buffer(
        buffer: MemoryBuffer<T>,
        comparer: SharedComparer<T>,
        kind: LockerKind,
    ) -> Result<Self> {
        Self::with_locker(ObservableCollection::from_buffer(buffer, comparer), kind)
    }

    fn from_parts(collection: ObservableCollection<T>, locker: Locker) -> Self {
        let notifier = Arc::clone(collection.notifier());
        Self {
            locker,
            inner: RwLock::new(collection),
            notifier,
            uncancelable: CancellationToken::new(),
        }
    }

    /// Locker kind guarding this collection
    pub fn locker_kind(&self) -> LockerKind {
        self.locker.kind()
    }

    /// Check if [`dispose`](Self::dispose) was called
    pub fn is_disposed(&self) -> bool {
        self.locker.is_disposed()
    }

    /// Dispose the collection's locker
    ///
    /// Waiting and future operations fail with `ObjectDisposed`. Snapshots
    /// already taken stay valid. Idempotent.
    pub fn dispose(&self) {
        if !self.is_disposed() {
            tracing::debug!(kind = %self.locker.kind(), "disposing concurrent collection");
        }
        self.locker.dispose();
    }

    /// Unwrap the underlying collection
    pub fn into_inner(self) -> ObservableCollection<T> {
        self.inner.into_inner()
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    /// Register a change handler
    ///
    /// Handlers run while the collection's lock is held and must not call
    /// the collection's operations.
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
    // Lock plumbing
    // ========================================================================

    fn check_disposed(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::ObjectDisposed("collection"))
        } else {
            Ok(())
        }
    }

    fn write<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&mut ObservableCollection<T>) -> R,
    {
        self.check_disposed()?;
        let _guard = self.locker.enter(&self.uncancelable)?;
        let mut inner = self.inner.write();
        Ok(op(&mut inner))
    }

    fn read<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&ObservableCollection<T>) -> R,
    {
        self.check_disposed()?;
        let _guard = self.locker.enter_shared(&self.uncancelable)?;
        let inner = self.inner.read();
        Ok(op(&inner))
    }

    async fn write_async<R, F>(&self, cancel: &CancellationToken, op: F) -> Result<R>
    where
        F: FnOnce(&mut ObservableCollection<T>) -> R,
    {
        self.check_disposed()?;
        let _guard = self.locker.enter_async(cancel).await?;
        let mut inner = self.inner.write();
        Ok(op(&mut inner))
    }

    async fn read_async<R, F>(&self, cancel: &CancellationToken, op: F) -> Result<R>
    where
        F: FnOnce(&ObservableCollection<T>) -> R,
    {
        self.check_disposed()?;
        let _guard = self.locker.enter_shared_async(cancel).await?;
        let inner = self.inner.read();
        Ok(op(&inner))
    }

    // ========================================================================
    // Size
    // ========================================================================

    /// Number of elements
    pub fn len(&self) -> Result<usize> {
        self.read(|c| c.len())
    }

    /// Number of elements, waiting asynchronously for the lock
    pub async fn len_async(&self, cancel: &CancellationToken) -> Result<usize> {
        self.read_async(cancel, |c| c.len()).await
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> Result<bool> {
        self.read(|c| c.is_empty())
    }

    /// Allocated capacity of the backing buffer
    pub fn capacity(&self) -> Result<usize> {
        self.read(|c| c.capacity())
    }
}

impl<T: Clone> ConcurrentObservableCollection<T> {
    // ========================================================================
    // Element access
    // ========================================================================

    /// Copy of the element at `index`
    pub fn get(&self, index: usize) -> Result<T> {
        self.read(|c| c.get(index).cloned())?
    }

    /// Copy of the element at `index`, waiting asynchronously
    pub async fn get_async(&self, index: usize, cancel: &CancellationToken) -> Result<T> {
        self.read_async(cancel, |c| c.get(index).cloned()).await?
    }

    /// Replace the element at `index`, returning the previous value
    pub fn set(&self, index: usize, value: T) -> Result<T> {
        self.write(|c| c.set(index, value))?
    }

    /// Async twin of [`set`](Self::set)
    pub async fn set_async(&self, index: usize, value: T, cancel: &CancellationToken) -> Result<T> {
        self.write_async(cancel, |c| c.set(index, value)).await?
    }

    // ========================================================================
    // Add / insert
    // ========================================================================

    /// Append `value`, returning its index
    pub fn add(&self, value: T) -> Result<usize> {
        self.write(|c| c.add(value))
    }

    /// Async twin of [`add`](Self::add)
    pub async fn add_async(&self, value: T, cancel: &CancellationToken) -> Result<usize> {
        self.write_async(cancel, |c| c.add(value)).await
    }

    /// Append every item under one lock acquisition; returns the number added
    ///
    /// `items` is drained before the lock is taken.
    pub fn add_range<I>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        self.write(|c| c.add_range(items))
    }

    /// Async twin of [`add_range`](Self::add_range)
    pub async fn add_range_async<I>(&self, items: I, cancel: &CancellationToken) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        self.write_async(cancel, |c| c.add_range(items)).await
    }

    /// Append a copy of every element of `items`
    ///
    /// An empty slice fails with `ArgumentInvalid`.
    pub fn add_slice(&self, items: &[T]) -> Result<usize> {
        self.write(|c| c.add_slice(items))?
    }

    /// Async twin of [`add_slice`](Self::add_slice)
    pub async fn add_slice_async(&self, items: &[T], cancel: &CancellationToken) -> Result<usize> {
        self.write_async(cancel, |c| c.add_slice(items)).await?
    }

    /// Drain an async sequence, then append everything it produced
    ///
    /// The stream is consumed before the lock is taken, so a slow producer
    /// never extends lock hold time. If `cancel` fires while draining,
    /// nothing is added and the call fails with `OperationCanceled`.
    pub async fn add_stream_async<S>(&self, items: S, cancel: &CancellationToken) -> Result<usize>
    where
        S: Stream<Item = T>,
    {
        let items: Vec<T> = items.take_until(cancel.cancelled()).collect().await;
        if cancel.is_cancelled() {
            return Err(Error::OperationCanceled);
        }
        self.write_async(cancel, |c| c.add_range(items)).await
    }

    /// Append `value` unless an equal element exists
    pub fn try_add(&self, value: T) -> Result<bool> {
        self.write(|c| c.try_add(value))
    }

    /// Async twin of [`try_add`](Self::try_add)
    pub async fn try_add_async(&self, value: T, cancel: &CancellationToken) -> Result<bool> {
        self.write_async(cancel, |c| c.try_add(value)).await
    }

    /// Replace the first equal element, or append if none exists
    pub fn add_or_update(&self, value: T) -> Result<Upsert> {
        self.write(|c| c.add_or_update(value))
    }

    /// Async twin of [`add_or_update`](Self::add_or_update)
    pub async fn add_or_update_async(&self, value: T, cancel: &CancellationToken) -> Result<Upsert> {
        self.write_async(cancel, |c| c.add_or_update(value)).await
    }

    /// Insert `value` at `index`
    pub fn insert(&self, index: usize, value: T) -> Result<()> {
        self.write(|c| c.insert(index, value))?
    }

    /// Async twin of [`insert`](Self::insert)
    pub async fn insert_async(&self, index: usize, value: T, cancel: &CancellationToken) -> Result<()> {
        self.write_async(cancel, |c| c.insert(index, value)).await?
    }

    /// Insert every item starting at `index`
    pub fn insert_range<I>(&self, index: usize, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        self.write(|c| c.insert_range(index, items))?
    }

    /// Async twin of [`insert_range`](Self::insert_range)
    pub async fn insert_range_async<I>(
        &self,
        index: usize,
        items: I,
        cancel: &CancellationToken,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        self.write_async(cancel, |c| c.insert_range(index, items))
            .await?
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Remove the first element equal to `value`
    pub fn remove(&self, value: &T) -> Result<bool> {
        self.write(|c| c.remove(value))
    }

    /// Async twin of [`remove`](Self::remove)
    pub async fn remove_async(&self, value: &T, cancel: &CancellationToken) -> Result<bool> {
        self.write_async(cancel, |c| c.remove(value)).await
    }

    /// Remove and return the element at `index`
    pub fn remove_at(&self, index: usize) -> Result<T> {
        self.write(|c| c.remove_at(index))?
    }

    /// Async twin of [`remove_at`](Self::remove_at)
    pub async fn remove_at_async(&self, index: usize, cancel: &CancellationToken) -> Result<T> {
        self.write_async(cancel, |c| c.remove_at(index)).await?
    }

    /// Remove `count` elements starting at `start`
    pub fn remove_range(&self, start: usize, count: usize) -> Result<Vec<T>> {
        self.write(|c| c.remove_range(start, count))?
    }

    /// Async twin of [`remove_range`](Self::remove_range)
    pub async fn remove_range_async(
        &self,
        start: usize,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        self.write_async(cancel, |c| c.remove_range(start, count))
            .await?
    }

    /// Remove every element matching `pred`; returns the number removed
    pub fn remove_where<F>(&self, pred: F) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.write(|c| c.remove_where(pred))
    }

    /// Async twin of [`remove_where`](Self::remove_where)
    pub async fn remove_where_async<F>(&self, pred: F, cancel: &CancellationToken) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.write_async(cancel, |c| c.remove_where(pred)).await
    }

    /// Remove the first element matching `pred`
    pub fn remove_first_where<F>(&self, pred: F) -> Result<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.write(|c| c.remove_first_where(pred))
    }

    /// Async twin of [`remove_first_where`](Self::remove_first_where)
    pub async fn remove_first_where_async<F>(
        &self,
        pred: F,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.write_async(cancel, |c| c.remove_first_where(pred))
            .await
    }

    /// Remove every element, firing a single Reset
    pub fn clear(&self) -> Result<()> {
        self.write(|c| c.clear())
    }

    /// Async twin of [`clear`](Self::clear)
    pub async fn clear_async(&self, cancel: &CancellationToken) -> Result<()> {
        self.write_async(cancel, |c| c.clear()).await
    }

    // ========================================================================
    // Reorder
    // ========================================================================

    /// Sort by the collection's comparer
    pub fn sort(&self) -> Result<()> {
        self.write(|c| c.sort())
    }

    /// Async twin of [`sort`](Self::sort)
    pub async fn sort_async(&self, cancel: &CancellationToken) -> Result<()> {
        self.write_async(cancel, |c| c.sort()).await
    }

    /// Sort by `compare`
    pub fn sort_by<F>(&self, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.write(|c| c.sort_by(compare))
    }

    /// Async twin of [`sort_by`](Self::sort_by)
    pub async fn sort_by_async<F>(&self, compare: F, cancel: &CancellationToken) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.write_async(cancel, |c| c.sort_by(compare)).await
    }

    /// Reverse element order
    pub fn reverse(&self) -> Result<()> {
        self.write(|c| c.reverse())
    }

    /// Async twin of [`reverse`](Self::reverse)
    pub async fn reverse_async(&self, cancel: &CancellationToken) -> Result<()> {
        self.write_async(cancel, |c| c.reverse()).await
    }

    /// Move the element at `from` to `to`
    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        self.write(|c| c.move_item(from, to))?
    }

    /// Async twin of [`move_item`](Self::move_item)
    pub async fn move_item_async(&self, from: usize, to: usize, cancel: &CancellationToken) -> Result<()> {
        self.write_async(cancel, |c| c.move_item(from, to)).await?
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Check if an element equal to `value` exists
    pub fn contains(&self, value: &T) -> Result<bool> {
        self.read(|c| c.contains(value))
    }

    /// Async twin of [`contains`](Self::contains)
    pub async fn contains_async(&self, value: &T, cancel: &CancellationToken) -> Result<bool> {
        self.read_async(cancel, |c| c.contains(value)).await
    }

    /// Check if any element matches `pred`
    pub fn exists<F>(&self, pred: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.exists(pred))
    }

    /// Async twin of [`exists`](Self::exists)
    pub async fn exists_async<F>(&self, pred: F, cancel: &CancellationToken) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.exists(pred)).await
    }

    /// Index of the first element equal to `value`
    pub fn index_of(&self, value: &T) -> Result<Option<usize>> {
        self.read(|c| c.index_of(value))
    }

    /// Async twin of [`index_of`](Self::index_of)
    pub async fn index_of_async(&self, value: &T, cancel: &CancellationToken) -> Result<Option<usize>> {
        self.read_async(cancel, |c| c.index_of(value)).await
    }

    /// Index of the first element equal to `value` at or after `start`
    pub fn index_of_from(&self, value: &T, start: usize) -> Result<Option<usize>> {
        self.read(|c| c.index_of_from(value, start))?
    }

    /// Async twin of [`index_of_from`](Self::index_of_from)
    pub async fn index_of_from_async(
        &self,
        value: &T,
        start: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>> {
        self.read_async(cancel, |c| c.index_of_from(value, start))
            .await?
    }

    /// Index of the first element equal to `value` in `start..start + count`
    pub fn index_of_in(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>> {
        self.read(|c| c.index_of_in(value, start, count))?
    }

    /// Async twin of [`index_of_in`](Self::index_of_in)
    pub async fn index_of_in_async(
        &self,
        value: &T,
        start: usize,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>> {
        self.read_async(cancel, |c| c.index_of_in(value, start, count))
            .await?
    }

    /// Index of the last element equal to `value`
    pub fn last_index_of(&self, value: &T) -> Result<Option<usize>> {
        self.read(|c| c.last_index_of(value))
    }

    /// Async twin of [`last_index_of`](Self::last_index_of)
    pub async fn last_index_of_async(
        &self,
        value: &T,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>> {
        self.read_async(cancel, |c| c.last_index_of(value)).await
    }

    /// Index of the last element equal to `value` at or before `start`
    pub fn last_index_of_from(&self, value: &T, start: usize) -> Result<Option<usize>> {
        self.read(|c| c.last_index_of_from(value, start))?
    }

    /// Async twin of [`last_index_of_from`](Self::last_index_of_from)
    pub async fn last_index_of_from_async(
        &self,
        value: &T,
        start: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>> {
        self.read_async(cancel, |c| c.last_index_of_from(value, start))
            .await?
    }

    /// Search backward over the `count` elements ending at `start`
    pub fn last_index_of_in(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>> {
        self.read(|c| c.last_index_of_in(value, start, count))?
    }

    /// Async twin of [`last_index_of_in`](Self::last_index_of_in)
    pub async fn last_index_of_in_async(
        &self,
        value: &T,
        start: usize,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>> {
        self.read_async(cancel, |c| c.last_index_of_in(value, start, count))
            .await?
    }

    /// Copy of the first element matching `pred`
    pub fn find<F>(&self, pred: F) -> Result<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.find(pred).cloned())
    }

    /// Async twin of [`find`](Self::find)
    pub async fn find_async<F>(&self, pred: F, cancel: &CancellationToken) -> Result<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.find(pred).cloned()).await
    }

    /// Copy of the last element matching `pred`
    pub fn find_last<F>(&self, pred: F) -> Result<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.find_last(pred).cloned())
    }

    /// Async twin of [`find_last`](Self::find_last)
    pub async fn find_last_async<F>(&self, pred: F, cancel: &CancellationToken) -> Result<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.find_last(pred).cloned())
            .await
    }

    /// Copies of every element matching `pred`
    pub fn find_all<F>(&self, pred: F) -> Result<Vec<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.find_all(pred))
    }

    /// Async twin of [`find_all`](Self::find_all)
    pub async fn find_all_async<F>(&self, pred: F, cancel: &CancellationToken) -> Result<Vec<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.find_all(pred)).await
    }

    /// Index of the first element matching `pred`
    pub fn find_index<F>(&self, pred: F) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.find_index(pred))
    }

    /// Async twin of [`find_index`](Self::find_index)
    pub async fn find_index_async<F>(
        &self,
        pred: F,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.find_index(pred)).await
    }

    /// Index of the first element matching `pred` at or after `start`
    pub fn find_index_from<F>(&self, start: usize, pred: F) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.find_index_from(start, pred))?
    }

    /// Async twin of [`find_index_from`](Self::find_index_from)
    pub async fn find_index_from_async<F>(
        &self,
        start: usize,
        pred: F,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.find_index_from(start, pred))
            .await?
    }

    /// Index of the last element matching `pred`
    pub fn find_last_index<F>(&self, pred: F) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.find_last_index(pred))
    }

    /// Async twin of [`find_last_index`](Self::find_last_index)
    pub async fn find_last_index_async<F>(
        &self,
        pred: F,
        cancel: &CancellationToken,
    ) -> Result<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.find_last_index(pred)).await
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Copy every element into `dest[offset..]`
    pub fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<()> {
        self.read(|c| c.copy_to(dest, offset))?
    }

    /// Async twin of [`copy_to`](Self::copy_to)
    pub async fn copy_to_async(
        &self,
        dest: &mut [T],
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.read_async(cancel, |c| c.copy_to(dest, offset)).await?
    }

    /// Copy `count` elements starting at `index` into `dest[offset..]`
    pub fn copy_range_to(&self, index: usize, dest: &mut [T], offset: usize, count: usize) -> Result<()> {
        self.read(|c| c.copy_range_to(index, dest, offset, count))?
    }

    /// Async twin of [`copy_range_to`](Self::copy_range_to)
    pub async fn copy_range_to_async(
        &self,
        index: usize,
        dest: &mut [T],
        offset: usize,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.read_async(cancel, |c| c.copy_range_to(index, dest, offset, count))
            .await?
    }

    /// Point-in-time snapshot of the contents
    ///
    /// The lock is held only for the copy.
    pub fn copy(&self) -> Result<Snapshot<T>> {
        self.read(|c| c.to_snapshot())
    }

    /// Async twin of [`copy`](Self::copy)
    pub async fn copy_async(&self, cancel: &CancellationToken) -> Result<Snapshot<T>> {
        self.read_async(cancel, |c| c.to_snapshot()).await
    }

    /// Point-in-time snapshot of the elements matching `pred`
    pub fn copy_where<F>(&self, pred: F) -> Result<Snapshot<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read(|c| c.to_snapshot_where(pred))
    }

    /// Async twin of [`copy_where`](Self::copy_where)
    pub async fn copy_where_async<F>(&self, pred: F, cancel: &CancellationToken) -> Result<Snapshot<T>>
    where
        F: FnMut(&T) -> bool,
    {
        self.read_async(cancel, |c| c.to_snapshot_where(pred))
            .await
    }

    /// Copy of the contents as a `Vec`
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.read(|c| c.to_vec())
    }
}

impl<T: Clone + Send + Sync> ConcurrentObservableCollection<T> {
    // ========================================================================
    // Enumeration
    // ========================================================================

    /// Snapshot-based enumerator; see [`LockerEnumerator`]
    pub fn enumerator(&self) -> LockerEnumerator<'_, T, Self> {
        LockerEnumerator::new(self)
    }

    /// Asynchronous snapshot-based enumerator; see [`AsyncLockerEnumerator`]
    pub fn async_enumerator(&self) -> AsyncLockerEnumerator<'_, T, Self> {
        AsyncLockerEnumerator::new(self)
    }

    /// Iterate a snapshot taken on the first call to `next`
    pub fn iter(&self) -> LockerEnumerator<'_, T, Self> {
        self.enumerator()
    }
}

impl<T: Clone + Send + Sync> LockedCollection<T> for ConcurrentObservableCollection<T> {
    fn copy(&self) -> Result<Snapshot<T>> {
        ConcurrentObservableCollection::copy(self)
    }

    fn copy_async<'a>(&'a self, cancel: &'a CancellationToken) -> BoxFuture<'a, Result<Snapshot<T>>> {
        Box::pin(ConcurrentObservableCollection::copy_async(self, cancel))
    }
}

impl<'a, T: Clone + Send + Sync> IntoIterator for &'a ConcurrentObservableCollection<T> {
    type Item = T;
    type IntoIter = LockerEnumerator<'a, T, ConcurrentObservableCollection<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.enumerator()
    }
}

impl<T: Ord + 'static> Default for ConcurrentObservableCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + 'static> From<Vec<T>> for ConcurrentObservableCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Ord + 'static> FromIterator<T> for ConcurrentObservableCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_observable(iter.into_iter().collect())
    }
}

impl<T> fmt::Debug for ConcurrentObservableCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConcurrentObservableCollection");
        s.field("locker", &self.locker);
        if let Some(inner) = self.inner.try_read() {
            s.field("len", &inner.len());
        }
        s.field("subscribers", &self.notifier.subscriber_count())
            .finish()
    }
}
