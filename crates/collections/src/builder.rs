//! Collection configuration and fluent construction

use crate::concurrent::ConcurrentObservableCollection;
use crate::observable::ObservableCollection;
use lockstep_concurrency::LockerKind;
use lockstep_core::comparer::{natural, SharedComparer};
use lockstep_core::{ChangeHandler, CollectionChanged, Error, MemoryBuffer, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Serializable settings for a concurrent collection
///
/// Missing fields take their defaults, so a partial configuration such as
/// `{"capacity": 64}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionOptions {
    /// Primitive guarding the collection
    pub locker: LockerKind,
    /// Initial buffer capacity
    pub capacity: usize,
}

impl CollectionOptions {
    /// Check the options describe a constructible collection
    ///
    /// The locker must be valid and mutually exclusive.
    pub fn validate(&self) -> Result<()> {
        self.locker.validate()?;
        if !self.locker.is_mutually_exclusive() {
            return Err(Error::ArgumentInvalid(format!(
                "collection locker must be mutually exclusive, got {}",
                self.locker
            )));
        }
        Ok(())
    }
}

/// Builder for collections.
///
/// # Example
///
/// ```
/// use lockstep_collections::CollectionBuilder;
/// use lockstep_concurrency::LockerKind;
///
/// let scores = CollectionBuilder::new()
///     .locker(LockerKind::ReaderWriter)
///     .capacity(128)
///     .items(vec![3, 1, 2])
///     .on_change(|e| println!("{}", e.action))
///     .build()
///     .unwrap();
/// assert_eq!(scores.len().unwrap(), 3);
/// ```
pub struct CollectionBuilder<T> {
    options: CollectionOptions,
    comparer: SharedComparer<T>,
    items: Vec<T>,
    handlers: Vec<ChangeHandler<T>>,
}

impl<T: Ord + 'static> CollectionBuilder<T> {
    /// Create a builder using natural ordering and default options
    pub fn new() -> Self {
        Self::with_comparer(natural())
    }
}

impl<T: 'static> CollectionBuilder<T> {
    /// Create a builder using `comparer` and default options
    pub fn with_comparer(comparer: SharedComparer<T>) -> Self {
        Self {
            options: CollectionOptions::default(),
            comparer,
            items: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Replace every option at once
    pub fn options(mut self, options: CollectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the locker kind.
    pub fn locker(mut self, kind: LockerKind) -> Self {
        self.options.locker = kind;
        self
    }

    /// Set the initial capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.options.capacity = capacity;
        self
    }

    /// Set the comparer used for equality, search and sorting.
    pub fn comparer(mut self, comparer: SharedComparer<T>) -> Self {
        self.comparer = comparer;
        self
    }

    /// Seed the collection; seeding raises no notification.
    pub fn items<I: IntoIterator<Item = T>>(mut self, items: I) -> Self {
        self.items.extend(items);
        self
    }

    /// Subscribe `handler` as soon as the collection exists
    pub fn on_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CollectionChanged<T>) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    fn into_parts(self) -> (MemoryBuffer<T>, SharedComparer<T>, Vec<ChangeHandler<T>>) {
        let mut buffer = MemoryBuffer::with_capacity(self.options.capacity.max(self.items.len()));
        for item in self.items {
            buffer.push(item);
        }
        (buffer, self.comparer, self.handlers)
    }

    /// Build a single-threaded collection; the locker option is ignored
    pub fn build_observable(self) -> ObservableCollection<T> {
        let (buffer, comparer, handlers) = self.into_parts();
        let collection = ObservableCollection::from_buffer(buffer, comparer);
        for handler in handlers {
            collection.subscribe(move |e| handler(e));
        }
        collection
    }

    /// Build the concurrent collection
    pub fn build(self) -> Result<ConcurrentObservableCollection<T>> {
        self.options.validate()?;
        let kind = self.options.locker;
        let (buffer, comparer, handlers) = self.into_parts();
        let len = buffer.len();
        let collection = ConcurrentObservableCollection::from_buffer(buffer, comparer, kind)?;
        for handler in handlers {
            collection.subscribe(move |e| handler(e));
        }
        tracing::debug!(
            locker = %kind,
            len,
            subscribers = collection.subscriber_count(),
            "built concurrent collection"
        );
        Ok(collection)
    }
}

impl<T: Ord + 'static> Default for CollectionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CollectionBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionBuilder")
            .field("options", &self.options)
            .field("items", &self.items.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<T: Ord + 'static> ConcurrentObservableCollection<T> {
    /// Start a [`CollectionBuilder`]
    pub fn builder() -> CollectionBuilder<T> {
        CollectionBuilder::new()
    }

    /// Create an empty collection from `options`
    pub fn with_options(options: CollectionOptions) -> Result<Self> {
        CollectionBuilder::new().options(options).build()
    }
}
