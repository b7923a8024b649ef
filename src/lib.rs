//! # Lockstep
//!
//! Observable collections that stay correct under concurrent use.
//!
//! Lockstep provides an indexable, change-notifying sequence and a locked
//! variant whose every operation is serialized by a configurable lock, with a
//! synchronous and an asynchronous, cancellable form of each operation.
//!
//! ## Quick Start
//!
//! ```
//! use lockstep::prelude::*;
//! use std::sync::Arc;
//!
//! let tasks = Arc::new(ConcurrentObservableCollection::new());
//! tasks.subscribe(|e: &CollectionChanged<u32>| println!("{} at {:?}", e.action, e.new_index));
//!
//! tasks.add(3)?;
//! tasks.add_range([1, 2])?;
//! tasks.sort()?;
//!
//! // Enumeration walks a snapshot; writers are never blocked by it
//! for task in tasks.iter() {
//!     if task == 1 {
//!         tasks.remove(&2)?;
//!     }
//! }
//! assert_eq!(tasks.to_vec()?, vec![1, 3]);
//! # Ok::<(), lockstep::Error>(())
//! ```
//!
//! ## Lockers
//!
//! The lock guarding a collection is chosen with [`LockerKind`]:
//!
//! - `Mutex` (default) - one holder at a time
//! - `ReaderWriter` - queries share, mutations are exclusive
//! - `Semaphore { permits: 1 }` - binary semaphore
//!
//! ## Async
//!
//! Every operation has an `_async` twin that waits for the lock without
//! blocking a thread and gives up with `OperationCanceled` when its
//! [`CancellationToken`] fires first.
//!
//! ## Crates
//!
//! - `lockstep-core` - buffer, comparers, events, snapshots, errors
//! - `lockstep-concurrency` - [`Locker`] and its primitives
//! - `lockstep-collections` - the collections and enumerators

#![warn(missing_docs)]

pub mod prelude;

// Re-export main entry points
pub use lockstep_collections::{
    AsyncLockerEnumerator, CollectionBuilder, CollectionOptions, ConcurrentObservableCollection,
    EnumeratorState, LockedCollection, LockerEnumerator, ObservableCollection, Upsert,
};

// Re-export the lock layer
pub use lockstep_concurrency::{Access, CancellationToken, Locker, LockerGuard, LockerKind};

// Re-export core types
pub use lockstep_core::{
    ChangeAction, ChangeNotifier, CollectionChanged, Comparer, Error, FnComparer, KeyComparer,
    MemoryBuffer, NaturalOrder, Result, Reversed, SharedComparer, Snapshot, SubscriptionId,
};
