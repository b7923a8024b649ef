//! Observable collections for lockstep
//!
//! This crate provides:
//! - ObservableCollection: indexable sequence that notifies on every structural change
//! - ConcurrentObservableCollection: the same operations serialized by a `Locker`,
//!   each with a cancellable async twin
//! - LockerEnumerator / AsyncLockerEnumerator: snapshot-then-iterate enumeration
//! - CollectionBuilder / CollectionOptions: configuration and fluent construction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod concurrent;
pub mod enumerator;
pub mod observable;

pub use builder::{CollectionBuilder, CollectionOptions};
pub use concurrent::ConcurrentObservableCollection;
pub use enumerator::{AsyncLockerEnumerator, EnumeratorState, LockedCollection, LockerEnumerator};
pub use observable::{ObservableCollection, Upsert};
