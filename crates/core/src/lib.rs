//! Core types for lockstep
//!
//! This crate defines the building blocks shared by the lock layer and the
//! collection layer:
//! - MemoryBuffer: growable, bounds-checked element storage
//! - Comparer: explicit equality/ordering strategy (no global defaults)
//! - CollectionChanged / ChangeNotifier: structural change notifications
//! - Snapshot: immutable point-in-time copies used for safe iteration
//! - Error: the error taxonomy used by every crate

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod comparer;
pub mod error;
pub mod event;
pub mod snapshot;

pub use buffer::MemoryBuffer;
pub use comparer::{Comparer, FnComparer, KeyComparer, NaturalOrder, Reversed, SharedComparer};
pub use error::{Error, Result};
pub use event::{ChangeAction, ChangeHandler, ChangeNotifier, CollectionChanged, SubscriptionId};
pub use snapshot::Snapshot;
