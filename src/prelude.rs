//! Convenient imports for Lockstep.
//!
//! ```
//! use lockstep::prelude::*;
//!
//! let c = ConcurrentObservableCollection::from_vec(vec![1, 2, 3]);
//! assert!(c.contains(&2)?);
//! # Ok::<(), Error>(())
//! ```

// Collections
pub use crate::{CollectionBuilder, ConcurrentObservableCollection, ObservableCollection};

// Error handling
pub use crate::{Error, Result};

// Locking and cancellation
pub use crate::{CancellationToken, LockerKind};

// Notifications
pub use crate::{ChangeAction, CollectionChanged, SubscriptionId};

// Comparers
pub use crate::{Comparer, KeyComparer, SharedComparer};
