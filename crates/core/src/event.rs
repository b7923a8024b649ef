//! Structural change notifications
//!
//! Every structural mutation of a collection produces exactly one
//! [`CollectionChanged`] value, delivered synchronously to the subscribers
//! registered on that collection's [`ChangeNotifier`].
//!
//! ## Payload by action
//!
//! | Action | `new_items` | `old_items` | `new_index` | `old_index` |
//! |--------|-------------|-------------|-------------|-------------|
//! | Add | added values | empty | insertion index | `None` |
//! | Remove | empty | removed values | `None` | removal index, if contiguous |
//! | Replace | new value | old value | index | index |
//! | Move | moved value | moved value | destination | source |
//! | Reset | empty | empty | `None` | `None` |

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Kind of structural change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeAction {
    /// One or more items were added
    Add,
    /// One or more items were removed
    Remove,
    /// An item was replaced in place
    Replace,
    /// An item moved to another index
    Move,
    /// The contents changed drastically (clear, sort, reverse)
    Reset,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeAction::Add => "add",
            ChangeAction::Remove => "remove",
            ChangeAction::Replace => "replace",
            ChangeAction::Move => "move",
            ChangeAction::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// One structural change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChanged<T> {
    /// What happened
    pub action: ChangeAction,
    /// Items that entered the collection (or moved)
    pub new_items: Vec<T>,
    /// Items that left the collection (or were overwritten)
    pub old_items: Vec<T>,
    /// Index at which `new_items` start
    pub new_index: Option<usize>,
    /// Index at which `old_items` started
    pub old_index: Option<usize>,
}

impl<T> CollectionChanged<T> {
    /// A single item added at `index`
    pub fn added(item: T, index: usize) -> Self {
        Self::added_many(vec![item], index)
    }

    /// Contiguous items added starting at `index`
    pub fn added_many(items: Vec<T>, index: usize) -> Self {
        Self {
            action: ChangeAction::Add,
            new_items: items,
            old_items: Vec::new(),
            new_index: Some(index),
            old_index: None,
        }
    }

    /// A single item removed from `index`
    pub fn removed(item: T, index: usize) -> Self {
        Self {
            action: ChangeAction::Remove,
            new_items: Vec::new(),
            old_items: vec![item],
            new_index: None,
            old_index: Some(index),
        }
    }

    /// Items removed, optionally from a contiguous run starting at `index`
    pub fn removed_many(items: Vec<T>, index: Option<usize>) -> Self {
        Self {
            action: ChangeAction::Remove,
            new_items: Vec::new(),
            old_items: items,
            new_index: None,
            old_index: index,
        }
    }

    /// `old` overwritten by `new` at `index`
    pub fn replaced(new: T, old: T, index: usize) -> Self {
        Self {
            action: ChangeAction::Replace,
            new_items: vec![new],
            old_items: vec![old],
            new_index: Some(index),
            old_index: Some(index),
        }
    }

    /// Contents reset wholesale
    pub fn reset() -> Self {
        Self {
            action: ChangeAction::Reset,
            new_items: Vec::new(),
            old_items: Vec::new(),
            new_index: None,
            old_index: None,
        }
    }
}

impl<T: Clone> CollectionChanged<T> {
    /// `item` moved from `from` to `to`
    pub fn moved(item: T, from: usize, to: usize) -> Self {
        Self {
            action: ChangeAction::Move,
            new_items: vec![item.clone()],
            old_items: vec![item],
            new_index: Some(to),
            old_index: Some(from),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw identifier value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Change handler
pub type ChangeHandler<T> = Arc<dyn Fn(&CollectionChanged<T>) + Send + Sync>;

/// Subscriber registry for one collection.
///
/// Registration is internally synchronized so subscribers can be added and
/// removed through a shared reference. Dispatch invokes a snapshot of the
/// handlers taken at notification time; a handler added or removed during
/// dispatch affects the next notification, not the current one.
pub struct ChangeNotifier<T> {
    handlers: RwLock<Vec<(SubscriptionId, ChangeHandler<T>)>>,
    next_id: AtomicU64,
}

impl<T> ChangeNotifier<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `handler`
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CollectionChanged<T>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        tracing::trace!(subscription = id.0, "subscribed to collection changes");
        id
    }

    /// Remove the handler registered under `id`
    ///
    /// Returns `false` if no such subscription exists.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Deliver `event` to every handler registered at call time
    pub fn notify(&self, event: &CollectionChanged<T>) {
        let snapshot: Vec<ChangeHandler<T>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
