//! Snapshot-then-iterate enumeration over locked collections
//!
//! An enumerator never holds the collection's lock while the caller walks
//! the elements. The first advance takes a [`Snapshot`] through
//! [`LockedCollection::copy`] (a brief lock acquisition) and every later
//! advance reads that snapshot lock-free. Writers are never blocked by a
//! slow reader, and a reader never observes a mutation made after its
//! snapshot was taken.
//!
//! ## State machine
//!
//! ```text
//!   Created ──move_next──▶ Iterating ──exhausted──▶ Created
//!      │                      │
//!      └──────dispose─────────┴──────────────────▶ Disposed
//! ```
//!
//! Exhaustion discards the snapshot, so iterating the same enumerator again
//! takes a fresh one instead of replaying stale data.

use futures::future::BoxFuture;
use futures::Stream;
use lockstep_core::{Error, Result, Snapshot};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// A collection that can produce a consistent point-in-time copy of itself
pub trait LockedCollection<T>: Send + Sync {
    /// Copy the contents under the collection's lock
    fn copy(&self) -> Result<Snapshot<T>>;

    /// Copy the contents, waiting asynchronously for the lock
    fn copy_async<'a>(&'a self, cancel: &'a CancellationToken) -> BoxFuture<'a, Result<Snapshot<T>>>;
}

/// Observable state of an enumerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumeratorState {
    /// No snapshot held; the next advance takes one
    Created,
    /// Walking a snapshot
    Iterating,
    /// Terminal; every further call fails with `ObjectDisposed`
    Disposed,
}

enum Cursor<T> {
    Created,
    Iterating {
        snapshot: Snapshot<T>,
        /// `None` until the first successful advance
        position: Option<usize>,
    },
    Disposed,
}

impl<T> Cursor<T> {
    fn state(&self) -> EnumeratorState {
        match self {
            Cursor::Created => EnumeratorState::Created,
            Cursor::Iterating { .. } => EnumeratorState::Iterating,
            Cursor::Disposed => EnumeratorState::Disposed,
        }
    }

    fn needs_snapshot(&self) -> Result<bool> {
        match self {
            Cursor::Created => Ok(true),
            Cursor::Iterating { .. } => Ok(false),
            Cursor::Disposed => Err(Error::ObjectDisposed("enumerator")),
        }
    }

    fn begin(&mut self, snapshot: Snapshot<T>) {
        tracing::trace!(len = snapshot.len(), "enumeration snapshot taken");
        *self = Cursor::Iterating {
            snapshot,
            position: None,
        };
    }

    fn advance(&mut self) -> bool {
        if let Cursor::Iterating { snapshot, position } = self {
            let next = position.map_or(0, |p| p + 1);
            if next < snapshot.len() {
                *position = Some(next);
                return true;
            }
            *self = Cursor::Created;
        }
        false
    }

    fn current(&self) -> Result<&T> {
        match self {
            Cursor::Iterating {
                snapshot,
                position: Some(p),
            } => snapshot
                .get(*p)
                .ok_or_else(|| Error::InvalidState(format!("cursor {} past snapshot", p))),
            Cursor::Iterating { position: None, .. } | Cursor::Created => Err(
                Error::InvalidState("current() called without a successful advance".to_string()),
            ),
            Cursor::Disposed => Err(Error::ObjectDisposed("enumerator")),
        }
    }

    fn reset(&mut self) -> Result<()> {
        if let Cursor::Disposed = self {
            return Err(Error::ObjectDisposed("enumerator"));
        }
        *self = Cursor::Created;
        Ok(())
    }

    fn remaining(&self) -> usize {
        match self {
            Cursor::Iterating { snapshot, position } => {
                snapshot.len() - position.map_or(0, |p| p + 1)
            }
            _ => 0,
        }
    }
}

// ============================================================================
// LockerEnumerator
// ============================================================================

/// Synchronous snapshot enumerator over a [`LockedCollection`]
///
/// Also an [`Iterator`] yielding clones. The iterator is not fused: after it
/// returns `None` the enumerator is back in `Created`, and calling `next`
/// again starts a new pass over a fresh snapshot.
pub struct LockerEnumerator<'a, T, C: ?Sized> {
    source: &'a C,
    cursor: Cursor<T>,
}

impl<'a, T, C: ?Sized> LockerEnumerator<'a, T, C> {
    /// Create an enumerator in the `Created` state
    pub fn new(source: &'a C) -> Self {
        Self {
            source,
            cursor: Cursor::Created,
        }
    }

    /// Current state
    pub fn state(&self) -> EnumeratorState {
        self.cursor.state()
    }

    /// Element under the cursor
    ///
    /// Fails with `InvalidState` before a successful advance or after
    /// exhaustion, and with `ObjectDisposed` after disposal.
    pub fn current(&self) -> Result<&T> {
        self.cursor.current()
    }

    /// Discard the snapshot and return to `Created`
    pub fn reset(&mut self) -> Result<()> {
        self.cursor.reset()
    }

    /// Discard the snapshot permanently
    pub fn dispose(&mut self) {
        self.cursor = Cursor::Disposed;
    }
}

impl<T, C: LockedCollection<T> + ?Sized> LockerEnumerator<'_, T, C> {
    /// Advance the cursor, taking a snapshot on the first call
    ///
    /// Returns `false` once the snapshot is exhausted; the enumerator is then
    /// back in `Created`.
    pub fn move_next(&mut self) -> Result<bool> {
        if self.cursor.needs_snapshot()? {
            let snapshot = self.source.copy()?;
            self.cursor.begin(snapshot);
        }
        Ok(self.cursor.advance())
    }
}

impl<T: Clone, C: LockedCollection<T> + ?Sized> Iterator for LockerEnumerator<'_, T, C> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.move_next() {
            Ok(true) => self.current().ok().cloned(),
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(error = %e, "enumeration stopped");
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            Cursor::Iterating { .. } => {
                let n = self.cursor.remaining();
                (n, Some(n))
            }
            _ => (0, None),
        }
    }
}

impl<T, C: ?Sized> fmt::Debug for LockerEnumerator<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockerEnumerator")
            .field("state", &self.state())
            .field("remaining", &self.cursor.remaining())
            .finish()
    }
}

// ============================================================================
// AsyncLockerEnumerator
// ============================================================================

/// Asynchronous snapshot enumerator over a [`LockedCollection`]
///
/// Only the snapshot acquisition waits; walking the snapshot never suspends.
pub struct AsyncLockerEnumerator<'a, T, C: ?Sized> {
    source: &'a C,
    cursor: Cursor<T>,
}

impl<'a, T, C: ?Sized> AsyncLockerEnumerator<'a, T, C> {
    /// Create an enumerator in the `Created` state
    pub fn new(source: &'a C) -> Self {
        Self {
            source,
            cursor: Cursor::Created,
        }
    }

    /// Current state
    pub fn state(&self) -> EnumeratorState {
        self.cursor.state()
    }

    /// Element under the cursor
    pub fn current(&self) -> Result<&T> {
        self.cursor.current()
    }

    /// Discard the snapshot and return to `Created`
    pub fn reset(&mut self) -> Result<()> {
        self.cursor.reset()
    }

    /// Discard the snapshot permanently
    pub fn dispose(&mut self) {
        self.cursor = Cursor::Disposed;
    }
}

impl<'a, T, C: LockedCollection<T> + ?Sized> AsyncLockerEnumerator<'a, T, C> {
    /// Advance the cursor, taking a snapshot on the first call
    ///
    /// `cancel` only matters while waiting for the snapshot's lock.
    pub async fn move_next_async(&mut self, cancel: &CancellationToken) -> Result<bool> {
        if self.cursor.needs_snapshot()? {
            let snapshot = self.source.copy_async(cancel).await?;
            self.cursor.begin(snapshot);
        }
        Ok(self.cursor.advance())
    }

    /// Advance and return a clone of the next element
    pub async fn next_async(&mut self, cancel: &CancellationToken) -> Result<Option<T>>
    where
        T: Clone,
    {
        if self.move_next_async(cancel).await? {
            Ok(Some(self.current()?.clone()))
        } else {
            Ok(None)
        }
    }

    /// Convert into a stream of one pass over a single snapshot
    ///
    /// An error is yielded once and ends the stream.
    pub fn into_stream(self, cancel: CancellationToken) -> impl Stream<Item = Result<T>> + 'a
    where
        T: Clone + 'a,
    {
        futures::stream::unfold(Some((self, cancel)), |state| async move {
            let (mut enumerator, cancel) = state?;
            match enumerator.next_async(&cancel).await {
                Ok(Some(item)) => Some((Ok(item), Some((enumerator, cancel)))),
                Ok(None) => None,
                Err(e) => {
                    tracing::debug!(error = %e, "enumeration stream ended by error");
                    Some((Err(e), None))
                }
            }
        })
    }
}

impl<T, C: ?Sized> fmt::Debug for AsyncLockerEnumerator<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLockerEnumerator")
            .field("state", &self.state())
            .field("remaining", &self.cursor.remaining())
            .finish()
    }
}
