//! Synchronization primitives behind a [`Locker`](crate::Locker)
//!
//! Each primitive splits acquisition from release: `acquire` records the
//! holding internally and `release` gives one holding back. That split is
//! what lets a locker hand out a guard value instead of a borrowed
//! primitive guard.
//!
//! All primitives are built on tokio's async-capable locks, so waiting on
//! the async path never blocks an OS thread. The synchronous path drives the
//! same future to completion on the calling thread.
//!
//! ## Cancel safety
//!
//! `acquire` records its holding in the same poll that returns `Ready`.
//! Dropping the future before that poll leaves nothing recorded, so a
//! `select!` that abandons it never leaks a holding.

use lockstep_core::{Error, Result};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{
    OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock, Semaphore,
};

/// Requested access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Sole access
    Exclusive,
    /// Read access; only the reader/writer primitive admits several at once
    Shared,
}

/// Acquire/release capability shared by every primitive.
pub trait LockPrimitive: Send + Sync + fmt::Debug {
    /// Wait until `access` is granted and record the holding
    fn acquire(&self, access: Access) -> impl Future<Output = Result<()>> + Send + '_;

    /// Take `access` only if it is immediately available
    fn try_acquire(&self, access: Access) -> Result<bool>;

    /// Give back one holding of `access`
    ///
    /// Returns `false` when no such holding was outstanding.
    fn release(&self, access: Access) -> bool;

    /// Fail current and future waiters that the primitive can wake itself
    fn close(&self);

    /// Number of outstanding holdings
    fn holders(&self) -> usize;
}

// =============================================================================
// Mutex
// =============================================================================

/// Plain mutual exclusion; shared access is treated as exclusive
pub struct MutexPrimitive {
    lock: Arc<tokio::sync::Mutex<()>>,
    held: Mutex<Option<OwnedMutexGuard<()>>>,
}

impl MutexPrimitive {
    /// Create an unlocked mutex
    pub fn new() -> Self {
        Self {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            held: Mutex::new(None),
        }
    }

    fn record(&self, guard: OwnedMutexGuard<()>) {
        let previous = self.held.lock().replace(guard);
        debug_assert!(previous.is_none(), "mutex granted twice");
    }
}

impl Default for MutexPrimitive {
    fn default() -> Self {
        Self::new()
    }
}

impl LockPrimitive for MutexPrimitive {
    fn acquire(&self, _access: Access) -> impl Future<Output = Result<()>> + Send + '_ {
        async move {
            let guard = Arc::clone(&self.lock).lock_owned().await;
            self.record(guard);
            Ok(())
        }
    }

    fn try_acquire(&self, _access: Access) -> Result<bool> {
        match Arc::clone(&self.lock).try_lock_owned() {
            Ok(guard) => {
                self.record(guard);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    fn release(&self, _access: Access) -> bool {
        self.held.lock().take().is_some()
    }

    fn close(&self) {}

    fn holders(&self) -> usize {
        usize::from(self.held.lock().is_some())
    }
}

impl fmt::Debug for MutexPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexPrimitive")
            .field("held", &self.holders())
            .finish()
    }
}

// =============================================================================
// Semaphore
// =============================================================================

/// Counting semaphore; each holding consumes one permit
pub struct SemaphorePrimitive {
    semaphore: Semaphore,
    permits: usize,
    held: AtomicUsize,
}

impl SemaphorePrimitive {
    /// Create a semaphore with `permits` free slots
    pub fn new(permits: usize) -> Self {
        Self {
            semaphore: Semaphore::new(permits),
            permits,
            held: AtomicUsize::new(0),
        }
    }

    /// Configured permit count
    pub fn permits(&self) -> usize {
        self.permits
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl LockPrimitive for SemaphorePrimitive {
    fn acquire(&self, _access: Access) -> impl Future<Output = Result<()>> + Send + '_ {
        async move {
            let permit = self
                .semaphore
                .acquire()
                .await
                .map_err(|_| Error::ObjectDisposed("semaphore"))?;
            permit.forget();
            self.held.fetch_add(1, Ordering::AcqRel);
            Ok(())
        }
    }

    fn try_acquire(&self, _access: Access) -> Result<bool> {
        match self.semaphore.try_acquire() {
            Ok(permit) => {
                permit.forget();
                self.held.fetch_add(1, Ordering::AcqRel);
                Ok(true)
            }
            Err(tokio::sync::TryAcquireError::NoPermits) => Ok(false),
            Err(tokio::sync::TryAcquireError::Closed) => Err(Error::ObjectDisposed("semaphore")),
        }
    }

    fn release(&self, _access: Access) -> bool {
        let released = self
            .held
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if released {
            self.semaphore.add_permits(1);
        }
        released
    }

    fn close(&self) {
        self.semaphore.close();
    }

    fn holders(&self) -> usize {
        self.held.load(Ordering::Acquire)
    }
}

impl fmt::Debug for SemaphorePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemaphorePrimitive")
            .field("permits", &self.permits)
            .field("held", &self.holders())
            .finish()
    }
}

// =============================================================================
// Reader/writer
// =============================================================================

/// Reader/writer lock: one writer or many readers
pub struct ReaderWriterPrimitive {
    lock: Arc<RwLock<()>>,
    writer: Mutex<Option<OwnedRwLockWriteGuard<()>>>,
    readers: Mutex<Vec<OwnedRwLockReadGuard<()>>>,
}

impl ReaderWriterPrimitive {
    /// Create an unlocked reader/writer lock
    pub fn new() -> Self {
        Self {
            lock: Arc::new(RwLock::new(())),
            writer: Mutex::new(None),
            readers: Mutex::new(Vec::new()),
        }
    }

    /// Number of outstanding shared holdings
    pub fn readers(&self) -> usize {
        self.readers.lock().len()
    }

    fn record_writer(&self, guard: OwnedRwLockWriteGuard<()>) {
        let previous = self.writer.lock().replace(guard);
        debug_assert!(previous.is_none(), "write lock granted twice");
    }
}

impl Default for ReaderWriterPrimitive {
    fn default() -> Self {
        Self::new()
    }
}

impl LockPrimitive for ReaderWriterPrimitive {
    fn acquire(&self, access: Access) -> impl Future<Output = Result<()>> + Send + '_ {
        async move {
            match access {
                Access::Exclusive => {
                    let guard = Arc::clone(&self.lock).write_owned().await;
                    self.record_writer(guard);
                }
                Access::Shared => {
                    let guard = Arc::clone(&self.lock).read_owned().await;
                    self.readers.lock().push(guard);
                }
            }
            Ok(())
        }
    }

    fn try_acquire(&self, access: Access) -> Result<bool> {
        let lock = Arc::clone(&self.lock);
        let granted = match access {
            Access::Exclusive => match lock.try_write_owned() {
                Ok(guard) => {
                    self.record_writer(guard);
                    true
                }
                Err(_) => false,
            },
            Access::Shared => match lock.try_read_owned() {
                Ok(guard) => {
                    self.readers.lock().push(guard);
                    true
                }
                Err(_) => false,
            },
        };
        Ok(granted)
    }

    fn release(&self, access: Access) -> bool {
        match access {
            Access::Exclusive => self.writer.lock().take().is_some(),
            Access::Shared => self.readers.lock().pop().is_some(),
        }
    }

    fn close(&self) {}

    fn holders(&self) -> usize {
        usize::from(self.writer.lock().is_some()) + self.readers()
    }
}

impl fmt::Debug for ReaderWriterPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderWriterPrimitive")
            .field("writer", &self.writer.lock().is_some())
            .field("readers", &self.readers())
            .finish()
    }
}
