//! Uniform lock over heterogeneous primitives
//!
//! A [`Locker`] owns exactly one primitive, chosen by [`LockerKind`] at
//! construction, and presents the same enter/exit contract for all of them,
//! synchronously and asynchronously.
//!
//! ## Contract
//!
//! - `enter` / `enter_async` wait for access or for cancellation, whichever
//!   comes first. A token that is already canceled fails immediately, even
//!   if the lock is free.
//! - Every successful entry returns a [`LockerGuard`]; dropping it calls
//!   [`Locker::exit`] exactly once.
//! - The locker is not re-entrant. Entering again on the same logical call
//!   stack while holding a guard deadlocks (sync) or never completes (async).
//! - After [`Locker::dispose`], waiters and new entries fail with
//!   `ObjectDisposed`. Guards held at that moment still release normally.

use crate::config::LockerKind;
use crate::guard::LockerGuard;
use crate::primitive::{
    Access, LockPrimitive, MutexPrimitive, ReaderWriterPrimitive, SemaphorePrimitive,
};
use lockstep_core::{Error, Result};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// The primitive a locker dispatches to
#[derive(Debug)]
enum Primitive {
    Mutex(MutexPrimitive),
    Semaphore(SemaphorePrimitive),
    ReaderWriter(ReaderWriterPrimitive),
}

impl Primitive {
    async fn acquire(&self, access: Access) -> Result<()> {
        match self {
            Primitive::Mutex(p) => p.acquire(access).await,
            Primitive::Semaphore(p) => p.acquire(access).await,
            Primitive::ReaderWriter(p) => p.acquire(access).await,
        }
    }

    fn try_acquire(&self, access: Access) -> Result<bool> {
        match self {
            Primitive::Mutex(p) => p.try_acquire(access),
            Primitive::Semaphore(p) => p.try_acquire(access),
            Primitive::ReaderWriter(p) => p.try_acquire(access),
        }
    }

    fn release(&self, access: Access) -> bool {
        match self {
            Primitive::Mutex(p) => p.release(access),
            Primitive::Semaphore(p) => p.release(access),
            Primitive::ReaderWriter(p) => p.release(access),
        }
    }

    fn close(&self) {
        match self {
            Primitive::Mutex(p) => p.close(),
            Primitive::Semaphore(p) => p.close(),
            Primitive::ReaderWriter(p) => p.close(),
        }
    }

    fn holders(&self) -> usize {
        match self {
            Primitive::Mutex(p) => p.holders(),
            Primitive::Semaphore(p) => p.holders(),
            Primitive::ReaderWriter(p) => p.holders(),
        }
    }
}

/// Mutual-exclusion wrapper with sync and async entry.
///
/// # Example
///
/// ```
/// use lockstep_concurrency::{Locker, LockerKind};
/// use tokio_util::sync::CancellationToken;
///
/// let locker = Locker::new(LockerKind::Mutex).unwrap();
/// let token = CancellationToken::new();
/// {
///     let _guard = locker.enter(&token).unwrap();
///     assert!(locker.is_held());
/// }
/// assert!(!locker.is_held());
/// ```
pub struct Locker {
    kind: LockerKind,
    primitive: Primitive,
    disposed: CancellationToken,
}

impl Locker {
    /// Create a locker backed by the primitive `kind` names
    pub fn new(kind: LockerKind) -> Result<Self> {
        kind.validate()?;
        let primitive = match kind {
            LockerKind::Mutex => Primitive::Mutex(MutexPrimitive::new()),
            LockerKind::Semaphore { permits } => {
                Primitive::Semaphore(SemaphorePrimitive::new(permits))
            }
            LockerKind::ReaderWriter => Primitive::ReaderWriter(ReaderWriterPrimitive::new()),
        };
        Ok(Self {
            kind,
            primitive,
            disposed: CancellationToken::new(),
        })
    }

    /// Primitive kind chosen at construction
    pub fn kind(&self) -> LockerKind {
        self.kind
    }

    /// Check if [`dispose`](Self::dispose) was called
    pub fn is_disposed(&self) -> bool {
        self.disposed.is_cancelled()
    }

    /// Check if any holding is outstanding
    pub fn is_held(&self) -> bool {
        self.primitive.holders() > 0
    }

    /// Number of outstanding holdings
    pub fn holders(&self) -> usize {
        self.primitive.holders()
    }

    // ========================================================================
    // Entry
    // ========================================================================

    /// Block the calling thread until exclusive access is granted
    ///
    /// Fails with `OperationCanceled` if `cancel` fires first, or
    /// `ObjectDisposed` if the locker is disposed.
    pub fn enter(&self, cancel: &CancellationToken) -> Result<LockerGuard<'_>> {
        self.enter_blocking(Access::Exclusive, cancel)
    }

    /// Suspend the calling task until exclusive access is granted
    pub async fn enter_async(&self, cancel: &CancellationToken) -> Result<LockerGuard<'_>> {
        self.enter_waiting(Access::Exclusive, cancel).await
    }

    /// Block until shared access is granted
    ///
    /// Only the reader/writer primitive admits several shared holders; for
    /// the other kinds this is the same as [`enter`](Self::enter).
    pub fn enter_shared(&self, cancel: &CancellationToken) -> Result<LockerGuard<'_>> {
        self.enter_blocking(self.shared_access(), cancel)
    }

    /// Suspend until shared access is granted
    pub async fn enter_shared_async(&self, cancel: &CancellationToken) -> Result<LockerGuard<'_>> {
        self.enter_waiting(self.shared_access(), cancel).await
    }

    /// Take exclusive access only if it is free right now
    pub fn try_enter(&self) -> Result<Option<LockerGuard<'_>>> {
        self.check_disposed()?;
        if self.primitive.try_acquire(Access::Exclusive)? {
            Ok(Some(LockerGuard::new(self, Access::Exclusive)))
        } else {
            Ok(None)
        }
    }

    /// Release one exclusive holding
    ///
    /// Guards call this on drop; calling it directly is only needed when a
    /// guard was [`forget`](LockerGuard::forget)-ed. An exit without an
    /// outstanding holding is ignored and logged.
    pub fn exit(&self) {
        self.exit_access(Access::Exclusive);
    }

    pub(crate) fn exit_access(&self, access: Access) {
        if self.primitive.release(access) {
            tracing::trace!(kind = %self.kind, ?access, "locker exit");
        } else {
            tracing::warn!(kind = %self.kind, ?access, "locker exit without matching enter");
        }
    }

    /// Dispose the locker
    ///
    /// Pending and future entries fail with `ObjectDisposed`. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.is_cancelled() {
            return;
        }
        self.disposed.cancel();
        self.primitive.close();
        tracing::debug!(kind = %self.kind, holders = self.holders(), "locker disposed");
    }

    fn shared_access(&self) -> Access {
        if self.kind.supports_shared() {
            Access::Shared
        } else {
            Access::Exclusive
        }
    }

    fn check_disposed(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::ObjectDisposed("locker"))
        } else {
            Ok(())
        }
    }

    fn check_ready(&self, cancel: &CancellationToken) -> Result<()> {
        self.check_disposed()?;
        if cancel.is_cancelled() {
            tracing::debug!(kind = %self.kind, "locker entry canceled before waiting");
            return Err(Error::OperationCanceled);
        }
        Ok(())
    }

    fn enter_blocking(&self, access: Access, cancel: &CancellationToken) -> Result<LockerGuard<'_>> {
        self.check_ready(cancel)?;
        if self.primitive.try_acquire(access)? {
            tracing::trace!(kind = %self.kind, ?access, "locker enter (uncontended)");
            return Ok(LockerGuard::new(self, access));
        }
        futures::executor::block_on(self.enter_waiting(access, cancel))
    }

    async fn enter_waiting(
        &self,
        access: Access,
        cancel: &CancellationToken,
    ) -> Result<LockerGuard<'_>> {
        self.check_ready(cancel)?;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::OperationCanceled),
            _ = self.disposed.cancelled() => Err(Error::ObjectDisposed("locker")),
            acquired = self.primitive.acquire(access) => acquired,
        };
        match outcome {
            Ok(()) => {
                tracing::trace!(kind = %self.kind, ?access, "locker enter");
                Ok(LockerGuard::new(self, access))
            }
            Err(e) => {
                tracing::debug!(kind = %self.kind, ?access, error = %e, "locker entry abandoned");
                Err(e)
            }
        }
    }
}

impl Default for Locker {
    fn default() -> Self {
        Self {
            kind: LockerKind::Mutex,
            primitive: Primitive::Mutex(MutexPrimitive::new()),
            disposed: CancellationToken::new(),
        }
    }
}

impl fmt::Debug for Locker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locker")
            .field("kind", &self.kind)
            .field("holders", &self.holders())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
