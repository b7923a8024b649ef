//! Scoped lock acquisition

use crate::locker::Locker;
use crate::primitive::Access;
use std::fmt;

/// Proof of one holding on a [`Locker`].
///
/// Dropping the guard exits the locker exactly once, on every exit path:
/// normal return, `?` propagation, panic unwinding, or an async task being
/// dropped mid-flight.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct LockerGuard<'a> {
    locker: &'a Locker,
    access: Access,
}

impl<'a> LockerGuard<'a> {
    pub(crate) fn new(locker: &'a Locker, access: Access) -> Self {
        Self { locker, access }
    }

    /// Access mode this guard holds
    pub fn access(&self) -> Access {
        self.access
    }

    /// Locker this guard was taken from
    pub fn locker(&self) -> &'a Locker {
        self.locker
    }

    /// Keep the holding without a guard
    ///
    /// The caller becomes responsible for a matching [`Locker::exit`].
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl Drop for LockerGuard<'_> {
    fn drop(&mut self) {
        self.locker.exit_access(self.access);
    }
}

impl fmt::Debug for LockerGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockerGuard")
            .field("kind", &self.locker.kind())
            .field("access", &self.access)
            .finish()
    }
}
