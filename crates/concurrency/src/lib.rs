//! Lock layer for lockstep
//!
//! This crate implements the `Locker` abstraction with:
//! - LockerKind: serializable choice of primitive (mutex, semaphore, reader/writer)
//! - LockPrimitive: split acquire/release over tokio's async-capable locks
//! - Locker: uniform sync/async enter with cancellation and disposal
//! - LockerGuard: scoped acquisition, exit on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod guard;
pub mod locker;
pub mod primitive;

pub use config::LockerKind;
pub use guard::LockerGuard;
pub use locker::Locker;
pub use primitive::{
    Access, LockPrimitive, MutexPrimitive, ReaderWriterPrimitive, SemaphorePrimitive,
};

// Re-export the cancellation token type used by every async entry point
pub use tokio_util::sync::CancellationToken;
