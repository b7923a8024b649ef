//! Error types shared by every lockstep crate.
//!
//! All fallible operations return [`Result`]. The variants form a small,
//! closed taxonomy so callers can branch on the kind of failure without
//! parsing messages.

use thiserror::Error;

/// All lockstep errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Index outside the valid bounds for the current length
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Length at the time of the call
        len: usize,
    },

    /// Range argument (`start`, `count`) outside the valid bounds
    #[error("range starting at {start} with count {count} out of range for length {len}")]
    ArgumentOutOfRange {
        /// First index of the range
        start: usize,
        /// Number of elements in the range
        count: usize,
        /// Length of the sequence the range was checked against
        len: usize,
    },

    /// Operation attempted on a disposed collection, locker or enumerator
    #[error("object disposed: {0}")]
    ObjectDisposed(&'static str),

    /// Cancellation was signaled while waiting for a lock
    #[error("operation canceled")]
    OperationCanceled,

    /// Object used in a state that does not permit the operation
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Argument rejected (empty payload, bad configuration)
    #[error("invalid argument: {0}")]
    ArgumentInvalid(String),
}

/// Result type for lockstep operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is an index or range error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Error::IndexOutOfRange { .. } | Error::ArgumentOutOfRange { .. }
        )
    }

    /// Check if the target object was disposed.
    pub fn is_disposed(&self) -> bool {
        matches!(self, Error::ObjectDisposed(_))
    }

    /// Check if the operation was canceled before it acquired its lock.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::OperationCanceled)
    }

    /// Check if the object was in the wrong state for the call.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_))
    }
}

/// Validate `index < len`.
#[inline]
pub fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, len })
    }
}

/// Validate an insertion position, `index <= len`.
#[inline]
pub fn check_insert_index(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, len })
    }
}

/// Validate that `start..start + count` lies within `0..len`.
#[inline]
pub fn check_range(start: usize, count: usize, len: usize) -> Result<()> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(Error::ArgumentOutOfRange { start, count, len }),
    }
}
