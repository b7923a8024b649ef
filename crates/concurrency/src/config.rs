//! Locker configuration
//!
//! [`LockerKind`] selects the primitive a [`Locker`](crate::Locker) owns.
//! It is serializable so it can live in application configuration files:
//!
//! ```json
//! { "type": "semaphore", "permits": 4 }
//! ```

use lockstep_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which synchronization primitive backs a locker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LockerKind {
    /// Plain mutual exclusion (default)
    #[default]
    Mutex,
    /// Counting semaphore admitting up to `permits` holders
    Semaphore {
        /// Maximum number of concurrent holders
        permits: usize,
    },
    /// Reader/writer lock: exclusive writers, shared readers
    ReaderWriter,
}

impl LockerKind {
    /// Counting semaphore with `permits` slots
    pub fn semaphore(permits: usize) -> Self {
        LockerKind::Semaphore { permits }
    }

    /// Reject configurations that cannot be constructed
    pub fn validate(&self) -> Result<()> {
        match self {
            LockerKind::Semaphore { permits: 0 } => Err(Error::ArgumentInvalid(
                "semaphore locker needs at least one permit".into(),
            )),
            LockerKind::Semaphore { permits } if *permits > tokio::sync::Semaphore::MAX_PERMITS => {
                Err(Error::ArgumentInvalid(format!(
                    "semaphore locker permits {} exceed maximum {}",
                    permits,
                    tokio::sync::Semaphore::MAX_PERMITS
                )))
            }
            _ => Ok(()),
        }
    }

    /// Whether an exclusive entry admits exactly one holder
    pub fn is_mutually_exclusive(&self) -> bool {
        match self {
            LockerKind::Mutex | LockerKind::ReaderWriter => true,
            LockerKind::Semaphore { permits } => *permits == 1,
        }
    }

    /// Whether shared entry can admit several readers at once
    pub fn supports_shared(&self) -> bool {
        matches!(self, LockerKind::ReaderWriter)
    }
}

impl fmt::Display for LockerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockerKind::Mutex => f.write_str("mutex"),
            LockerKind::Semaphore { permits } => write!(f, "semaphore({})", permits),
            LockerKind::ReaderWriter => f.write_str("reader_writer"),
        }
    }
}
