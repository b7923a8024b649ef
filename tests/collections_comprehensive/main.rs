//! Collections Comprehensive Test Suite
//!
//! This suite exercises the public `lockstep` API end to end: the plain
//! observable collection, the locked concurrent variant, the locker kinds
//! behind it, and snapshot enumeration.
//!
//! ## Key Verification Points
//!
//! 1. Mutual exclusion: concurrent writers never lose an update
//! 2. Snapshot isolation: enumeration never observes later mutations
//! 3. One notification per mutation, with the right payload
//! 4. Cancellation before acquisition never mutates
//! 5. Failed operations leave the contents unchanged
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test collections_comprehensive
//!
//! # Run concurrency tests only
//! cargo test --test collections_comprehensive concurrency::
//! ```

use std::sync::Arc;

use lockstep::{CollectionChanged, ConcurrentObservableCollection, LockerKind, ObservableCollection};
use parking_lot::Mutex;

// Test modules
pub mod basic_ops;
pub mod concurrency;
pub mod enumeration;
pub mod notifications;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Route `tracing` output through the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Every locker kind a collection accepts
pub fn all_collection_lockers() -> Vec<LockerKind> {
    vec![
        LockerKind::Mutex,
        LockerKind::ReaderWriter,
        LockerKind::semaphore(1),
    ]
}

/// Create a concurrent collection of `items` guarded by `kind`
pub fn concurrent_with(kind: LockerKind, items: Vec<i64>) -> ConcurrentObservableCollection<i64> {
    ConcurrentObservableCollection::with_locker(ObservableCollection::from(items), kind)
        .expect("collection locker kinds are valid")
}

/// Shared event log filled by a subscriber
pub type EventLog<T> = Arc<Mutex<Vec<CollectionChanged<T>>>>;

/// Subscribe a recorder to a concurrent collection
pub fn record<T: Clone + Send + Sync + 'static>(
    collection: &ConcurrentObservableCollection<T>,
) -> EventLog<T> {
    let log: EventLog<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    collection.subscribe(move |e| sink.lock().push(e.clone()));
    log
}

/// Subscribe a recorder to a plain observable collection
pub fn record_observable<T: Clone + Send + Sync + 'static>(
    collection: &ObservableCollection<T>,
) -> EventLog<T> {
    let log: EventLog<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    collection.subscribe(move |e| sink.lock().push(e.clone()));
    log
}
