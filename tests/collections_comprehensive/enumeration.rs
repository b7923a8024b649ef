//! Snapshot Enumeration Tests
//!
//! Enumeration walks a copy taken under the lock and never holds the lock
//! while the caller iterates.

use crate::*;
use futures::StreamExt;
use lockstep::{CancellationToken, EnumeratorState, Error};

// =============================================================================
// SNAPSHOT ISOLATION
// =============================================================================

#[test]
fn test_mutation_during_enumeration_is_not_observed() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2, 3]);
    let mut seen = Vec::new();
    for x in &c {
        if x == 1 {
            assert!(c.remove(&2).unwrap());
        }
        seen.push(x);
    }
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(c.to_vec().unwrap(), vec![1, 3]);
}

#[test]
fn test_writes_proceed_while_enumerating() {
    for kind in all_collection_lockers() {
        let c = concurrent_with(kind, vec![1, 2]);
        let mut e = c.enumerator();
        assert!(e.move_next().unwrap());
        // Would deadlock if the enumerator still held the lock
        c.add(3).unwrap();
        assert!(e.move_next().unwrap());
        assert!(!e.move_next().unwrap());
        assert_eq!(c.len().unwrap(), 3);
    }
}

#[test]
fn test_second_pass_sees_new_contents() {
    let c = concurrent_with(LockerKind::ReaderWriter, vec![1]);
    let mut e = c.enumerator();
    assert_eq!(e.by_ref().collect::<Vec<_>>(), vec![1]);
    assert_eq!(e.state(), EnumeratorState::Created);

    c.add(2).unwrap();
    assert_eq!(e.collect::<Vec<_>>(), vec![1, 2]);
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[test]
fn test_current_misuse() {
    let c = concurrent_with(LockerKind::Mutex, vec![1]);
    let mut e = c.enumerator();
    assert!(matches!(e.current(), Err(Error::InvalidState(_))));
    e.move_next().unwrap();
    assert_eq!(*e.current().unwrap(), 1);
    e.move_next().unwrap();
    assert!(matches!(e.current(), Err(Error::InvalidState(_))));
}

#[test]
fn test_disposed_enumerator() {
    let c = concurrent_with(LockerKind::Mutex, vec![1]);
    let mut e = c.enumerator();
    e.dispose();
    assert_eq!(e.move_next().unwrap_err(), Error::ObjectDisposed("enumerator"));
    assert!(e.current().unwrap_err().is_disposed());
}

#[test]
fn test_started_enumeration_survives_collection_dispose() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2]);
    let mut e = c.enumerator();
    assert!(e.move_next().unwrap());
    c.dispose();
    assert!(e.move_next().unwrap());
    assert_eq!(*e.current().unwrap(), 2);

    // Exhaustion resets, and the next snapshot needs the disposed lock
    assert!(!e.move_next().unwrap());
    assert!(e.move_next().unwrap_err().is_disposed());
}

// =============================================================================
// ASYNC ENUMERATION
// =============================================================================

#[tokio::test]
async fn test_async_enumerator_walks_snapshot() {
    init_tracing();
    let c = concurrent_with(LockerKind::ReaderWriter, vec![4, 5, 6]);
    let token = CancellationToken::new();
    let mut e = c.async_enumerator();
    let mut seen = Vec::new();
    while let Some(x) = e.next_async(&token).await.unwrap() {
        if x == 4 {
            c.clear_async(&token).await.unwrap();
        }
        seen.push(x);
    }
    assert_eq!(seen, vec![4, 5, 6]);
    assert!(c.is_empty().unwrap());
}

#[tokio::test]
async fn test_async_enumerator_stream() {
    let c = concurrent_with(LockerKind::Mutex, (1..=5).collect());
    let sum: i64 = c
        .async_enumerator()
        .into_stream(CancellationToken::new())
        .map(|item| item.unwrap())
        .fold(0, |acc, x| async move { acc + x })
        .await;
    assert_eq!(sum, 15);
}

#[tokio::test]
async fn test_async_enumerator_canceled_before_snapshot() {
    let c = concurrent_with(LockerKind::Mutex, vec![1]);
    let token = CancellationToken::new();
    token.cancel();
    let mut e = c.async_enumerator();
    assert!(e.move_next_async(&token).await.unwrap_err().is_canceled());
    assert_eq!(e.state(), EnumeratorState::Created);
}
