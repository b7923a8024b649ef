//! Change Notification Tests
//!
//! One event per mutation with the documented payload.

use crate::*;
use lockstep::ChangeAction;

// =============================================================================
// PAYLOAD TESTS
// =============================================================================

#[test]
fn test_add_event_payload() {
    let c = concurrent_with(LockerKind::Mutex, vec![1]);
    let log = record(&c);
    c.add(2).unwrap();

    let events = log.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, ChangeAction::Add);
    assert_eq!(events[0].new_items, vec![2]);
    assert_eq!(events[0].new_index, Some(1));
}

#[test]
fn test_add_range_single_event() {
    let c = concurrent_with(LockerKind::Mutex, vec![]);
    let log = record(&c);
    c.add_range(vec![1, 2, 3]).unwrap();
    c.add_range(Vec::new()).unwrap();

    let events = log.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].new_items, vec![1, 2, 3]);
    assert_eq!(events[0].new_index, Some(0));
}

#[test]
fn test_replace_event_payload() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2]);
    let log = record(&c);
    assert_eq!(c.set(1, 20).unwrap(), 2);

    let events = log.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, ChangeAction::Replace);
    assert_eq!(events[0].new_items, vec![20]);
    assert_eq!(events[0].old_items, vec![2]);
    assert_eq!(events[0].new_index, Some(1));
    assert_eq!(events[0].old_index, Some(1));
}

#[test]
fn test_remove_event_payload() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2, 3]);
    let log = record(&c);
    c.remove(&2).unwrap();
    c.remove(&42).unwrap();

    let events = log.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, ChangeAction::Remove);
    assert_eq!(events[0].old_items, vec![2]);
    assert_eq!(events[0].old_index, Some(1));
}

#[test]
fn test_remove_where_event_has_no_index() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2, 3, 4]);
    let log = record(&c);
    c.remove_where(|x| x % 2 == 0).unwrap();

    let events = log.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old_items, vec![2, 4]);
    assert_eq!(events[0].old_index, None);
}

#[test]
fn test_clear_single_reset_regardless_of_size() {
    for size in [0, 1, 100] {
        let c = concurrent_with(LockerKind::Mutex, (0..size).collect());
        let log = record(&c);
        c.clear().unwrap();

        let events = log.lock();
        assert_eq!(events.len(), 1, "size {}", size);
        assert_eq!(events[0].action, ChangeAction::Reset);
    }
}

#[test]
fn test_move_event_payload() {
    let c = concurrent_with(LockerKind::Mutex, vec![10, 20, 30]);
    let log = record(&c);
    c.move_item(2, 0).unwrap();

    let events = log.lock();
    assert_eq!(events[0].action, ChangeAction::Move);
    assert_eq!(events[0].new_items, vec![30]);
    assert_eq!(events[0].old_index, Some(2));
    assert_eq!(events[0].new_index, Some(0));
}

#[test]
fn test_failed_operation_fires_nothing() {
    let c = concurrent_with(LockerKind::Mutex, vec![1]);
    let log = record(&c);
    assert!(c.set(4, 0).is_err());
    assert!(c.insert_range(9, vec![1]).is_err());
    assert!(c.move_item(0, 3).is_err());
    assert!(log.lock().is_empty());
}

// =============================================================================
// SUBSCRIPTION TESTS
// =============================================================================

#[test]
fn test_unsubscribe_stops_delivery() {
    let c = concurrent_with(LockerKind::Mutex, vec![]);
    let log: EventLog<i64> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let id = c.subscribe(move |e| sink.lock().push(e.clone()));

    c.add(1).unwrap();
    assert!(c.unsubscribe(id));
    assert!(!c.unsubscribe(id));
    c.add(2).unwrap();
    assert_eq!(log.lock().len(), 1);
    assert_eq!(c.subscriber_count(), 0);
}

#[test]
fn test_handler_observes_post_mutation_state() {
    let c = Arc::new(concurrent_with(LockerKind::Mutex, vec![]));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    // Handlers run under the lock, so they read the event rather than the collection
    c.subscribe(move |e: &CollectionChanged<i64>| {
        sink.lock().push(e.new_index.map(|i| i + e.new_items.len()));
    });
    c.add(5).unwrap();
    c.add(6).unwrap();
    assert_eq!(*seen.lock(), vec![Some(1), Some(2)]);
}

#[test]
fn test_observable_collection_events() {
    let mut c = ObservableCollection::from(vec![3, 1, 2]);
    let log = record_observable(&c);
    c.sort();
    c.reverse();
    c.add(0);

    let actions: Vec<ChangeAction> = log.lock().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![ChangeAction::Reset, ChangeAction::Reset, ChangeAction::Add]
    );
}
