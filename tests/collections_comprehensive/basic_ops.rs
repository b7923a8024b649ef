//! Basic Collection Operations Tests
//!
//! Add, insert, remove, search and export on both collection types.

use crate::*;
use lockstep::{Error, KeyComparer, SharedComparer, Upsert};

// =============================================================================
// ADD / INSERT TESTS
// =============================================================================

#[test]
fn test_add_returns_index() {
    let c = ConcurrentObservableCollection::new();
    assert_eq!(c.add("a").unwrap(), 0);
    assert_eq!(c.add("b").unwrap(), 1);
    assert_eq!(c.len().unwrap(), 2);
}

#[test]
fn test_insert_at_bounds() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2]);
    c.insert(0, 0).unwrap();
    c.insert(3, 3).unwrap();
    assert_eq!(c.to_vec().unwrap(), vec![0, 1, 2, 3]);

    let err = c.insert(5, 9).unwrap_err();
    assert_eq!(err, Error::IndexOutOfRange { index: 5, len: 4 });
    assert_eq!(c.len().unwrap(), 4);
}

#[test]
fn test_insert_range_middle() {
    let c = concurrent_with(LockerKind::ReaderWriter, vec![1, 4]);
    assert_eq!(c.insert_range(1, vec![2, 3]).unwrap(), 2);
    assert_eq!(c.to_vec().unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_try_add_when_present() {
    let c = concurrent_with(LockerKind::Mutex, vec![7]);
    let log = record(&c);

    assert!(!c.try_add(7).unwrap());
    assert_eq!(c.len().unwrap(), 1);
    assert!(log.lock().is_empty());

    assert!(c.try_add(8).unwrap());
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_add_or_update_uses_comparer_equality() {
    #[derive(Debug, Clone, PartialEq)]
    struct Account {
        id: u32,
        balance: i64,
    }

    let by_id: SharedComparer<Account> = Arc::new(KeyComparer::new(|a: &Account| a.id));
    let c = ConcurrentObservableCollection::with_comparer(by_id);

    let first = c.add_or_update(Account { id: 1, balance: 10 }).unwrap();
    let second = c.add_or_update(Account { id: 1, balance: 25 }).unwrap();
    assert_eq!(first, Upsert::Added(0));
    assert_eq!(second, Upsert::Updated(0));
    assert_eq!(c.len().unwrap(), 1);
    assert_eq!(c.get(0).unwrap().balance, 25);
}

// =============================================================================
// REMOVE TESTS
// =============================================================================

#[test]
fn test_remove_at_out_of_range_leaves_contents() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2, 3]);
    let log = record(&c);

    assert!(c.remove_at(3).unwrap_err().is_out_of_range());
    assert!(c.remove_at(usize::MAX).unwrap_err().is_out_of_range());
    assert_eq!(c.to_vec().unwrap(), vec![1, 2, 3]);
    assert!(log.lock().is_empty());
}

#[test]
fn test_remove_absent_is_false() {
    let c = concurrent_with(LockerKind::Mutex, vec![1]);
    assert!(!c.remove(&5).unwrap());
    assert!(c.remove(&1).unwrap());
    assert!(c.is_empty().unwrap());
}

#[test]
fn test_remove_range_validation() {
    let c = concurrent_with(LockerKind::Mutex, vec![0, 1, 2, 3, 4]);
    assert_eq!(
        c.remove_range(3, 5).unwrap_err(),
        Error::ArgumentOutOfRange {
            start: 3,
            count: 5,
            len: 5
        }
    );
    assert_eq!(c.remove_range(1, 2).unwrap(), vec![1, 2]);
    assert_eq!(c.to_vec().unwrap(), vec![0, 3, 4]);
}

#[test]
fn test_remove_where_and_first_where() {
    let c = concurrent_with(LockerKind::semaphore(1), (0..10).collect());
    assert_eq!(c.remove_first_where(|x| *x > 4).unwrap(), Some(5));
    assert_eq!(c.remove_where(|x| x % 2 == 0).unwrap(), 5);
    assert_eq!(c.to_vec().unwrap(), vec![1, 3, 7, 9]);
    assert_eq!(c.remove_first_where(|x| *x > 100).unwrap(), None);
}

// =============================================================================
// SEARCH TESTS
// =============================================================================

#[test]
fn test_index_of_family() {
    let c = concurrent_with(LockerKind::Mutex, vec![5, 1, 5, 2, 5]);
    assert_eq!(c.index_of(&5).unwrap(), Some(0));
    assert_eq!(c.index_of_from(&5, 1).unwrap(), Some(2));
    assert_eq!(c.index_of_in(&5, 1, 1).unwrap(), None);
    assert_eq!(c.last_index_of(&5).unwrap(), Some(4));
    assert_eq!(c.last_index_of_from(&5, 3).unwrap(), Some(2));
    assert_eq!(c.last_index_of_in(&5, 3, 2).unwrap(), Some(2));
    assert_eq!(c.last_index_of_in(&5, 3, 1).unwrap(), None);
    assert!(c.index_of_in(&5, 4, 2).unwrap_err().is_out_of_range());
}

#[test]
fn test_find_family() {
    let c = concurrent_with(LockerKind::ReaderWriter, vec![3, 8, 4, 9]);
    assert_eq!(c.find(|x| *x > 3).unwrap(), Some(8));
    assert_eq!(c.find_last(|x| *x < 9).unwrap(), Some(4));
    assert_eq!(c.find_index(|x| *x == 4).unwrap(), Some(2));
    assert_eq!(c.find_index_from(2, |x| *x > 3).unwrap(), Some(2));
    assert_eq!(c.find_last_index(|x| *x > 3).unwrap(), Some(3));
    assert_eq!(c.find_all(|x| x % 2 == 1).unwrap(), vec![3, 9]);
    assert!(c.exists(|x| *x == 9).unwrap());
    assert!(!c.exists(|x| *x == 10).unwrap());
}

// =============================================================================
// EXPORT TESTS
// =============================================================================

#[test]
fn test_copy_matches_live_contents() {
    let c = concurrent_with(LockerKind::Mutex, vec![4, 2, 9]);
    let snapshot = c.copy().unwrap();
    assert_eq!(snapshot.to_vec(), c.to_vec().unwrap());
    assert_eq!(c.copy_where(|x| *x > 3).unwrap().as_slice(), &[4, 9]);
}

#[test]
fn test_copy_to_rejects_short_destination() {
    let c = concurrent_with(LockerKind::Mutex, vec![1, 2, 3]);
    let mut dest = vec![0; 4];
    assert!(c.copy_to(&mut dest, 2).unwrap_err().is_out_of_range());
    assert_eq!(dest, vec![0; 4]);

    c.copy_to(&mut dest, 1).unwrap();
    assert_eq!(dest, vec![0, 1, 2, 3]);

    let mut pair = vec![0; 2];
    c.copy_range_to(1, &mut pair, 0, 2).unwrap();
    assert_eq!(pair, vec![2, 3]);
}

#[test]
fn test_reorder_ops() {
    let c = concurrent_with(LockerKind::Mutex, vec![3, 1, 2]);
    c.sort().unwrap();
    assert_eq!(c.to_vec().unwrap(), vec![1, 2, 3]);
    c.reverse().unwrap();
    assert_eq!(c.to_vec().unwrap(), vec![3, 2, 1]);
    c.sort_by(|a, b| (a % 3).cmp(&(b % 3))).unwrap();
    assert_eq!(c.to_vec().unwrap(), vec![3, 1, 2]);
    c.move_item(0, 2).unwrap();
    assert_eq!(c.to_vec().unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_into_inner_keeps_subscribers() {
    let c = concurrent_with(LockerKind::Mutex, vec![1]);
    let log = record(&c);
    let mut plain = c.into_inner();
    plain.add(2);
    assert_eq!(log.lock().len(), 1);
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_collection_from_json_options() {
    let options: lockstep::CollectionOptions = serde_json::from_value(serde_json::json!({
        "locker": { "type": "reader_writer" },
        "capacity": 256
    }))
    .unwrap();

    let c = ConcurrentObservableCollection::<i64>::with_options(options.clone()).unwrap();
    assert_eq!(c.locker_kind(), LockerKind::ReaderWriter);
    assert!(c.capacity().unwrap() >= 256);

    let round_trip: lockstep::CollectionOptions =
        serde_json::from_str(&serde_json::to_string(&options).unwrap()).unwrap();
    assert_eq!(round_trip, options);
}
