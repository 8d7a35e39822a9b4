use std::collections::HashSet;

use reuse_pool::{Entry, ObjectPool};

#[test]
fn default_entry_is_none() {
    let entry: Entry<u32> = Entry::default();
    assert!(entry.is_none());
    assert!(!entry.is_some());
    assert!(entry == Entry::none());
    assert!(entry.get().is_none());
}

#[test]
fn acquired_entry_is_not_none() {
    let pool = ObjectPool::from_elem(1, 3_u32);
    let entry = pool.acquire();
    assert!(entry.is_some());
    assert!(entry != Entry::none());
    assert_eq!(entry.get(), Some(&3));
}

#[test]
#[should_panic(expected = "empty pool entry")]
fn deref_none_panics() {
    let pool = ObjectPool::<u32>::new();
    let entry = pool.acquire();
    let _value: u32 = *entry;
}

#[test]
#[should_panic(expected = "empty pool entry")]
fn deref_mut_none_panics() {
    let mut entry: Entry<String> = Entry::none();
    entry.push('x');
}

#[test]
fn get_mut_modifies_object() {
    let pool = ObjectPool::from_elem(1, 1_u32);
    let mut entry = pool.acquire();
    *entry.get_mut().unwrap() += 1;
    drop(entry);
    assert_eq!(*pool.acquire(), 2);

    let mut none: Entry<u32> = Entry::none();
    assert!(none.get_mut().is_none());
}

#[test]
fn take_moves_ownership() {
    let pool = ObjectPool::from_elem(1, String::from("owned"));
    let mut source = pool.acquire();
    let target = source.take();
    assert!(source.is_none());
    assert_eq!(*target, "owned");

    drop(source);
    assert_eq!(pool.size(), 0);
    drop(target);
    assert_eq!(pool.size(), 1);
}

#[test]
fn release_returns_object_once() {
    let pool = ObjectPool::from_elem(2, 0_u8);
    let mut entry = pool.acquire();
    assert_eq!(pool.size(), 1);

    entry.release();
    assert!(entry.is_none());
    assert_eq!(pool.size(), 2);

    entry.release();
    drop(entry);
    assert_eq!(pool.size(), 2);
    assert_eq!(pool.managed_count(), 2);
}

#[test]
fn assigning_none_releases_object() {
    let pool = ObjectPool::from_elem(1, 0_u8);
    let mut entry = pool.acquire();
    assert!(pool.is_empty());

    entry = Entry::none();
    assert!(entry.is_none());
    assert_eq!(pool.size(), 1);
}

#[test]
fn reassigning_releases_previous_object() {
    let pool = ObjectPool::new();
    pool.push(1_u32).unwrap();
    pool.push(2_u32).unwrap();

    let mut entry = pool.acquire();
    assert_eq!(*entry, 2);
    assert_eq!(pool.size(), 1);

    entry = pool.acquire();
    assert_eq!(*entry, 1);
    assert_eq!(pool.size(), 1);
    assert_eq!(pool.lent(), 1);
}

#[test]
fn debug_shows_object_or_none() {
    let pool = ObjectPool::from_elem(1, 5_i32);
    let entry = pool.acquire();
    assert_eq!(format!("{entry:?}"), "Entry(5)");
    assert_eq!(format!("{:?}", pool.acquire()), "Entry(none)");
}

#[test]
fn entries_compare_and_hash_by_object() {
    let pool = ObjectPool::new();
    for i in [3_u32, 1, 2] {
        pool.push(i).unwrap();
    }
    let mut entries: Vec<_> = (0..3).map(|_| pool.acquire()).collect();
    entries.push(Entry::none());
    entries.sort();

    let values: Vec<_> = entries.iter().map(|entry| entry.get().copied()).collect();
    assert_eq!(values, [None, Some(1), Some(2), Some(3)]);

    let set: HashSet<_> = entries.iter().map(|entry| entry.get()).collect();
    assert_eq!(set.len(), 4);
}

#[test]
fn entry_moves_between_threads() {
    let pool = ObjectPool::from_elem(1, vec![1_u8, 2, 3]);
    let entry = pool.acquire();
    let sum = std::thread::spawn(move || entry.iter().map(|x| u32::from(*x)).sum::<u32>())
        .join()
        .unwrap();
    assert_eq!(sum, 6);
    assert_eq!(pool.size(), 1);
}

#[cfg(feature = "serde")]
#[test]
fn serialize_entry_as_object() {
    let pool = ObjectPool::from_elem(1, String::from("hello"));
    let entry = pool.acquire();
    assert_eq!(serde_json::to_string(&entry).unwrap(), "\"hello\"");

    let none = pool.acquire();
    assert_eq!(serde_json::to_string(&none).unwrap(), "null");
}
