use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use skipmap::{MapError, MemTable, SkipListMap, DEFAULT_CAPACITY};

type Table = SkipListMap<i64, String>;

#[test]
fn new_falls_back_to_default_capacity() {
    let table = <Table as MemTable<i64, String>>::new(None);
    assert_eq!(table.capacity(), DEFAULT_CAPACITY);

    let table = <Table as MemTable<i64, String>>::new(Some(0));
    assert_eq!(table.capacity(), DEFAULT_CAPACITY);

    let table = <Table as MemTable<i64, String>>::new(Some(4));
    assert_eq!(table.capacity(), 4);
}

#[test]
fn absent_key_is_invalid() {
    let mut table = <Table as MemTable<i64, String>>::new(None);

    assert_eq!(table.create(None, "x".into()), Err(MapError::InvalidKey));
    assert!(table.is_empty());

    assert_eq!(table.read(None), Err(MapError::InvalidKey));
    assert_eq!(table.update(None, "y".into()), Err(MapError::InvalidKey));
    assert_eq!(table.delete(None), Err(MapError::InvalidKey));
    assert!(table.is_empty());
}

#[test]
fn crud() {
    let mut table = <Table as MemTable<i64, String>>::new(Some(4));

    table.create(Some(10), "a".into()).unwrap();
    table.create(Some(5), "b".into()).unwrap();
    assert_eq!(table.create(Some(10), "c".into()), Err(MapError::DuplicateKey));

    assert_eq!(table.read(Some(&10)).unwrap(), "a");
    assert_eq!(table.read(Some(&5)).unwrap(), "b");
    assert_eq!(table.read(Some(&7)), Err(MapError::KeyNotFound));

    assert_eq!(table.update(Some(&10), "d".into()).unwrap(), "a");
    assert_eq!(table.read(Some(&10)).unwrap(), "d");

    assert_eq!(table.delete(Some(&5)).unwrap(), "b");
    assert_eq!(table.delete(Some(&5)), Err(MapError::KeyNotFound));
    assert!(!table.is_empty());

    assert_eq!(table.delete(Some(&10)).unwrap(), "d");
    assert!(table.is_empty());
    assert_eq!(table.height(), 1);
}

#[test]
fn error_messages() {
    assert_eq!(MapError::InvalidKey.to_string(), "key is absent");
    assert_eq!(MapError::DuplicateKey.to_string(), "key is already present");
    assert_eq!(MapError::KeyNotFound.to_string(), "key not found");
}

#[test]
fn shuffled_fill_and_drain() {
    let mut rng = StdRng::seed_from_u64(0xdead_beef);
    let mut table = <Table as MemTable<i64, String>>::new(None);

    let mut keys: Vec<i64> = (0..1_000).map(|k| k * 3 - 1_500).collect();
    keys.shuffle(&mut rng);
    for &key in &keys {
        table.create(Some(key), key.to_string()).unwrap();
    }
    assert_eq!(table.len(), keys.len());

    for &key in &keys {
        assert_eq!(table.read(Some(&key)).unwrap(), &key.to_string());
        assert_eq!(table.read(Some(&(key + 1))), Err(MapError::KeyNotFound));
    }

    keys.shuffle(&mut rng);
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(table.delete(Some(key)).unwrap(), key.to_string());
        assert!(!table.contains_key(key));
        assert_eq!(table.len(), keys.len() - i - 1);
    }

    assert!(table.is_empty());
    assert_eq!(table.height(), 1);
}
