use chained_collections::{CollectionError, HashTable, TableConfig};

#[test]
fn overwrite_keeps_size() {
    let mut t = HashTable::new();
    assert_eq!(t.put("a", 1).unwrap(), None);
    assert_eq!(t.put("b", 2).unwrap(), None);
    assert_eq!(t.put("a", 3).unwrap(), Some(1));
    assert_eq!(t.get("a"), Some(&3));
    assert_eq!(t.len(), 2);
}

#[test]
fn second_insert_triggers_exactly_one_resize() {
    let config = TableConfig::new()
        .with_initial_capacity(2)
        .with_load_factor(0.5);
    let mut t = HashTable::with_config(config).unwrap();
    t.put(1u32, "one").unwrap();
    assert_eq!(t.capacity(), 2);
    t.put(2u32, "two").unwrap();
    assert_eq!(t.capacity(), 3);
    assert_eq!(t.get(&1), Some(&"one"));
    assert_eq!(t.get(&2), Some(&"two"));
}

#[test]
fn growth_sequence_follows_one_and_a_half() {
    let config = TableConfig::new()
        .with_initial_capacity(1)
        .with_load_factor(1.0);
    let mut t = HashTable::with_config(config).unwrap();
    let mut seen = vec![t.capacity()];
    for i in 0..20u32 {
        t.put(i, i).unwrap();
        if *seen.last().unwrap() != t.capacity() {
            seen.push(t.capacity());
        }
    }
    // 1 -> 2 (at least one extra bucket), then floor(cap * 1.5).
    assert_eq!(seen, vec![1, 2, 3, 4, 6, 9, 13, 19, 28]);
    assert_eq!(t.len(), 20);
}

#[test]
fn absent_key_is_its_own_slot() {
    let mut t: HashTable<String, i32> = HashTable::new();
    assert!(!t.contains_null_key());
    assert_eq!(t.put_null(5).unwrap(), None);
    assert_eq!(t.put("".to_string(), 6).unwrap(), None);
    assert_eq!(t.get_null(), Some(&5));
    assert_eq!(t.get(""), Some(&6));
    assert_eq!(t.len(), 2);

    assert_eq!(t.put_null(7).unwrap(), Some(5));
    assert_eq!(t.remove_null().unwrap(), Some(7));
    assert!(!t.contains_null_key());
    assert_eq!(t.len(), 1);
}

#[test]
fn invalid_config_is_rejected() {
    for lf in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let config = TableConfig::new().with_load_factor(lf);
        assert!(matches!(
            HashTable::<u8, u8>::with_config(config),
            Err(CollectionError::InvalidConfig(_))
        ));
    }
    let zero = TableConfig::new().with_initial_capacity(0);
    assert!(matches!(
        HashTable::<u8, u8>::with_config(zero),
        Err(CollectionError::InvalidConfig(_))
    ));
}

#[test]
fn with_capacity_clamps_to_one_bucket() {
    let mut t = HashTable::with_capacity(0);
    assert_eq!(t.capacity(), 1);
    t.put('x', 1).unwrap();
    assert_eq!(t.get(&'x'), Some(&1));
}

#[test]
fn contains_value_and_replace() {
    let mut t = HashTable::new();
    t.put_all([("x", 1), ("y", 2)]).unwrap();
    assert!(t.contains_value(&2));
    assert!(!t.contains_value(&3));
    assert_eq!(t.replace("z", 9).unwrap(), None);
    assert!(!t.contains_key("z"));
    assert_eq!(t.replace("y", 3).unwrap(), Some(2));
    assert!(t.contains_value(&3));
}

#[test]
fn get_mut_updates_in_place() {
    let mut t = HashTable::new();
    t.put("n".to_string(), 1).unwrap();
    let v = t.version();
    *t.get_mut("n").unwrap() += 10;
    assert_eq!(t.get("n"), Some(&11));
    assert_eq!(t.version(), v);
}

#[test]
fn views_agree_with_contents() {
    let mut t = HashTable::new();
    t.put_all((0..50).map(|i| (i, i * 2))).unwrap();
    t.put_null(-1).unwrap();

    let keys = t.keys();
    assert_eq!(keys.len(), 51);
    assert_eq!(keys.iter().next(), Some(&None));
    assert_eq!(keys.iter().last(), Some(&Some(&49)));

    let mut values: Vec<i32> = t.values().copied().collect();
    values.sort_unstable();
    assert_eq!(values[0], -1);
    assert_eq!(values.len(), 51);

    assert_eq!(t.entries().len(), 51);
    let sum: i32 = (&t).into_iter().filter_map(|(k, _)| k.copied()).sum();
    assert_eq!(sum, (0..50).sum());
}

#[test]
fn clear_then_reuse() {
    let mut t = HashTable::new();
    t.put_all((0..100).map(|i| (i, ()))).unwrap();
    let cap = t.capacity();
    t.clear();
    assert!(t.is_empty());
    assert_eq!(t.capacity(), cap);
    assert_eq!(t.iter().count(), 0);
    t.put(7, ()).unwrap();
    assert!(t.contains_key(&7));
}

#[test]
fn debug_lists_entries() {
    let mut t = HashTable::new();
    t.put(1, "a").unwrap();
    assert_eq!(format!("{:?}", t), r#"{Some(1): "a"}"#);
}
