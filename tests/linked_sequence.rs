use chained_collections::{CollectionError, LinkedSequence};

fn seq(values: &[i32]) -> LinkedSequence<i32> {
    values.iter().copied().collect()
}

fn to_vec(list: &LinkedSequence<i32>) -> Vec<i32> {
    list.iter().copied().collect()
}

#[test]
fn remove_middle_shifts_indices() {
    let mut list = seq(&[10, 20, 30]);
    assert_eq!(list.remove(1).unwrap(), 20);
    assert_eq!(to_vec(&list), vec![10, 30]);
    assert_eq!(list.len(), 2);
    assert_eq!(list.index_of(&30), Some(1));
}

#[test]
fn reverse_removal_empties_the_list() {
    let n = 1_000;
    let mut list: LinkedSequence<i32> = (0..n).collect();
    for i in (0..n).rev() {
        assert_eq!(list.remove(i as usize).unwrap(), i);
        assert_eq!(list.len(), i as usize);
        assert_eq!(list.last().copied(), (i > 0).then(|| i - 1));
    }
    assert!(list.is_empty());
    assert_eq!(list.iter().count(), 0);
}

#[test]
fn alternating_front_and_back_inserts() {
    let mut list = LinkedSequence::new();
    for i in 0..10 {
        if i % 2 == 0 {
            list.insert(0, i).unwrap();
        } else {
            list.add(i);
        }
    }
    assert_eq!(to_vec(&list), vec![8, 6, 4, 2, 0, 1, 3, 5, 7, 9]);
    assert_eq!(list.first(), Some(&8));
    assert_eq!(list.last(), Some(&9));
    for (i, v) in to_vec(&list).iter().enumerate() {
        assert_eq!(list.get(i).unwrap(), v);
    }
}

#[test]
fn out_of_range_positions() {
    let mut list = seq(&[1, 2, 3]);
    assert_eq!(
        list.get(3),
        Err(CollectionError::IndexOutOfBounds { index: 3, len: 3 })
    );
    assert!(list.remove(usize::MAX).is_err());
    assert!(list.set(3, 0).is_err());
    assert!(list.insert(4, 0).is_err());
    assert!(list.insert(3, 4).is_ok());
    assert_eq!(to_vec(&list), vec![1, 2, 3, 4]);
}

#[test]
fn contains_and_last_index_of() {
    let list = seq(&[3, 1, 3, 2]);
    assert!(list.contains(&2));
    assert!(!list.contains(&9));
    assert_eq!(list.index_of(&3), Some(0));
    assert_eq!(list.last_index_of(&3), Some(2));
    assert_eq!(list.last_index_of(&9), None);
}

#[test]
fn get_mut_is_not_a_structural_change() {
    let mut list = seq(&[1, 2]);
    let v = list.version();
    *list.get_mut(1).unwrap() = 5;
    assert_eq!(to_vec(&list), vec![1, 5]);
    assert_eq!(list.version(), v);
}

#[test]
fn clone_eq_extend_debug() {
    let mut a = seq(&[1, 2]);
    let b = a.clone();
    assert_eq!(a, b);
    a.extend([3, 4]);
    assert_ne!(a, b);
    assert_eq!(format!("{:?}", a), "[1, 2, 3, 4]");
    assert_eq!(format!("{:?}", LinkedSequence::<i32>::default()), "[]");
    let total: i32 = (&a).into_iter().sum();
    assert_eq!(total, 10);
}

#[test]
fn sub_list_copies_requested_window() {
    let list: LinkedSequence<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    let window = list.sub_list(1..=2).unwrap();
    assert_eq!(window.len(), 2);
    assert_eq!(window.first().map(String::as_str), Some("b"));
    assert_eq!(window.last().map(String::as_str), Some("c"));
    assert_eq!(list.len(), 4);
    assert!(matches!(
        list.sub_list(2..9),
        Err(CollectionError::IndexOutOfBounds { index: 9, len: 4 })
    ));
}
