#![cfg(test)]

// Property tests for LinkedSequence kept inside the crate so the link
// structure can be checked after every step.

use crate::error::CollectionError;
use crate::linked_sequence::tests::assert_links;
use crate::linked_sequence::LinkedSequence;
use proptest::prelude::*;

// Positions are raw and reduced modulo the current length at apply time,
// so shrinking stays meaningful as the list changes.
#[derive(Clone, Debug)]
enum Op {
    Add(u8),
    Insert(usize, u8),
    AddAll(usize, Vec<u8>),
    Remove(usize),
    Set(usize, u8),
    Get(usize),
    OutOfBounds(usize),
    IndexOf(u8),
    Clear,
    SubList(usize, usize),
    // Walk back to front with a cursor, removing every even value.
    CursorSweep,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let v = 0u8..10;
    prop_oneof![
        4 => v.clone().prop_map(Op::Add),
        3 => (any::<usize>(), v.clone()).prop_map(|(i, x)| Op::Insert(i, x)),
        1 => (any::<usize>(), proptest::collection::vec(v.clone(), 0..5)).prop_map(|(i, xs)| Op::AddAll(i, xs)),
        3 => any::<usize>().prop_map(Op::Remove),
        1 => (any::<usize>(), v.clone()).prop_map(|(i, x)| Op::Set(i, x)),
        2 => any::<usize>().prop_map(Op::Get),
        1 => (0usize..3).prop_map(Op::OutOfBounds),
        2 => v.prop_map(Op::IndexOf),
        1 => Just(Op::Clear),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::SubList(a, b)),
        1 => Just(Op::CursorSweep),
    ]
}

// State-machine equivalence against Vec.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..120)) {
        let mut sut: LinkedSequence<u8> = LinkedSequence::new();
        let mut model: Vec<u8> = Vec::new();

        for op in ops {
            let len = model.len();
            match op {
                Op::Add(x) => {
                    sut.add(x);
                    model.push(x);
                }
                Op::Insert(i, x) => {
                    let i = i % (len + 1);
                    sut.insert(i, x).unwrap();
                    model.insert(i, x);
                }
                Op::AddAll(i, xs) => {
                    let i = i % (len + 1);
                    let changed = sut.add_all(i, Some(xs.clone())).unwrap();
                    prop_assert_eq!(changed, !xs.is_empty());
                    model.splice(i..i, xs);
                }
                Op::Remove(i) => {
                    if len == 0 {
                        prop_assert!(sut.remove(i).is_err());
                    } else {
                        let i = i % len;
                        prop_assert_eq!(sut.remove(i).unwrap(), model.remove(i));
                    }
                }
                Op::Set(i, x) => {
                    if len > 0 {
                        let i = i % len;
                        let old = core::mem::replace(&mut model[i], x);
                        prop_assert_eq!(sut.set(i, x).unwrap(), old);
                    }
                }
                Op::Get(i) => {
                    if len > 0 {
                        let i = i % len;
                        prop_assert_eq!(sut.get(i).unwrap(), &model[i]);
                    }
                }
                Op::OutOfBounds(extra) => {
                    let index = len + extra;
                    prop_assert_eq!(
                        sut.get(index),
                        Err(CollectionError::IndexOutOfBounds { index, len })
                    );
                    prop_assert!(sut.insert(index + 1, 0).is_err());
                }
                Op::IndexOf(x) => {
                    prop_assert_eq!(sut.index_of(&x), model.iter().position(|&y| y == x));
                    prop_assert_eq!(sut.last_index_of(&x), model.iter().rposition(|&y| y == x));
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                }
                Op::SubList(a, b) => {
                    let a = a % (len + 1);
                    let b = b % (len + 1);
                    let (from, to) = (a.min(b), a.max(b));
                    let copy = sut.sub_list(from..to).unwrap();
                    prop_assert_eq!(copy.iter().copied().collect::<Vec<_>>(), model[from..to].to_vec());
                    assert_links(&copy);
                }
                Op::CursorSweep => {
                    let mut c = sut.cursor_at(len).unwrap();
                    while c.has_previous() {
                        let even = *c.previous(&sut).unwrap() % 2 == 0;
                        if even {
                            c.remove(&mut sut).unwrap();
                        }
                    }
                    model.retain(|x| x % 2 != 0);
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.first(), model.first());
            prop_assert_eq!(sut.last(), model.last());
            prop_assert_eq!(sut.iter().copied().collect::<Vec<_>>(), model.clone());
            prop_assert!(sut.iter().rev().copied().eq(model.iter().rev().copied()));
            assert_links(&sut);
        }
    }

    // Inserting n values then removing them back to front empties the list.
    #[test]
    fn prop_reverse_drain_empties(values in proptest::collection::vec(any::<i64>(), 0..64)) {
        let mut sut: LinkedSequence<i64> = values.iter().copied().collect();
        for i in (0..values.len()).rev() {
            prop_assert_eq!(sut.remove(i).unwrap(), values[i]);
        }
        prop_assert!(sut.is_empty());
        assert_links(&sut);
    }
}
