#![cfg(test)]

// Property tests for OrderedMap kept inside the crate so they can check the
// internal chain/order-list invariants after every step.

use crate::ordered_map::OrderedMap;
use crate::{CursorError, InvalidKeyError, OrderedMapBuilder};
use proptest::prelude::*;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Delete(usize),
    Get(usize),
    Has(String),
    Mutate(usize, i32),
    TrySetMissing(i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let has_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Delete),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![has_pool.prop_map(|s: String| s), "[a-z]{0,5}".prop_map(|s| s)]
                .prop_map(OpI::Has),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => any::<i32>().prop_map(OpI::TrySetMissing),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn arb_sizing() -> impl Strategy<Value = (usize, f64)> {
    (
        0usize..=4,
        proptest::sample::select(vec![0.25, 0.5, 0.75, 1.0, 3.0]),
    )
}

fn model_pos(model: &[(String, i32)], k: &str) -> Option<usize> {
    model.iter().position(|(mk, _)| mk == k)
}

// Property: State-machine equivalence against a Vec of pairs kept in order.
// Invariants exercised across random operation sequences:
// - `set` appends new keys and moves existing ones to the end.
// - `delete` on a present key shrinks `len` by one; on an absent key it is a no-op.
// - `get`/`has` parity with the model, including keys never inserted.
// - `try_set(None, _)` fails and leaves the map unchanged.
// - `clear` empties both structures; later inserts never see old entries.
// - After every op: chain membership, order-list symmetry, `len <= threshold`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), (cap, lf) in arb_sizing()) {
        let mut sut: OrderedMap<i32> = OrderedMapBuilder::new()
            .initial_capacity(cap)
            .load_factor(lf)
            .build()
            .unwrap();
        let mut model: Vec<(String, i32)> = Vec::new();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    let k = &pool[i];
                    let len_before = sut.len();
                    let existed = model_pos(&model, k).map(|p| model.remove(p)).is_some();
                    model.push((k.clone(), v));
                    sut.set(k.as_str(), v);
                    let grew = if existed { 0 } else { 1 };
                    prop_assert_eq!(sut.len(), len_before + grew);
                    prop_assert_eq!(sut.back(), Some((k.as_str(), &v)));
                }
                OpI::Delete(i) => {
                    let k = &pool[i];
                    let len_before = sut.len();
                    match model_pos(&model, k) {
                        Some(p) => {
                            model.remove(p);
                            prop_assert!(sut.delete(k));
                            prop_assert_eq!(sut.len(), len_before - 1);
                        }
                        None => {
                            prop_assert!(!sut.delete(k));
                            prop_assert_eq!(sut.len(), len_before);
                        }
                    }
                    prop_assert!(!sut.has(k));
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    let expected = model_pos(&model, k).map(|p| &model[p].1);
                    prop_assert_eq!(sut.get(k), expected);
                }
                OpI::Has(s) => {
                    prop_assert_eq!(sut.has(&s), model_pos(&model, &s).is_some());
                }
                OpI::Mutate(i, d) => {
                    let k = &pool[i];
                    if let Some(p) = model_pos(&model, k) {
                        let v = sut.get_mut(k).expect("present in model");
                        *v = v.wrapping_add(d);
                        model[p].1 = model[p].1.wrapping_add(d);
                    } else {
                        prop_assert!(sut.get_mut(k).is_none());
                    }
                }
                OpI::TrySetMissing(v) => {
                    let r = sut.try_set(None::<&str>, v).map(|_| ());
                    prop_assert_eq!(r, Err(InvalidKeyError::Missing));
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert!(sut.is_empty());
                }
                OpI::Iterate => {
                    let fwd: Vec<(String, i32)> =
                        sut.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                    prop_assert_eq!(&fwd, &model);
                    let rev: Vec<&str> = sut.keys().rev().collect();
                    let model_rev: Vec<&str> = model.iter().rev().map(|(k, _)| k.as_str()).collect();
                    prop_assert_eq!(rev, model_rev);
                }
            }

            // Post-conditions after each op
            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }

        let fwd: Vec<(String, i32)> = sut.into_iter().collect();
        prop_assert_eq!(fwd, model);
    }
}

// Property: a resize never disturbs the relative order of existing entries.
// Records the order just before each insertion that crosses the threshold and
// compares it with the prefix after.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_resize_preserves_order(n in 1usize..200, cap in 0usize..=3) {
        let mut sut: OrderedMap<usize> = OrderedMap::with_capacity(cap);
        let initial_threshold = sut.threshold();
        let mut resizes = 0;
        for i in 0..n {
            let before: Vec<(String, usize)> =
                sut.iter().map(|(k, v)| (k.to_string(), *v)).collect();
            let capacity = sut.capacity();
            sut.set(format!("k{i}"), i);
            if sut.capacity() != capacity {
                resizes += 1;
                prop_assert_eq!(sut.capacity(), capacity * 2 + 1);
                let after: Vec<(String, usize)> = sut
                    .iter()
                    .take(before.len())
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect();
                prop_assert_eq!(after, before);
                sut.assert_invariants();
            }
        }
        for i in 0..n {
            let key = format!("k{i}");
            prop_assert_eq!(sut.get(&key), Some(&i));
        }
        if n > initial_threshold {
            prop_assert!(resizes > 0);
        }
    }
}

// Property: a cursor either walks the exact iteration order or reports
// modification; it never yields a pair that is out of order.
proptest! {
    #[test]
    fn prop_cursor_fail_fast(n in 0usize..20, stop in 0usize..25, mutate in any::<bool>()) {
        let mut sut: OrderedMap<usize> = (0..n).map(|i| (format!("k{i}"), i)).collect();
        let mut cur = sut.cursor();
        let mut walked = Vec::new();
        for _ in 0..stop {
            match cur.advance(&sut).unwrap() {
                Some((_, v)) => walked.push(*v),
                None => break,
            }
        }
        prop_assert_eq!(&walked, &(0..walked.len()).collect::<Vec<_>>());
        if mutate {
            sut.set("extra", usize::MAX);
            let r = cur.advance(&sut).map(|o| o.map(|(_, v)| *v));
            let is_modified = matches!(r, Err(CursorError::Modified { .. }));
            prop_assert!(is_modified);
        } else {
            while let Some((_, v)) = cur.advance(&sut).unwrap() {
                walked.push(*v);
            }
            prop_assert_eq!(walked, (0..n).collect::<Vec<_>>());
        }
    }
}
