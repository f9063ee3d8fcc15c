//! Model-based property tests.
//!
//! Random mutation sequences run against both the real map and a plain
//! `BTreeMap`-of-sets model; every observable query must agree, and the
//! tree's structural invariants must hold at every step.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use proptest::prelude::*;

use crate::{Key, MultiMap};

#[derive(Debug, Clone)]
enum Action {
    Add(Vec<u8>, i64),
    RemoveValue(Vec<u8>, i64),
    RemoveKey(Vec<u8>),
}

/// Keys drawn from a tiny alphabet collide and nest constantly; longer
/// arbitrary keys exercise prefix chaining past the inline limit.
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        4 => proptest::collection::vec(0u8..4, 0..6),
        2 => proptest::collection::vec(any::<u8>(), 0..8),
        1 => proptest::collection::vec(0u8..2, 12..40),
    ]
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        5 => (key_strategy(), 0i64..6).prop_map(|(key, value)| Action::Add(key, value)),
        2 => (key_strategy(), 0i64..6).prop_map(|(key, value)| Action::RemoveValue(key, value)),
        1 => key_strategy().prop_map(Action::RemoveKey),
    ]
}

#[derive(Default)]
struct Model {
    map: BTreeMap<Vec<u8>, BTreeSet<i64>>,
}

impl Model {
    fn apply(&mut self, action: &Action) {
        match action {
            Action::Add(key, value) => {
                self.map.entry(key.clone()).or_default().insert(*value);
            }
            Action::RemoveValue(key, value) => {
                if let Some(set) = self.map.get_mut(key) {
                    set.remove(value);
                    if set.is_empty() {
                        self.map.remove(key);
                    }
                }
            }
            Action::RemoveKey(key) => {
                self.map.remove(key);
            }
        }
    }

    fn values_in(&self, lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> BTreeSet<i64> {
        self.map
            .range::<[u8], _>((lower, upper))
            .flat_map(|(_, set)| set.iter().copied())
            .collect()
    }
}

fn apply(map: &MultiMap<i64>, action: &Action) {
    match action {
        Action::Add(key, value) => map.add_value(&Key::from_bytes(key), *value),
        Action::RemoveValue(key, value) => map.remove_value(&Key::from_bytes(key), value),
        Action::RemoveKey(key) => map.remove_key(&Key::from_bytes(key)),
    }
}

fn observed_values(map: &MultiMap<i64>, key: &[u8]) -> BTreeSet<i64> {
    map.values_for(&Key::from_bytes(key)).iter().copied().collect()
}

proptest! {
    #[test]
    fn mutation_sequences_match_the_model(actions in proptest::collection::vec(action_strategy(), 0..150)) {
        let map = MultiMap::new();
        let mut model = Model::default();
        for action in &actions {
            apply(&map, action);
            model.apply(action);
            map.check_invariants();
        }

        prop_assert_eq!(map.number_of_keys(), model.map.len());
        for (key, expected) in &model.map {
            prop_assert!(map.contains_key(&Key::from_bytes(key)));
            prop_assert_eq!(&observed_values(&map, key), expected);
        }

        // Traversal yields exactly the model's keys, in ascending order.
        let listed: Vec<Vec<u8>> = map.all_keys().iter().map(Key::to_vec).collect();
        let expected_keys: Vec<Vec<u8>> = model.map.keys().cloned().collect();
        prop_assert_eq!(listed, expected_keys);

        let all: BTreeSet<i64> = map.all_values().iter().copied().collect();
        let expected_all = model.values_in(Bound::Unbounded, Bound::Unbounded);
        prop_assert_eq!(all, expected_all);
    }

    #[test]
    fn range_queries_match_the_model(
        actions in proptest::collection::vec(action_strategy(), 0..80),
        lower in key_strategy(),
        upper in key_strategy(),
    ) {
        let map = MultiMap::new();
        let mut model = Model::default();
        for action in &actions {
            apply(&map, action);
            model.apply(action);
        }
        let (from, to) = (Key::from_bytes(&lower), Key::from_bytes(&upper));

        let cases: [(BTreeSet<i64>, BTreeSet<i64>); 6] = [
            (
                map.values_between_inclusive(&from, &to).iter().copied().collect(),
                if lower <= upper {
                    model.values_in(Bound::Included(&lower[..]), Bound::Included(&upper[..]))
                } else {
                    BTreeSet::new()
                },
            ),
            (
                map.values_between_exclusive(&from, &to).iter().copied().collect(),
                if lower < upper {
                    model.values_in(Bound::Excluded(&lower[..]), Bound::Excluded(&upper[..]))
                } else {
                    BTreeSet::new()
                },
            ),
            (
                map.values_from_inclusive(&from).iter().copied().collect(),
                model.values_in(Bound::Included(&lower[..]), Bound::Unbounded),
            ),
            (
                map.values_from_exclusive(&from).iter().copied().collect(),
                model.values_in(Bound::Excluded(&lower[..]), Bound::Unbounded),
            ),
            (
                map.values_to_inclusive(&to).iter().copied().collect(),
                model.values_in(Bound::Unbounded, Bound::Included(&upper[..])),
            ),
            (
                map.values_to_exclusive(&to).iter().copied().collect(),
                model.values_in(Bound::Unbounded, Bound::Excluded(&upper[..])),
            ),
        ];
        for (index, (got, expected)) in cases.iter().enumerate() {
            prop_assert_eq!(got, expected, "range query case {} disagrees", index);
        }
    }

    #[test]
    fn integer_keys_order_like_integers(values in proptest::collection::btree_set(any::<i64>(), 1..50)) {
        let map = MultiMap::new();
        for &value in &values {
            map.add_value(&Key::from_i64(value), value);
        }
        let ordered: Vec<i64> = values.iter().copied().collect();
        for window in ordered.windows(2) {
            let below: BTreeSet<i64> = map
                .values_to_inclusive(&Key::from_i64(window[0]))
                .iter()
                .copied()
                .collect();
            prop_assert!(below.contains(&window[0]));
            prop_assert!(!below.contains(&window[1]));
        }
    }
}
