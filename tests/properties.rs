//! Property tests: every variant against the brute-force model

mod common;

use common::{range_in, Model};
use proptest::prelude::*;
use rangeagg::{IterativeTree, PartialTree, PersistentTree, Preset, StaticTree};

#[derive(Debug, Clone, Copy)]
enum Op {
    Update { a: usize, b: usize, value: i64 },
    Query { a: usize, b: usize },
}

fn presets() -> impl Strategy<Value = Preset> {
    proptest::sample::select(Preset::ALL.to_vec())
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            (any::<usize>(), any::<usize>(), -50i64..50)
                .prop_map(|(a, b, value)| Op::Update { a, b, value }),
            (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Query { a, b }),
        ],
        1..60,
    )
}

fn initial() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-100i64..100, 1..40)
}

proptest! {
    #[test]
    fn static_tree_matches_model(preset in presets(), values in initial(), ops in ops()) {
        let len = values.len();
        let mut tree = StaticTree::new(values.clone(), preset).expect("non-empty");
        let mut model = Model::new(preset, values);

        for op in ops {
            match op {
                Op::Update { a, b, value } => {
                    let (l, r) = range_in(a, b, len);
                    tree.update(l, r, value);
                    model.update(l, r, value);
                }
                Op::Query { a, b } => {
                    let (l, r) = range_in(a, b, len);
                    prop_assert_eq!(tree.query(l, r), model.query(l, r), "query [{}, {}]", l, r);
                }
            }
        }

        // lazy tags drain to the same element values as eager updates
        let snapshot = tree.snapshot();
        let expected: Vec<_> = model.values.iter().copied().map(Some).collect();
        prop_assert_eq!(snapshot, expected);
    }

    #[test]
    fn iterative_matches_recursive(preset in presets(), values in initial(), ops in ops()) {
        let len = values.len();
        let mut iterative = IterativeTree::new(values.clone(), preset).expect("non-empty");
        let mut recursive = StaticTree::new(values, preset).expect("non-empty");

        for op in ops {
            match op {
                Op::Update { a, b, value } => {
                    let (l, r) = range_in(a, b, len);
                    iterative.update(l, r, value);
                    recursive.update(l, r, value);
                }
                Op::Query { a, b } => {
                    let (l, r) = range_in(a, b, len);
                    let fast = iterative.query(l, r);
                    prop_assert_eq!(fast, recursive.query(l, r));
                    prop_assert_eq!(fast, iterative.query_recursive(l, r));
                }
            }
        }
    }

    #[test]
    fn persistent_versions_are_isolated(
        preset in presets(),
        values in initial(),
        updates in proptest::collection::vec(
            (any::<usize>(), any::<usize>(), any::<usize>(), -50i64..50),
            1..25,
        ),
    ) {
        let len = values.len();
        let mut tree = PersistentTree::new(values.clone(), preset).expect("non-empty");
        let mut models = vec![Model::new(preset, values)];

        for (base, a, b, value) in updates {
            let base = base % models.len();
            let (l, r) = range_in(a, b, len);
            let version = tree.update(base, l, r, value);

            let mut model = models[base].clone();
            model.update(l, r, value);
            models.push(model);
            prop_assert_eq!(version, models.len() - 1);
        }
        prop_assert_eq!(tree.last_version(), models.len() - 1);

        for (version, model) in models.iter().enumerate() {
            for l in 0..len {
                for r in l..len {
                    prop_assert_eq!(tree.query(version, l, r), model.query(l, r));
                }
            }
        }

        // materializing reads agree and leave the read-only view unchanged
        for (version, model) in models.iter().enumerate().rev() {
            prop_assert_eq!(tree.query_materialized(version, 0, len - 1), model.query(0, len - 1));
            let mid = len / 2;
            prop_assert_eq!(tree.query_materialized(version, mid, len - 1), model.query(mid, len - 1));
        }
        for (version, model) in models.iter().enumerate() {
            prop_assert_eq!(tree.query(version, 0, len - 1), model.query(0, len - 1));
        }
    }

    #[test]
    fn partial_history_is_monotone(
        preset in presets(),
        values in initial(),
        updates in proptest::collection::vec((any::<usize>(), -50i64..50), 1..40),
    ) {
        let len = values.len();
        let mut tree = PartialTree::new(values.clone(), preset).expect("non-empty");
        let mut snapshots = vec![Model::new(preset, values)];

        for (position, value) in updates {
            let position = position % len;
            let version = tree.update(position, value);

            let mut model = snapshots[snapshots.len() - 1].clone();
            model.update(position, position, value);
            snapshots.push(model);
            prop_assert_eq!(version, snapshots.len() - 1);
        }

        for (version, model) in snapshots.iter().enumerate() {
            for position in 0..len {
                prop_assert_eq!(tree.get_at(version, position), Some(model.values[position]));
            }
            prop_assert_eq!(tree.query_at(version, 0, len - 1), model.query(0, len - 1));
        }

        let latest = &snapshots[snapshots.len() - 1];
        prop_assert_eq!(tree.query(0, len - 1), latest.query(0, len - 1));
        prop_assert_eq!(tree.query_at(usize::MAX, 0, len - 1), latest.query(0, len - 1));
    }

    #[test]
    fn sparse_persistent_matches_dense(
        len in 1usize..64,
        updates in proptest::collection::vec((any::<usize>(), any::<usize>(), 1i64..20), 1..20),
    ) {
        // assign semantics make absent positions and zero-initialized ones agree once touched
        let mut sparse = PersistentTree::sparse(len, Preset::SumAssign).expect("non-empty");
        let mut dense = PersistentTree::new(vec![0; len], Preset::SumAssign).expect("non-empty");
        let mut touched = vec![false; len];

        for (a, b, value) in updates {
            let (l, r) = range_in(a, b, len);
            sparse.update_latest(l, r, value);
            dense.update_latest(l, r, value);
            touched[l..=r].iter_mut().for_each(|t| *t = true);
        }

        let version = dense.last_version();
        for position in 0..len {
            let expected = touched[position].then(|| dense.get(version, position)).flatten();
            prop_assert_eq!(sparse.get(version, position), expected);
        }
        prop_assert_eq!(sparse.query(version, 0, len - 1), dense.query(version, 0, len - 1));
    }
}
