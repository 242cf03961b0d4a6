//! Table-driven scenarios shared by every variant

use rangeagg::{
    FnOperators, IterativeTree, MaxAssign, MinAdd, Operators, PartialTree, PersistentTree,
    StaticTree, SumAdd, SumAssign, TreeError,
};
use test_case::test_case;

/// Reference scenario: eight zeros, sum / add, two overlapping updates
#[test]
fn reference_scenario_across_variants() {
    let mut lazy = StaticTree::new(vec![0i64; 8], SumAdd).unwrap();
    let mut iterative = IterativeTree::new(vec![0i64; 8], SumAdd).unwrap();
    let mut persistent = PersistentTree::new(vec![0i64; 8], SumAdd).unwrap();

    lazy.update(2, 5, 3);
    iterative.update(2, 5, 3);
    let first = persistent.update(0, 2, 5, 3);
    assert_eq!(lazy.query(0, 7), Some(12));
    assert_eq!(iterative.query(0, 7), Some(12));
    assert_eq!(persistent.query(first, 0, 7), Some(12));

    lazy.update(0, 3, 2);
    iterative.update(0, 3, 2);
    let second = persistent.update(first, 0, 3, 2);
    assert_eq!(lazy.query(2, 5), Some(16));
    assert_eq!(iterative.query(2, 5), Some(16));
    assert_eq!(persistent.query(second, 2, 5), Some(16));

    // the first version is unaffected by the second update
    assert_eq!(persistent.query(first, 0, 7), Some(12));
}

#[test_case(1 ; "single position")]
#[test_case(2 ; "two positions")]
#[test_case(7 ; "odd length")]
#[test_case(16 ; "power of two")]
#[test_case(33 ; "just past a power of two")]
fn whole_range_add_then_point_reads(len: usize) {
    let mut lazy = StaticTree::new(vec![1i64; len], SumAdd).unwrap();
    let mut iterative = IterativeTree::new(vec![1i64; len], SumAdd).unwrap();
    let mut persistent = PersistentTree::new(vec![1i64; len], SumAdd).unwrap();

    lazy.update(0, len - 1, 4);
    iterative.update(0, len - 1, 4);
    let version = persistent.update(0, 0, len - 1, 4);

    for position in 0..len {
        assert_eq!(lazy.get(position), Some(5));
        assert_eq!(iterative.get(position), Some(5));
        assert_eq!(persistent.get(version, position), Some(5));
        assert_eq!(persistent.get(0, position), Some(1));
    }
    assert_eq!(lazy.query(0, len - 1), Some(5 * len as i64));
}

#[test_case(3, 2 ; "left past right")]
#[test_case(7, 0 ; "reversed full range")]
fn empty_ranges_are_absent(l: usize, r: usize) {
    let mut lazy = StaticTree::new(vec![1i64; 8], SumAdd).unwrap();
    let mut iterative = IterativeTree::new(vec![1i64; 8], SumAdd).unwrap();
    let mut persistent = PersistentTree::new(vec![1i64; 8], SumAdd).unwrap();
    let partial = PartialTree::new(vec![1i64; 8], SumAdd).unwrap();

    lazy.update(l, r, 100);
    iterative.update(l, r, 100);
    let version = persistent.update(0, l, r, 100);

    assert_eq!(lazy.query(l, r), None);
    assert_eq!(iterative.query(l, r), None);
    assert_eq!(persistent.query(version, l, r), None);
    assert_eq!(partial.query(l, r), None);

    assert_eq!(lazy.query(0, 7), Some(8));
    assert_eq!(persistent.query(version, 0, 7), Some(8));
}

#[test]
fn out_of_range_and_unknown_versions_fail() {
    let mut lazy = StaticTree::new(vec![1i64; 4], SumAdd).unwrap();
    let mut persistent = PersistentTree::new(vec![1i64; 4], SumAdd).unwrap();
    let mut partial = PartialTree::new(vec![1i64; 4], SumAdd).unwrap();

    assert_eq!(
        lazy.checked_query(2, 4),
        Err(TreeError::PositionOutOfRange { position: 4, len: 4 })
    );
    assert_eq!(
        persistent.checked_update(5, 0, 0, 1),
        Err(TreeError::UnknownVersion { version: 5, latest: 0 })
    );
    assert!(persistent.checked_query(0, 0, 9).is_err());
    assert!(partial.checked_update(4, 1).is_err());
    assert_eq!(
        StaticTree::new(Vec::<i64>::new(), SumAdd).unwrap_err(),
        TreeError::EmptyInput
    );
}

#[test]
fn assign_over_add_history() {
    let mut tree = PersistentTree::new(vec![3i64, 1, 4, 1, 5, 9, 2, 6], SumAssign).unwrap();
    let v1 = tree.update(0, 0, 7, 2);
    let v2 = tree.update(v1, 3, 5, 0);
    let v3 = tree.update(0, 6, 7, 10);

    assert_eq!(tree.query(0, 0, 7), Some(31));
    assert_eq!(tree.query(v1, 0, 7), Some(16));
    assert_eq!(tree.query(v2, 0, 7), Some(10));
    assert_eq!(tree.query(v3, 0, 7), Some(43));
}

#[test]
fn min_and_max_presets() {
    let mut mins = StaticTree::new(vec![4i64, -2, 7, 0], MinAdd).unwrap();
    mins.update(1, 2, 5);
    assert_eq!(mins.query(0, 3), Some(0));
    assert_eq!(mins.query(1, 2), Some(3));

    let mut maxes = IterativeTree::new(vec![4i64, -2, 7, 0, 3], MaxAssign).unwrap();
    maxes.update(2, 4, -1);
    assert_eq!(maxes.query(0, 4), Some(4));
    assert_eq!(maxes.query(1, 4), Some(-1));
}

#[test]
fn closure_operators_drive_every_variant() {
    // max aggregate with add tags
    let ops = || {
        FnOperators::new(
            |a: Option<i32>, b: Option<i32>| match (a, b) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, None) => a,
                (None, b) => b,
            },
            |a: Option<i32>, b: i32| a.unwrap_or(0) + b,
            |tag: i32, _first: usize, _last: usize| tag,
        )
    };

    let mut lazy = StaticTree::new(vec![1, 5, 2, 8], ops()).unwrap();
    lazy.update(0, 2, 10);
    assert_eq!(lazy.query(0, 3), Some(15));

    let mut persistent = PersistentTree::new(vec![1, 5, 2, 8], ops()).unwrap();
    let v1 = persistent.update(0, 0, 2, 10);
    assert_eq!(persistent.query(v1, 0, 3), Some(15));
    assert_eq!(persistent.query(0, 0, 3), Some(8));

    let mut partial = PartialTree::new(vec![1, 5, 2, 8], ops()).unwrap();
    let v1 = partial.update(3, -10);
    assert_eq!(partial.query_at(v1, 0, 3), Some(5));
    assert_eq!(partial.query_at(0, 0, 3), Some(8));
    assert_eq!(ops().combine(None, None), None);
}
