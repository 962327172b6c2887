use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use weft_tree::ThreadedBstMap;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Generates keys in a range small enough to force collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Get(i64),
    ContainsKey(i64),
    GetKeyValue(i64),
    RightOf(i64),
    FirstKeyValue,
    LastKeyValue,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::GetKeyValue),
        1 => key_strategy().prop_map(MapOp::RightOf),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
    ]
}

// ─── Core operations against the BTreeMap model ──────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both ThreadedBstMap and
    /// BTreeMap and asserts identical results at every step. The model uses
    /// first-insert-wins semantics to mirror the no-replace insertion
    /// contract. There is no remove: the contract has no deletion.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut tb_map: ThreadedBstMap<i64, i64> = ThreadedBstMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    let inserted = tb_map.insert(*k, *v);
                    prop_assert_eq!(inserted, !bt_map.contains_key(k), "insert({}, {})", k, v);
                    bt_map.entry(*k).or_insert(*v);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(tb_map.get(k), bt_map.get(k), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(tb_map.contains_key(k), bt_map.contains_key(k), "contains_key({})", k);
                }
                MapOp::GetKeyValue(k) => {
                    prop_assert_eq!(tb_map.get_key_value(k), bt_map.get_key_value(k), "get_key_value({})", k);
                }
                MapOp::RightOf(k) => {
                    // The model cannot predict tree topology, but a present
                    // answer must at least name a strictly greater key that
                    // is actually stored.
                    if let Some(&right) = tb_map.right_of(k) {
                        prop_assert!(right > *k, "right_of({}) = {}", k, right);
                        prop_assert!(bt_map.contains_key(&right), "right_of({}) = {}", k, right);
                    }
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(tb_map.first_key_value(), bt_map.first_key_value(), "first_key_value");
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(tb_map.last_key_value(), bt_map.last_key_value(), "last_key_value");
                }
            }
            prop_assert_eq!(tb_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(tb_map.is_empty(), bt_map.is_empty(), "is_empty mismatch after {:?}", op);
        }
    }

    /// Iteration yields the same entries, in the same order, as BTreeMap.
    #[test]
    fn iter_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let mut tb_map: ThreadedBstMap<i64, i64> = ThreadedBstMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for (k, v) in &entries {
            tb_map.insert(*k, *v);
            bt_map.entry(*k).or_insert(*v);
        }

        prop_assert!(tb_map.iter().eq(bt_map.iter()));
        prop_assert!(tb_map.keys().eq(bt_map.keys()));
        prop_assert!(tb_map.values().eq(bt_map.values()));
        prop_assert!(tb_map.into_iter().eq(bt_map.into_iter()));
    }

    /// begin()/next() visits exactly len() keys, sorted, with no repeats.
    #[test]
    fn traversal_round_trip(keys in proptest::collection::vec(key_strategy(), 0..TEST_SIZE)) {
        let mut map: ThreadedBstMap<i64, i64> = ThreadedBstMap::new();
        for &k in &keys {
            map.insert(k, k);
        }

        map.begin();
        let mut walked = Vec::new();
        while let Some(&key) = map.next() {
            walked.push(key);
        }
        // Exhausted traversals stay exhausted.
        prop_assert_eq!(map.next(), None);

        let mut expected: Vec<i64> = keys.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(walked, expected);
    }

    /// After a clone, mutating either tree leaves the other's entries and
    /// iteration order untouched.
    #[test]
    fn clone_independence(keys in proptest::collection::vec(key_strategy(), 0..200)) {
        let mut original: ThreadedBstMap<i64, i64> = ThreadedBstMap::new();
        for &k in &keys {
            original.insert(k, k);
        }

        let mut copy = original.clone();
        prop_assert_eq!(&copy, &original);

        copy.insert(10_000, 0);
        original.insert(-10_000, 0);

        prop_assert!(!original.contains_key(&10_000));
        prop_assert!(!copy.contains_key(&-10_000));

        let original_keys: Vec<i64> = original.keys().copied().collect();
        let copy_keys: Vec<i64> = copy.keys().copied().collect();
        prop_assert!(original_keys.contains(&-10_000));
        prop_assert!(!original_keys.contains(&10_000));
        prop_assert!(copy_keys.contains(&10_000));
        prop_assert!(!copy_keys.contains(&-10_000));
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn duplicate_heavy_insert_sequence() {
    let mut tree = ThreadedBstMap::new();
    for key in [30, 50, 15, 8, 25, 70, 60, 20, 28, 9, 6, 10, 8] {
        tree.insert(key, key * 10);
    }

    // 13 inserts, one duplicate.
    assert_eq!(tree.len(), 12);

    tree.begin();
    let mut keys = Vec::new();
    while let Some(&key) = tree.next() {
        keys.push(key);
    }
    assert_eq!(keys, [6, 8, 9, 10, 15, 20, 25, 28, 30, 50, 60, 70]);

    // The duplicate insert of 8 must not have replaced the first value, and
    // lookups are stable across repeated calls.
    assert_eq!(tree.get(&8), Some(&80));
    assert_eq!(tree.get(&8), Some(&80));
}

#[test]
fn empty_map_traversal() {
    let mut map: ThreadedBstMap<i32, i32> = ThreadedBstMap::new();
    assert_eq!(map.len(), 0);

    map.begin();
    assert_eq!(map.next(), None);
    assert_eq!(map.next(), None);

    assert_eq!(map.first_key_value(), None);
    assert_eq!(map.last_key_value(), None);
    assert_eq!(map.iter().next(), None);
}

#[test]
fn single_key_has_no_right() {
    let mut map = ThreadedBstMap::new();
    map.insert(5, "x");
    assert_eq!(map.right_of(&5), None);
}

#[test]
fn right_of_returns_immediate_child_key() {
    let mut map = ThreadedBstMap::new();
    map.insert(2, "Hi");
    map.insert(1, "Hello");
    map.insert(3, "Hello");

    // 3 is 2's true right child, so it is the answer even though a deeper
    // left spine under it would hold the inorder successor in general.
    assert_eq!(map.right_of(&2), Some(&3));
    assert_eq!(map.right_of(&1), Some(&2));
    assert_eq!(map.right_of(&3), None);
    assert_eq!(map.right_of(&42), None);
}

#[test]
fn right_of_skips_deep_successor() {
    // 10 -> Child(20), and 20 has a left spine down to 12; the inorder
    // successor of 10 is 12, but the right link names 20.
    let mut map = ThreadedBstMap::new();
    for key in [10, 20, 15, 12] {
        map.insert(key, ());
    }
    assert_eq!(map.right_of(&10), Some(&20));

    // The threaded side still reports the true successor.
    assert_eq!(map.right_of(&12), Some(&15));
}

#[test]
fn get_or_default_mints_defaults_for_missing_keys() {
    let mut map = ThreadedBstMap::new();
    map.insert(1, 10);
    assert_eq!(map.get_or_default(&1), 10);
    assert_eq!(map.get_or_default(&2), 0);

    // A default result does not mean the key exists.
    assert!(!map.contains_key(&2));
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_panics_on_missing_key() {
    let map: ThreadedBstMap<i32, i32> = ThreadedBstMap::new();
    let _ = map[&1];
}

#[test]
fn begin_restarts_an_active_traversal() {
    let mut map = ThreadedBstMap::new();
    for key in [2, 1, 3] {
        map.insert(key, ());
    }

    map.begin();
    assert_eq!(map.next(), Some(&1));

    map.begin();
    assert_eq!(map.next(), Some(&1));
    assert_eq!(map.next(), Some(&2));
    assert_eq!(map.next(), Some(&3));
    assert_eq!(map.next(), None);
}

#[test]
fn clear_resets_traversal_and_len() {
    let mut map = ThreadedBstMap::new();
    map.insert(1, "a");
    map.begin();
    map.clear();

    assert_eq!(map.len(), 0);
    assert_eq!(map.next(), None);
    assert_eq!(map.get(&1), None);

    // The map is usable again after clearing.
    map.insert(2, "b");
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&2), Some(&"b"));
}

#[test]
fn clone_from_replaces_existing_entries() {
    let mut source = ThreadedBstMap::new();
    source.insert(1, "one");
    source.insert(2, "two");

    let mut target = ThreadedBstMap::new();
    target.insert(9, "nine");
    target.clone_from(&source);

    assert_eq!(target.len(), 2);
    assert_eq!(target.get(&9), None);
    assert_eq!(target.get(&1), Some(&"one"));
    assert!(target.iter().eq(source.iter()));
}

#[test]
fn from_iterator_first_insert_wins() {
    let map: ThreadedBstMap<i32, &str> = [(1, "first"), (2, "b"), (1, "second")].into_iter().collect();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"first"));
}

// ─── Dump format ─────────────────────────────────────────────────────────────

#[test]
fn dump_lists_threads_in_inorder() {
    let mut map = ThreadedBstMap::new();
    map.insert(2, "b");
    map.insert(1, "a");
    map.insert(3, "c");

    let mut listing = String::new();
    map.dump(&mut listing).unwrap();

    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(
        lines,
        [
            "**************************************************",
            "***************** ThreadedBstMap *****************",
            "** size: 3",
            "(1,a,2)",
            "(2,b)",
            "(3,c)",
            "**************************************************",
        ]
    );
}

#[test]
fn dump_of_empty_map_is_just_the_frame() {
    let map: ThreadedBstMap<i32, i32> = ThreadedBstMap::new();
    let mut listing = String::new();
    map.dump(&mut listing).unwrap();

    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[2], "** size: 0");
}

#[test]
fn dump_last_node_prints_without_thread_key() {
    // Descending inserts build a pure left spine: 1 and 2 are threaded to
    // their successors, 3 is last inorder and its thread slot is empty.
    let mut map = ThreadedBstMap::new();
    for key in [3, 2, 1] {
        map.insert(key, key);
    }

    let mut listing = String::new();
    map.dump(&mut listing).unwrap();
    assert!(listing.contains("(1,1,2)"));
    assert!(listing.contains("(2,2,3)"));
    assert!(listing.contains("\n(3,3)\n"));
}
