//! Property tests for the structural invariants of the tree.
//!
//! After every mutation the tree must keep exact child bounding boxes,
//! fanout bounds on all non-root nodes and a uniform leaf depth; these
//! suites drive random workloads and verify the invariants with the
//! independent re-derivation in `check_integrity`.

use rand::seq::SliceRandom;
use skytree::{Point, RTree, TreeOptions};
use skytree_int_test::test_util::{init_logging, random_points, seeded_rng, sorted_coords};

fn small_fanout() -> TreeOptions {
    TreeOptions::new(2, 4).unwrap()
}

#[test]
fn test_invariants_hold_across_random_workload() {
    init_logging();
    let mut rng = seeded_rng(42);
    let points: Vec<Point<f64, 3>> = random_points(&mut rng, 200);

    let mut tree: RTree<f64, usize, 3> = RTree::with_options(small_fanout());
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
        let report = tree.check_integrity();
        assert!(report.is_valid, "after insert {}: {:?}", i, report.errors);
    }
    assert_eq!(tree.len(), 200);

    let mut order: Vec<usize> = (0..200).collect();
    order.shuffle(&mut rng);
    for (step, i) in order.into_iter().enumerate() {
        assert_eq!(tree.remove(&points[i], &i), Some(i));
        let report = tree.check_integrity();
        assert!(report.is_valid, "after removal {}: {:?}", step, report.errors);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
}

#[test]
fn test_erase_half_never_leaves_underfull_nodes() {
    // 50 random 3-D points with max fanout 4, then 25 removals in arbitrary
    // order; condensation must keep every non-root node at or above the
    // minimum after each step.
    init_logging();
    let mut rng = seeded_rng(7);
    let points: Vec<Point<f64, 3>> = random_points(&mut rng, 50);

    let mut tree: RTree<f64, usize, 3> = RTree::with_options(small_fanout());
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
    }

    let mut order: Vec<usize> = (0..50).collect();
    order.shuffle(&mut rng);
    for i in order.into_iter().take(25) {
        assert_eq!(tree.remove(&points[i], &i), Some(i));
        let report = tree.check_integrity();
        assert!(report.is_valid, "{:?}", report.errors);
    }
    assert_eq!(tree.len(), 25);
}

#[test]
fn test_insert_then_remove_all_round_trip() {
    let mut rng = seeded_rng(1234);
    let points: Vec<Point<f64, 2>> = random_points(&mut rng, 100);

    let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_fanout());
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
    }
    assert_eq!(tree.len(), 100);
    assert!(tree.height() > 1);

    for (i, p) in points.iter().enumerate() {
        assert_eq!(tree.remove(p, &i), Some(i));
    }

    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.iter().count(), 0);
}

#[test]
fn test_iter_returns_exactly_the_inserted_entries() {
    let mut rng = seeded_rng(99);
    let points: Vec<Point<f64, 2>> = random_points(&mut rng, 150);

    let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_fanout());
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
    }

    let stored = sorted_coords(tree.iter().map(|(p, _)| *p));
    let inserted = sorted_coords(points.iter().copied());
    assert_eq!(stored, inserted);
}

#[test]
fn test_snapshot_restore_by_reinsertion() {
    let mut rng = seeded_rng(5);
    let points: Vec<Point<f64, 2>> = random_points(&mut rng, 80);

    let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_fanout());
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
    }

    // Snapshot is just the drained entry list; restore re-inserts it.
    let snapshot: Vec<(Point<f64, 2>, usize)> = tree.iter().map(|(p, v)| (*p, *v)).collect();
    let mut restored: RTree<f64, usize, 2> = RTree::with_options(small_fanout());
    for (p, v) in snapshot {
        restored.insert(p, v);
    }

    assert_eq!(restored.len(), tree.len());
    assert!(restored.check_integrity().is_valid);
    assert_eq!(
        sorted_coords(restored.iter().map(|(p, _)| *p)),
        sorted_coords(tree.iter().map(|(p, _)| *p))
    );
}

#[test]
fn test_stats_reflect_shape() {
    let mut rng = seeded_rng(11);
    let points: Vec<Point<f64, 2>> = random_points(&mut rng, 64);

    let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_fanout());
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
    }

    let stats = tree.stats();
    assert_eq!(stats.total_entries, 64);
    assert_eq!(stats.tree_height, tree.height());
    // 64 entries cannot fit into fewer than 16 max-4 leaves.
    assert!(stats.leaf_count >= 16);
    assert!(stats.node_count >= stats.leaf_count);
}
