//! Branch-and-bound front extraction must agree with the O(n^2) pairwise
//! reference on every input and direction.

use skytree::{Direction, FrontOptions, Point, RTree, TreeOptions};
use skytree_int_test::test_util::{
    brute_force_front, random_direction, random_points, seeded_rng, sorted_coords,
};

fn build_tree<const M: usize>(points: &[Point<f64, M>]) -> RTree<f64, usize, M> {
    let mut tree = RTree::with_options(TreeOptions::new(2, 4).unwrap());
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
    }
    tree
}

#[test]
fn test_front_known_scenario() {
    let points = [
        Point::new([1.0, 5.0]),
        Point::new([2.0, 3.0]),
        Point::new([3.0, 3.0]),
        Point::new([4.0, 1.0]),
        Point::new([5.0, 5.0]),
    ];
    let tree = build_tree(&points);
    let front = tree.pareto_front(&Direction::minimize());

    let got = sorted_coords(front.members().iter().map(|(p, _)| **p));
    assert_eq!(got, vec![[1.0, 5.0], [2.0, 3.0], [4.0, 1.0]]);
}

#[test]
fn test_front_matches_brute_force_2d() {
    let mut rng = seeded_rng(31);
    for round in 0..10 {
        let points: Vec<Point<f64, 2>> = random_points(&mut rng, 300);
        let tree = build_tree(&points);
        let direction = random_direction(&mut rng);

        let got = sorted_coords(tree.pareto_front(&direction).members().iter().map(|(p, _)| **p));
        let expected = sorted_coords(brute_force_front(&points, &direction));
        assert_eq!(got, expected, "round {} direction {}", round, direction);
    }
}

#[test]
fn test_front_matches_brute_force_3d() {
    let mut rng = seeded_rng(32);
    for round in 0..10 {
        let points: Vec<Point<f64, 3>> = random_points(&mut rng, 200);
        let tree = build_tree(&points);
        let direction = random_direction(&mut rng);

        let got = sorted_coords(tree.pareto_front(&direction).members().iter().map(|(p, _)| **p));
        let expected = sorted_coords(brute_force_front(&points, &direction));
        assert_eq!(got, expected, "round {} direction {}", round, direction);
    }
}

#[test]
fn test_front_matches_brute_force_4d() {
    let mut rng = seeded_rng(33);
    let points: Vec<Point<f64, 4>> = random_points(&mut rng, 150);
    let tree = build_tree(&points);

    for _ in 0..5 {
        let direction = random_direction(&mut rng);
        let got = sorted_coords(tree.pareto_front(&direction).members().iter().map(|(p, _)| **p));
        let expected = sorted_coords(brute_force_front(&points, &direction));
        assert_eq!(got, expected, "direction {}", direction);
    }
}

#[test]
fn test_front_members_are_mutually_nondominated() {
    let mut rng = seeded_rng(34);
    let points: Vec<Point<f64, 3>> = random_points(&mut rng, 250);
    let tree = build_tree(&points);
    let direction = Direction::minimize();

    let front = tree.pareto_front(&direction);
    let members: Vec<Point<f64, 3>> = front.members().iter().map(|(p, _)| **p).collect();

    for a in &members {
        for b in &members {
            assert!(!direction.dominates(a, b), "{} dominates {}", a, b);
        }
    }

    // Every non-member must be dominated by at least one member.
    let member_set = sorted_coords(members.iter().copied());
    for p in &points {
        if member_set.binary_search_by(|c| c.partial_cmp(p.coords()).unwrap()).is_ok() {
            continue;
        }
        assert!(
            members.iter().any(|m| direction.dominates(m, p)),
            "{} is outside the front but undominated",
            p
        );
    }
}

#[test]
fn test_ideal_nadir_against_members() {
    let mut rng = seeded_rng(35);
    let points: Vec<Point<f64, 3>> = random_points(&mut rng, 200);
    let tree = build_tree(&points);
    let direction = Direction::minimize();

    let front = tree.pareto_front(&direction);
    let ideal = front.ideal().unwrap();
    let nadir = front.nadir().unwrap();

    for dim in 0..3 {
        let mut best = f64::INFINITY;
        let mut worst = f64::NEG_INFINITY;
        for (p, _) in front.members() {
            best = best.min(p[dim]);
            worst = worst.max(p[dim]);
        }
        assert_eq!(ideal[dim], best);
        assert_eq!(nadir[dim], worst);
    }
}

#[test]
fn test_front_distinct_option_drops_duplicates() {
    let mut tree: RTree<f64, usize, 2> = RTree::with_options(TreeOptions::new(2, 4).unwrap());
    for i in 0..4 {
        tree.insert(Point::new([1.0, 1.0]), i);
    }
    tree.insert(Point::new([0.5, 2.0]), 4);

    let coequal = tree.pareto_front(&Direction::minimize());
    assert_eq!(coequal.len(), 5);

    let distinct = tree.pareto_front_with(&Direction::minimize(), FrontOptions { distinct: true });
    assert_eq!(distinct.len(), 2);
}

#[test]
fn test_front_after_removals() {
    let mut rng = seeded_rng(36);
    let points: Vec<Point<f64, 2>> = random_points(&mut rng, 120);
    let mut tree = build_tree(&points);
    let direction = Direction::minimize();

    // Remove a third of the points and re-validate against brute force.
    for (i, p) in points.iter().enumerate().take(40) {
        assert_eq!(tree.remove(p, &i), Some(i));
    }
    let remaining: Vec<Point<f64, 2>> = points[40..].to_vec();

    let got = sorted_coords(tree.pareto_front(&direction).members().iter().map(|(p, _)| **p));
    let expected = sorted_coords(brute_force_front(&remaining, &direction));
    assert_eq!(got, expected);
}
