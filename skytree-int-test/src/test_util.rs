//! Shared helpers for the integration suites: deterministic random data
//! generation and brute-force oracles the tree results are checked against.

use std::sync::Once;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skytree::{BoundingBox, Direction, Point};

static INIT_LOGGING: Once = Once::new();

/// Initializes env_logger once for the whole test binary.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a seeded generator so failures reproduce exactly.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generates `count` random points in `[0, 100)^M`.
pub fn random_points<const M: usize>(rng: &mut StdRng, count: usize) -> Vec<Point<f64, M>> {
    (0..count)
        .map(|_| {
            let mut coords = [0.0; M];
            for c in coords.iter_mut() {
                *c = rng.gen_range(0.0..100.0);
            }
            Point::new(coords)
        })
        .collect()
}

/// Generates a random query box inside `[0, 100)^M`.
pub fn random_box<const M: usize>(rng: &mut StdRng) -> BoundingBox<f64, M> {
    let mut min = [0.0; M];
    let mut max = [0.0; M];
    for i in 0..M {
        let a: f64 = rng.gen_range(0.0..100.0);
        let b: f64 = rng.gen_range(0.0..100.0);
        min[i] = a.min(b);
        max[i] = a.max(b);
    }
    BoundingBox::new(Point::new(min), Point::new(max)).expect("generated box is ordered")
}

/// Generates a random direction vector.
pub fn random_direction<const M: usize>(rng: &mut StdRng) -> Direction<M> {
    use skytree::Objective;
    let mut objectives = [Objective::Minimize; M];
    for o in objectives.iter_mut() {
        if rng.gen_bool(0.5) {
            *o = Objective::Maximize;
        }
    }
    Direction::new(objectives)
}

/// O(n^2) reference front: keeps every point not dominated by another.
pub fn brute_force_front<const M: usize>(
    points: &[Point<f64, M>],
    direction: &Direction<M>,
) -> Vec<Point<f64, M>> {
    points
        .iter()
        .filter(|p| !points.iter().any(|q| direction.dominates(q, p)))
        .copied()
        .collect()
}

/// Reference nearest-k: full sort by squared distance.
pub fn brute_force_nearest<const M: usize>(
    points: &[Point<f64, M>],
    center: &Point<f64, M>,
    k: usize,
) -> Vec<f64> {
    let mut distances: Vec<f64> = points.iter().map(|p| p.distance_sq(center)).collect();
    distances.sort_by(|a, b| a.partial_cmp(b).expect("distances are finite"));
    distances.truncate(k);
    distances
}

/// Sorts points coordinate-wise so result sets compare as sets.
pub fn sorted_coords<const M: usize>(points: impl IntoIterator<Item = Point<f64, M>>) -> Vec<[f64; M]> {
    let mut coords: Vec<[f64; M]> = points.into_iter().map(|p| *p.coords()).collect();
    coords.sort_by(|a, b| a.partial_cmp(b).expect("coordinates are finite"));
    coords
}
