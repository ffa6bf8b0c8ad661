//! Pareto front (skyline) extraction over the tree.
//!
//! Extraction is a branch-and-bound traversal over the same node store the
//! range queries use. Every subtree is represented in a priority queue by
//! the *ideal corner* of its bounding box: the corner assembled from the
//! best value in every dimension under the caller's objective directions.
//! The ideal corner bounds from below what any point inside the subtree can
//! achieve, so a subtree whose corner is already dominated by a front
//! member is discarded without visiting a single descendant.
//!
//! Candidates pop in direction-normalized lexicographic order of their
//! corner (ties by arrival order). That order is monotone under dominance -
//! a dominating point always pops before anything it dominates - so a
//! popped entry only needs to be checked against the current front.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;
use crate::point::{cmp_scalar, Point, Scalar};
use crate::rtree::{Node, NodeId, RTree};

/// Per-dimension optimization objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Minimize,
    Maximize,
}

impl Objective {
    /// Checks whether `a` is strictly better than `b` under this objective.
    fn prefers<K: Scalar>(&self, a: K, b: K) -> bool {
        match self {
            Objective::Minimize => a < b,
            Objective::Maximize => a > b,
        }
    }
}

/// Objective directions for all `M` dimensions of a front extraction.
///
/// # Examples
///
/// ```rust
/// use skytree::{Direction, Objective, Point};
///
/// let direction: Direction<2> = Direction::new([Objective::Minimize, Objective::Maximize]);
/// let cheap_and_fast = Point::new([1.0, 9.0]);
/// let pricey_and_slow = Point::new([5.0, 2.0]);
/// assert!(direction.dominates(&cheap_and_fast, &pricey_and_slow));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction<const M: usize> {
    objectives: [Objective; M],
}

impl<const M: usize> Direction<M> {
    /// Creates a direction vector from per-dimension objectives.
    pub fn new(objectives: [Objective; M]) -> Self {
        Direction { objectives }
    }

    /// Minimizes every dimension.
    pub fn minimize() -> Self {
        Direction {
            objectives: [Objective::Minimize; M],
        }
    }

    /// Maximizes every dimension.
    pub fn maximize() -> Self {
        Direction {
            objectives: [Objective::Maximize; M],
        }
    }

    /// Returns the objective for one dimension.
    pub fn objective(&self, dim: usize) -> Objective {
        self.objectives[dim]
    }

    /// Checks whether `a` dominates `b`: no worse in every dimension and
    /// strictly better in at least one. Equal points dominate neither.
    pub fn dominates<K: Scalar>(&self, a: &Point<K, M>, b: &Point<K, M>) -> bool {
        let mut strictly_better = false;
        for i in 0..M {
            if self.objectives[i].prefers(b[i], a[i]) {
                return false;
            }
            if self.objectives[i].prefers(a[i], b[i]) {
                strictly_better = true;
            }
        }
        strictly_better
    }

    /// Returns the corner of `bbox` that is best in every dimension under
    /// these objectives: the lower bound on what any point inside can reach.
    pub fn ideal_corner<K: Scalar>(&self, bbox: &BoundingBox<K, M>) -> Point<K, M> {
        let mut coords = *bbox.min().coords();
        for i in 0..M {
            if self.objectives[i] == Objective::Maximize {
                coords[i] = bbox.max()[i];
            }
        }
        Point::new(coords)
    }

    /// Lexicographic comparison after normalizing each dimension so that
    /// "better" sorts first.
    fn cmp_corner<K: Scalar>(&self, a: &Point<K, M>, b: &Point<K, M>) -> Ordering {
        for i in 0..M {
            let ord = match self.objectives[i] {
                Objective::Minimize => cmp_scalar(&a[i], &b[i]),
                Objective::Maximize => cmp_scalar(&b[i], &a[i]),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl<const M: usize> Display for Direction<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, o) in self.objectives.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match o {
                Objective::Minimize => write!(f, "min")?,
                Objective::Maximize => write!(f, "max")?,
            }
        }
        write!(f, "]")
    }
}

/// Options for front extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontOptions {
    /// When `true`, a candidate coordinate-equal to an existing front member
    /// is treated as dominated and dropped (first arrival wins). When
    /// `false` (the default), co-located points are co-equal members and all
    /// of them join the front.
    pub distinct: bool,
}

/// The set of mutually non-dominated entries of a tree, as extracted by
/// [`RTree::pareto_front`]. Members borrow from the tree.
pub struct ParetoFront<'a, K: Scalar, V, const M: usize> {
    members: Vec<(&'a Point<K, M>, &'a V)>,
    direction: Direction<M>,
}

impl<'a, K: Scalar, V, const M: usize> ParetoFront<'a, K, V, M> {
    /// Returns the number of front members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the front members in extraction order.
    pub fn members(&self) -> &[(&'a Point<K, M>, &'a V)] {
        &self.members
    }

    /// Iterates over the front members.
    pub fn iter(&self) -> std::slice::Iter<'_, (&'a Point<K, M>, &'a V)> {
        self.members.iter()
    }

    /// Returns the direction the front was extracted under.
    pub fn direction(&self) -> &Direction<M> {
        &self.direction
    }

    /// Returns the per-dimension best value across all members, each
    /// dimension taken independently. `None` for an empty front.
    pub fn ideal(&self) -> Option<Point<K, M>> {
        self.fold_members(|objective, best, candidate| objective.prefers(candidate, best))
    }

    /// Returns the per-dimension worst value across all members. Together
    /// with [`ideal`](Self::ideal) this bounds the region the front spans.
    /// `None` for an empty front.
    pub fn nadir(&self) -> Option<Point<K, M>> {
        self.fold_members(|objective, worst, candidate| objective.prefers(worst, candidate))
    }

    fn fold_members(
        &self,
        replace: impl Fn(Objective, K, K) -> bool,
    ) -> Option<Point<K, M>> {
        let first = self.members.first()?;
        let mut coords = *first.0.coords();
        for (point, _) in &self.members[1..] {
            for i in 0..M {
                if replace(self.direction.objective(i), coords[i], point[i]) {
                    coords[i] = point[i];
                }
            }
        }
        Some(Point::new(coords))
    }
}

/// A queued subtree or entry, ranked by its ideal corner.
struct FrontCandidate<K: Scalar, const M: usize> {
    corner: Point<K, M>,
    direction: Direction<M>,
    seq: u64,
    target: Target,
}

#[derive(Clone, Copy)]
enum Target {
    Node(NodeId),
    Entry(NodeId, usize),
}

impl<K: Scalar, const M: usize> Ord for FrontCandidate<K, M> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest candidate; the best-ranked corner
        // (and among equals, the earliest-pushed one) must rank greatest.
        self.direction
            .cmp_corner(&other.corner, &self.corner)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K: Scalar, const M: usize> PartialOrd for FrontCandidate<K, M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Scalar, const M: usize> PartialEq for FrontCandidate<K, M> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Scalar, const M: usize> Eq for FrontCandidate<K, M> {}

impl<K: Scalar, V, const M: usize> RTree<K, V, M> {
    /// Extracts the Pareto front of the stored entries under the given
    /// objective directions, with default options.
    pub fn pareto_front(&self, direction: &Direction<M>) -> ParetoFront<'_, K, V, M> {
        self.pareto_front_with(direction, FrontOptions::default())
    }

    /// Extracts the Pareto front with explicit options.
    ///
    /// Branch-and-bound: subtrees whose bounding box cannot contain a
    /// non-dominated point are pruned without being visited, so extraction
    /// typically touches a fraction of the tree instead of comparing all
    /// entries pairwise.
    pub fn pareto_front_with(
        &self,
        direction: &Direction<M>,
        options: FrontOptions,
    ) -> ParetoFront<'_, K, V, M> {
        let mut members: Vec<(&Point<K, M>, &V)> = Vec::new();
        let mut heap: BinaryHeap<FrontCandidate<K, M>> = BinaryHeap::new();
        let mut seq = 0;

        if let Some(root) = self.root_id() {
            heap.push(FrontCandidate {
                corner: direction.ideal_corner(&self.node(root).compute_bbox()),
                direction: *direction,
                seq,
                target: Target::Node(root),
            });
            seq += 1;
        }

        while let Some(candidate) = heap.pop() {
            match candidate.target {
                Target::Entry(leaf_id, idx) => {
                    let entry = match self.node(leaf_id) {
                        Node::Leaf { entries } => &entries[idx],
                        Node::Internal { .. } => continue,
                    };
                    let dominated = members.iter().any(|(p, _)| {
                        direction.dominates(p, &entry.key)
                            || (options.distinct && **p == entry.key)
                    });
                    if dominated {
                        continue;
                    }
                    members.retain(|(p, _)| !direction.dominates(&entry.key, p));
                    members.push((&entry.key, &entry.value));
                }
                Target::Node(node_id) => {
                    // The corner bounds every point in the subtree from
                    // below; a dominated corner proves the whole subtree
                    // dominated.
                    if members
                        .iter()
                        .any(|(p, _)| direction.dominates(p, &candidate.corner))
                    {
                        log::trace!("pruning subtree {} at corner {}", node_id, candidate.corner);
                        continue;
                    }
                    match self.node(node_id) {
                        Node::Leaf { entries } => {
                            for (idx, entry) in entries.iter().enumerate() {
                                heap.push(FrontCandidate {
                                    corner: entry.key,
                                    direction: *direction,
                                    seq,
                                    target: Target::Entry(node_id, idx),
                                });
                                seq += 1;
                            }
                        }
                        Node::Internal { children } => {
                            for child in children {
                                heap.push(FrontCandidate {
                                    corner: direction.ideal_corner(&child.bbox),
                                    direction: *direction,
                                    seq,
                                    target: Target::Node(child.node),
                                });
                                seq += 1;
                            }
                        }
                    }
                }
            }
        }

        ParetoFront {
            members,
            direction: *direction,
        }
    }
}
