//! Lazy query traversal over the tree.
//!
//! Queries never mutate the tree. A cursor holds its own traversal state
//! (an explicit stack for depth-first filters, a priority queue for
//! nearest-k), so results are produced on demand and a query restarts by
//! building a fresh cursor from the root. The immutable borrow on the tree
//! keeps mutation impossible while a cursor is alive.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::filter::{BoxMatch, SpatialFilter};
use crate::point::{cmp_scalar, Point, Scalar};
use crate::rtree::{Node, NodeId, RTree};

/// A lazy cursor over entries matching a filter.
///
/// Returned by [`RTree::find`] and [`RTree::nearest`]. Yields
/// `(&Point, &V)` pairs; the order is deterministic for a fixed tree state:
/// depth-first for range filters, increasing distance for nearest-k.
pub struct EntryCursor<'a, K: Scalar, V, const M: usize> {
    tree: &'a RTree<K, V, M>,
    state: CursorState<K, V, M>,
}

enum CursorState<K: Scalar, V, const M: usize> {
    DepthFirst {
        filter: SpatialFilter<K, V, M>,
        stack: Vec<NodeId>,
        leaf: Option<(NodeId, usize)>,
    },
    BestFirst {
        center: Point<K, M>,
        heap: BinaryHeap<NearCandidate<K>>,
        remaining: usize,
        seq: u64,
    },
}

/// A node or entry awaiting expansion during best-first search, ranked by
/// its lower-bound squared distance to the query point. Ties resolve by
/// arrival order.
struct NearCandidate<K: Scalar> {
    dist: K,
    seq: u64,
    target: Target,
}

#[derive(Clone, Copy)]
enum Target {
    Node(NodeId),
    Entry(NodeId, usize),
}

impl<K: Scalar> Ord for NearCandidate<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest candidate; the nearest one (and among
        // equals, the earliest-pushed one) must rank greatest.
        cmp_scalar(&other.dist, &self.dist).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K: Scalar> PartialOrd for NearCandidate<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Scalar> PartialEq for NearCandidate<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Scalar> Eq for NearCandidate<K> {}

impl<'a, K: Scalar, V, const M: usize> EntryCursor<'a, K, V, M> {
    pub(crate) fn depth_first(tree: &'a RTree<K, V, M>, filter: SpatialFilter<K, V, M>) -> Self {
        let stack = tree.root_id().into_iter().collect();
        EntryCursor {
            tree,
            state: CursorState::DepthFirst {
                filter,
                stack,
                leaf: None,
            },
        }
    }

    pub(crate) fn best_first(tree: &'a RTree<K, V, M>, center: Point<K, M>, count: usize) -> Self {
        let mut heap = BinaryHeap::new();
        let mut seq = 0;
        if count > 0 {
            if let Some(root) = tree.root_id() {
                heap.push(NearCandidate {
                    dist: K::zero(),
                    seq,
                    target: Target::Node(root),
                });
                seq += 1;
            }
        }
        EntryCursor {
            tree,
            state: CursorState::BestFirst {
                center,
                heap,
                remaining: count,
                seq,
            },
        }
    }
}

impl<'a, K: Scalar, V, const M: usize> Iterator for EntryCursor<'a, K, V, M> {
    type Item = (&'a Point<K, M>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        match &mut self.state {
            CursorState::DepthFirst {
                filter,
                stack,
                leaf,
            } => loop {
                if let Some((leaf_id, next_idx)) = leaf {
                    if let Node::Leaf { entries } = tree.node(*leaf_id) {
                        while *next_idx < entries.len() {
                            let entry = &entries[*next_idx];
                            *next_idx += 1;
                            if filter.matches_entry(&entry.key, &entry.value) {
                                return Some((&entry.key, &entry.value));
                            }
                        }
                    }
                    *leaf = None;
                }

                let node_id = stack.pop()?;
                match tree.node(node_id) {
                    Node::Leaf { .. } => *leaf = Some((node_id, 0)),
                    Node::Internal { children } => {
                        // Reversed push order so child 0 is visited first.
                        for child in children.iter().rev() {
                            if filter.matches_bbox(&child.bbox) != BoxMatch::Outside {
                                stack.push(child.node);
                            }
                        }
                    }
                }
            },
            CursorState::BestFirst {
                center,
                heap,
                remaining,
                seq,
            } => {
                if *remaining == 0 {
                    return None;
                }
                while let Some(candidate) = heap.pop() {
                    match candidate.target {
                        Target::Entry(leaf_id, idx) => {
                            if let Node::Leaf { entries } = tree.node(leaf_id) {
                                let entry = &entries[idx];
                                *remaining -= 1;
                                return Some((&entry.key, &entry.value));
                            }
                        }
                        Target::Node(node_id) => match tree.node(node_id) {
                            Node::Leaf { entries } => {
                                for (idx, entry) in entries.iter().enumerate() {
                                    heap.push(NearCandidate {
                                        dist: entry.key.distance_sq(center),
                                        seq: *seq,
                                        target: Target::Entry(node_id, idx),
                                    });
                                    *seq += 1;
                                }
                            }
                            Node::Internal { children } => {
                                for child in children {
                                    heap.push(NearCandidate {
                                        dist: child.bbox.min_distance_sq(center),
                                        seq: *seq,
                                        target: Target::Node(child.node),
                                    });
                                    *seq += 1;
                                }
                            }
                        },
                    }
                }
                None
            }
        }
    }
}

/// Iterator over every entry of a tree in depth-first order.
pub struct EntryIter<'a, K: Scalar, V, const M: usize> {
    tree: &'a RTree<K, V, M>,
    stack: Vec<NodeId>,
    leaf: Option<(NodeId, usize)>,
}

impl<'a, K: Scalar, V, const M: usize> EntryIter<'a, K, V, M> {
    pub(crate) fn new(tree: &'a RTree<K, V, M>) -> Self {
        EntryIter {
            tree,
            stack: tree.root_id().into_iter().collect(),
            leaf: None,
        }
    }
}

impl<'a, K: Scalar, V, const M: usize> Iterator for EntryIter<'a, K, V, M> {
    type Item = (&'a Point<K, M>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            if let Some((leaf_id, next_idx)) = &mut self.leaf {
                if let Node::Leaf { entries } = tree.node(*leaf_id) {
                    if *next_idx < entries.len() {
                        let entry = &entries[*next_idx];
                        *next_idx += 1;
                        return Some((&entry.key, &entry.value));
                    }
                }
                self.leaf = None;
            }

            let node_id = self.stack.pop()?;
            match tree.node(node_id) {
                Node::Leaf { .. } => self.leaf = Some((node_id, 0)),
                Node::Internal { children } => {
                    for child in children.iter().rev() {
                        self.stack.push(child.node);
                    }
                }
            }
        }
    }
}
