//! The balanced spatial tree: insertion, deletion and structural maintenance.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::errors::{TreeError, TreeResult};
use crate::filter::SpatialFilter;
use crate::point::{cmp_scalar, Point, Scalar};
use crate::query::{EntryCursor, EntryIter};
use crate::rtree::node::{ChildRef, LeafEntry, Node, NodeArena, NodeId};
use crate::rtree::options::TreeOptions;

/// Caller-customizable payload equality, used by [`RTree::remove`] to
/// distinguish entries stored at the same coordinates.
pub type ValueEq<V> = Arc<dyn Fn(&V, &V) -> bool + Send + Sync>;

/// An in-memory R-tree over points in `M`-dimensional space.
///
/// The tree keeps every leaf at the same depth. Each internal node stores
/// the exact bounding box of each child subtree; the boxes are re-derived
/// after every structural change, which is what makes box-based pruning
/// sound for range queries, nearest-neighbour search and Pareto front
/// extraction.
///
/// Mutation takes `&mut self` and queries take `&self`, so a tree can never
/// be mutated while a query cursor is alive.
///
/// # Examples
///
/// ```rust
/// use skytree::{Point, RTree};
///
/// let mut tree: RTree<f64, &str, 2> = RTree::new();
/// tree.insert(Point::new([1.0, 2.0]), "a");
/// tree.insert(Point::new([3.0, 4.0]), "b");
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.remove(&Point::new([1.0, 2.0]), &"a"), Some("a"));
/// assert_eq!(tree.remove(&Point::new([1.0, 2.0]), &"a"), None);
/// ```
pub struct RTree<K: Scalar, V, const M: usize> {
    arena: NodeArena<K, V, M>,
    root: Option<NodeId>,
    height: usize,
    len: usize,
    options: TreeOptions,
    value_eq: ValueEq<V>,
}

impl<K: Scalar, V: PartialEq, const M: usize> RTree<K, V, M> {
    /// Creates an empty tree with default fanout and native value equality.
    pub fn new() -> Self {
        Self::with_options(TreeOptions::default())
    }

    /// Creates an empty tree with the given fanout configuration.
    pub fn with_options(options: TreeOptions) -> Self {
        Self::with_value_eq(options, Arc::new(|a: &V, b: &V| a == b))
    }
}

impl<K: Scalar, V: PartialEq, const M: usize> Default for RTree<K, V, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Scalar, V, const M: usize> RTree<K, V, M> {
    /// Creates an empty tree with a caller-supplied value equality function.
    ///
    /// Use this when payloads should compare by semantic identity rather
    /// than native `==` (or do not implement `PartialEq` at all).
    pub fn with_value_eq(options: TreeOptions, value_eq: ValueEq<V>) -> Self {
        RTree {
            arena: NodeArena::new(),
            root: None,
            height: 0,
            len: 0,
            options,
            value_eq,
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of node levels; 0 for an empty tree.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the fanout configuration.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.height = 0;
        self.len = 0;
    }

    pub(crate) fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V, M> {
        self.arena.node(id)
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Inserts an entry. Never fails for valid input; capacity is unbounded.
    ///
    /// Entries are not deduplicated: inserting the same key/value twice
    /// stores two entries.
    pub fn insert(&mut self, key: Point<K, M>, value: V) {
        log::trace!("inserting entry at {}", key);
        self.insert_entry(LeafEntry { key, value });
    }

    fn insert_entry(&mut self, entry: LeafEntry<K, V, M>) {
        self.len += 1;

        let root = match self.root {
            Some(root) => root,
            None => {
                let id = self.arena.allocate(Node::Leaf {
                    entries: vec![entry],
                });
                self.root = Some(id);
                self.height = 1;
                return;
            }
        };

        let mut path = Vec::with_capacity(self.height);
        let leaf_id = self.choose_leaf(root, &entry.key, &mut path);

        let overflow = match self.arena.node_mut(leaf_id) {
            Node::Leaf { entries } => {
                entries.push(entry);
                entries.len() > self.options.max_entries()
            }
            Node::Internal { .. } => unreachable!("descent must end at a leaf"),
        };

        if overflow {
            let (new_node, new_bbox) = self.split_leaf(leaf_id);
            self.propagate_split(&path, new_node, new_bbox);
        } else {
            self.update_path_bboxes(&path);
        }
    }

    /// Descends to the leaf whose box needs the least enlargement to take
    /// the key, recording the taken path as `(parent, child index)` pairs.
    ///
    /// Ties are broken deterministically: smaller resulting box, then
    /// smaller current box, then fewer children, then lowest child index.
    fn choose_leaf(
        &self,
        mut node_id: NodeId,
        key: &Point<K, M>,
        path: &mut Vec<(NodeId, usize)>,
    ) -> NodeId {
        let key_box = BoundingBox::from_point(*key);
        loop {
            let children = match self.arena.node(node_id) {
                Node::Leaf { .. } => return node_id,
                Node::Internal { children } => children,
            };

            let mut best = 0;
            let mut best_rank = self.subtree_rank(&children[0], &key_box);
            for (i, child) in children.iter().enumerate().skip(1) {
                let rank = self.subtree_rank(child, &key_box);
                if Self::rank_less(&rank, &best_rank) {
                    best = i;
                    best_rank = rank;
                }
            }

            path.push((node_id, best));
            node_id = children[best].node;
        }
    }

    /// Ranking key for subtree choice: (enlargement, resulting area,
    /// current area, fanout).
    fn subtree_rank(&self, child: &ChildRef<K, M>, key_box: &BoundingBox<K, M>) -> (K, K, K, usize) {
        (
            child.bbox.enlargement(key_box),
            child.bbox.union(key_box).area(),
            child.bbox.area(),
            self.arena.node(child.node).len(),
        )
    }

    fn rank_less(a: &(K, K, K, usize), b: &(K, K, K, usize)) -> bool {
        cmp_scalar(&a.0, &b.0)
            .then_with(|| cmp_scalar(&a.1, &b.1))
            .then_with(|| cmp_scalar(&a.2, &b.2))
            .then_with(|| a.3.cmp(&b.3))
            == Ordering::Less
    }

    fn split_leaf(&mut self, node_id: NodeId) -> (NodeId, BoundingBox<K, M>) {
        let entries = match self.arena.node_mut(node_id) {
            Node::Leaf { entries } => std::mem::take(entries),
            Node::Internal { .. } => unreachable!("split_leaf on internal node"),
        };
        log::debug!("splitting leaf {} holding {} entries", node_id, entries.len());

        let (left, right) = quadratic_partition(
            entries,
            |e: &LeafEntry<K, V, M>| BoundingBox::from_point(e.key),
            self.options.min_entries(),
        );

        let mut right_bbox = BoundingBox::empty();
        for entry in &right {
            right_bbox.expand_point(&entry.key);
        }

        match self.arena.node_mut(node_id) {
            Node::Leaf { entries } => *entries = left,
            Node::Internal { .. } => unreachable!("split_leaf on internal node"),
        }
        let new_id = self.arena.allocate(Node::Leaf { entries: right });
        (new_id, right_bbox)
    }

    fn split_internal(&mut self, node_id: NodeId) -> (NodeId, BoundingBox<K, M>) {
        let children = match self.arena.node_mut(node_id) {
            Node::Internal { children } => std::mem::take(children),
            Node::Leaf { .. } => unreachable!("split_internal on leaf node"),
        };
        log::debug!(
            "splitting internal node {} holding {} children",
            node_id,
            children.len()
        );

        let (left, right) = quadratic_partition(
            children,
            |c: &ChildRef<K, M>| c.bbox,
            self.options.min_entries(),
        );

        let mut right_bbox = BoundingBox::empty();
        for child in &right {
            right_bbox.expand(&child.bbox);
        }

        match self.arena.node_mut(node_id) {
            Node::Internal { children } => *children = left,
            Node::Leaf { .. } => unreachable!("split_internal on leaf node"),
        }
        let new_id = self.arena.allocate(Node::Internal { children: right });
        (new_id, right_bbox)
    }

    /// Walks the recorded path bottom-up after a split, refreshing child
    /// boxes and inserting the new sibling; splits cascade as long as
    /// parents overflow. A root split adds a level.
    fn propagate_split(
        &mut self,
        path: &[(NodeId, usize)],
        mut new_node: NodeId,
        mut new_bbox: BoundingBox<K, M>,
    ) {
        let mut level = path.len();
        while level > 0 {
            level -= 1;
            let (parent_id, child_idx) = path[level];

            let child_id = match self.arena.node(parent_id) {
                Node::Internal { children } => children[child_idx].node,
                Node::Leaf { .. } => unreachable!("path nodes are internal"),
            };
            let refreshed = self.arena.node(child_id).compute_bbox();

            let overflow = match self.arena.node_mut(parent_id) {
                Node::Internal { children } => {
                    children[child_idx].bbox = refreshed;
                    children.push(ChildRef {
                        bbox: new_bbox,
                        node: new_node,
                    });
                    children.len() > self.options.max_entries()
                }
                Node::Leaf { .. } => unreachable!("path nodes are internal"),
            };

            if !overflow {
                self.update_path_bboxes(&path[..level]);
                return;
            }

            let (split_node, split_bbox) = self.split_internal(parent_id);
            new_node = split_node;
            new_bbox = split_bbox;
        }

        let old_root = self.root.expect("split propagated without a root");
        let old_bbox = self.arena.node(old_root).compute_bbox();
        let new_root = self.arena.allocate(Node::Internal {
            children: vec![
                ChildRef {
                    bbox: old_bbox,
                    node: old_root,
                },
                ChildRef {
                    bbox: new_bbox,
                    node: new_node,
                },
            ],
        });
        self.root = Some(new_root);
        self.height += 1;
        log::debug!("root split; tree height is now {}", self.height);
    }

    /// Refreshes the stored child boxes along an insertion path, bottom-up.
    fn update_path_bboxes(&mut self, path: &[(NodeId, usize)]) {
        for &(parent_id, child_idx) in path.iter().rev() {
            let child_id = match self.arena.node(parent_id) {
                Node::Internal { children } => children[child_idx].node,
                Node::Leaf { .. } => unreachable!("path nodes are internal"),
            };
            let refreshed = self.arena.node(child_id).compute_bbox();
            match self.arena.node_mut(parent_id) {
                Node::Internal { children } => children[child_idx].bbox = refreshed,
                Node::Leaf { .. } => unreachable!("path nodes are internal"),
            }
        }
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes the entry with the given key and payload, returning the
    /// payload. Returns `None` without touching the tree when no entry
    /// matches.
    ///
    /// Payloads are compared with the configured value equality, so distinct
    /// payloads stored at the same coordinates are told apart.
    pub fn remove(&mut self, key: &Point<K, M>, value: &V) -> Option<V> {
        let root = self.root?;
        let mut orphans = Vec::new();
        let removed = self.remove_from(root, key, value, &mut orphans)?;
        self.len -= 1;
        log::trace!("removed entry at {}", key);

        self.shrink_root();

        // Entries of condensed nodes re-enter through the normal insert
        // path, which may grow the tree again.
        if !orphans.is_empty() {
            log::debug!("reinserting {} entries after condensation", orphans.len());
            self.len -= orphans.len();
            for entry in orphans {
                self.insert_entry(entry);
            }
        }

        Some(removed)
    }

    fn remove_from(
        &mut self,
        node_id: NodeId,
        key: &Point<K, M>,
        value: &V,
        orphans: &mut Vec<LeafEntry<K, V, M>>,
    ) -> Option<V> {
        if self.arena.node(node_id).is_leaf() {
            let value_eq = Arc::clone(&self.value_eq);
            let entries = match self.arena.node_mut(node_id) {
                Node::Leaf { entries } => entries,
                Node::Internal { .. } => unreachable!(),
            };
            let idx = entries
                .iter()
                .position(|e| e.key == *key && value_eq(&e.value, value))?;
            return Some(entries.remove(idx).value);
        }

        // Sibling boxes may overlap, so every child covering the key is a
        // candidate and is tried in order until the entry is found.
        let candidates: Vec<(usize, NodeId)> = match self.arena.node(node_id) {
            Node::Internal { children } => children
                .iter()
                .enumerate()
                .filter(|(_, c)| c.bbox.contains_point(key))
                .map(|(i, c)| (i, c.node))
                .collect(),
            Node::Leaf { .. } => unreachable!(),
        };

        for (child_idx, child_id) in candidates {
            let removed = match self.remove_from(child_id, key, value, orphans) {
                Some(v) => v,
                None => continue,
            };

            let (child_len, child_bbox) = {
                let child = self.arena.node(child_id);
                (child.len(), child.compute_bbox())
            };

            if child_len < self.options.min_entries() {
                // Condense: detach the underfull child and stage its
                // remaining entries for reinsertion from the root.
                log::debug!(
                    "condensing node {} ({} remaining, minimum {})",
                    child_id,
                    child_len,
                    self.options.min_entries()
                );
                match self.arena.node_mut(node_id) {
                    Node::Internal { children } => {
                        children.remove(child_idx);
                    }
                    Node::Leaf { .. } => unreachable!(),
                }
                self.collect_subtree_entries(child_id, orphans);
            } else {
                match self.arena.node_mut(node_id) {
                    Node::Internal { children } => children[child_idx].bbox = child_bbox,
                    Node::Leaf { .. } => unreachable!(),
                }
            }
            return Some(removed);
        }

        None
    }

    /// Drains every leaf entry below `node_id`, releasing the nodes.
    fn collect_subtree_entries(&mut self, node_id: NodeId, out: &mut Vec<LeafEntry<K, V, M>>) {
        match self.arena.release(node_id) {
            Node::Leaf { entries } => out.extend(entries),
            Node::Internal { children } => {
                for child in children {
                    self.collect_subtree_entries(child.node, out);
                }
            }
        }
    }

    /// Collapses degenerate roots: an empty root leaf empties the tree, and
    /// a single-child internal root is replaced by its child, shrinking the
    /// height.
    fn shrink_root(&mut self) {
        loop {
            let root = match self.root {
                Some(root) => root,
                None => return,
            };
            let sole_child = match self.arena.node(root) {
                Node::Leaf { entries } => {
                    if entries.is_empty() {
                        self.arena.release(root);
                        self.root = None;
                        self.height = 0;
                    }
                    return;
                }
                Node::Internal { children } => match children.len() {
                    0 => None,
                    1 => Some(children[0].node),
                    _ => return,
                },
            };
            self.arena.release(root);
            match sole_child {
                None => {
                    self.root = None;
                    self.height = 0;
                    return;
                }
                Some(child) => {
                    self.root = Some(child);
                    self.height -= 1;
                    log::debug!("root collapsed; tree height is now {}", self.height);
                }
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Runs a filter over the tree, returning a lazy cursor of matching
    /// entries.
    ///
    /// The cursor borrows the tree immutably and rebuilds its traversal
    /// state from the root on every call, so queries are restartable by
    /// calling `find` again. A top-level [`nearest`](crate::nearest) filter
    /// yields entries in increasing distance order; all other filters use a
    /// deterministic depth-first order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidQuery`] when a `nearest` filter is nested
    /// under `and`/`or`; nearest-k is a traversal strategy and is only
    /// supported at the root of a filter.
    pub fn find(&self, filter: SpatialFilter<K, V, M>) -> TreeResult<EntryCursor<'_, K, V, M>> {
        if let SpatialFilter::Nearest { center, count } = &filter {
            return Ok(EntryCursor::best_first(self, *center, *count));
        }
        if filter.has_nearest() {
            log::error!("rejecting query: nearest() nested in {}", filter);
            return Err(TreeError::InvalidQuery(
                "nearest() is only supported at the root of a filter".into(),
            ));
        }
        Ok(EntryCursor::depth_first(self, filter))
    }

    /// Returns a cursor over the `count` entries nearest to `center`, in
    /// increasing distance order. Fewer than `count` stored entries yield
    /// all of them; an empty tree yields nothing.
    pub fn nearest(&self, center: Point<K, M>, count: usize) -> EntryCursor<'_, K, V, M> {
        EntryCursor::best_first(self, center, count)
    }

    /// Returns an iterator over every stored entry in depth-first order.
    ///
    /// This is also the snapshot mechanism: persisting and restoring a tree
    /// is done externally by draining `iter` and re-inserting.
    pub fn iter(&self) -> EntryIter<'_, K, V, M> {
        EntryIter::new(self)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Returns counters describing the current tree shape.
    pub fn stats(&self) -> TreeStats {
        let mut node_count = 0;
        let mut leaf_count = 0;
        if let Some(root) = self.root {
            self.count_nodes(root, &mut node_count, &mut leaf_count);
        }
        TreeStats {
            total_entries: self.len,
            tree_height: self.height,
            node_count,
            leaf_count,
            min_entries: self.options.min_entries(),
            max_entries: self.options.max_entries(),
        }
    }

    fn count_nodes(&self, node_id: NodeId, nodes: &mut usize, leaves: &mut usize) {
        *nodes += 1;
        match self.arena.node(node_id) {
            Node::Leaf { .. } => *leaves += 1,
            Node::Internal { children } => {
                for child in children {
                    self.count_nodes(child.node, nodes, leaves);
                }
            }
        }
    }

    /// Verifies the structural invariants of the tree:
    /// every stored child box equals the re-derived box of its subtree,
    /// every non-root node respects the fanout bounds, all leaves sit at
    /// the same depth, and the entry count matches `len`.
    ///
    /// A failing report indicates a defect in this crate, not a recoverable
    /// runtime condition.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut report = IntegrityReport {
            is_valid: true,
            errors: Vec::new(),
            nodes_checked: 0,
            entries_found: 0,
        };

        match self.root {
            None => {
                if self.len != 0 || self.height != 0 {
                    report
                        .errors
                        .push(format!("empty tree reports len {} height {}", self.len, self.height));
                }
            }
            Some(root) => {
                self.check_node(root, 1, true, &mut report);
                if report.entries_found != self.len {
                    report.errors.push(format!(
                        "tree reports {} entries but {} were found",
                        self.len, report.entries_found
                    ));
                }
            }
        }

        report.is_valid = report.errors.is_empty();
        report
    }

    fn check_node(&self, node_id: NodeId, depth: usize, is_root: bool, report: &mut IntegrityReport) {
        report.nodes_checked += 1;
        let min = self.options.min_entries();
        let max = self.options.max_entries();

        match self.arena.node(node_id) {
            Node::Leaf { entries } => {
                report.entries_found += entries.len();
                if depth != self.height {
                    report
                        .errors
                        .push(format!("leaf {} at depth {} of {}", node_id, depth, self.height));
                }
                if entries.len() > max || (!is_root && entries.len() < min) {
                    report.errors.push(format!(
                        "leaf {} holds {} entries outside [{}, {}]",
                        node_id,
                        entries.len(),
                        min,
                        max
                    ));
                }
            }
            Node::Internal { children } => {
                let lower = if is_root { 2 } else { min };
                if children.len() > max || children.len() < lower {
                    report.errors.push(format!(
                        "internal node {} holds {} children outside [{}, {}]",
                        node_id,
                        children.len(),
                        lower,
                        max
                    ));
                }
                for child in children {
                    let derived = self.node(child.node).compute_bbox();
                    if derived != child.bbox {
                        report.errors.push(format!(
                            "node {} stores stale box {} for child {} (derived {})",
                            node_id, child.bbox, child.node, derived
                        ));
                    }
                    self.check_node(child.node, depth + 1, false, report);
                }
            }
        }
    }
}

/// Counters describing the shape of a tree.
#[derive(Debug, Clone, Default)]
pub struct TreeStats {
    pub total_entries: usize,
    pub tree_height: usize,
    pub node_count: usize,
    pub leaf_count: usize,
    pub min_entries: usize,
    pub max_entries: usize,
}

/// Result of a structural integrity check.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub nodes_checked: usize,
    pub entries_found: usize,
}

/// Guttman quadratic split: picks the pair of items wasting the most space
/// when grouped together as seeds, then assigns the rest greedily to the
/// group whose box grows less. Once a group can only reach `min_entries` by
/// taking everything left, assignment is forced.
fn quadratic_partition<K: Scalar, T, const M: usize>(
    items: Vec<T>,
    bbox_of: impl Fn(&T) -> BoundingBox<K, M>,
    min_entries: usize,
) -> (Vec<T>, Vec<T>) {
    debug_assert!(items.len() >= 2);
    let boxes: Vec<BoundingBox<K, M>> = items.iter().map(&bbox_of).collect();

    let mut seed_a = 0;
    let mut seed_b = 1;
    let mut best_waste: Option<K> = None;
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            let grown = boxes[i].union(&boxes[j]).area();
            let separate = boxes[i].area() + boxes[j].area();
            let waste = if grown > separate {
                grown - separate
            } else {
                K::zero()
            };
            let better = match &best_waste {
                None => true,
                Some(current) => waste > *current,
            };
            if better {
                best_waste = Some(waste);
                seed_a = i;
                seed_b = j;
            }
        }
    }

    let mut left: Vec<T> = Vec::new();
    let mut right: Vec<T> = Vec::new();
    let mut left_bbox = BoundingBox::empty();
    let mut right_bbox = BoundingBox::empty();
    let mut rest: Vec<(T, BoundingBox<K, M>)> = Vec::new();

    for (idx, (item, bbox)) in items.into_iter().zip(boxes).enumerate() {
        if idx == seed_a {
            left_bbox.expand(&bbox);
            left.push(item);
        } else if idx == seed_b {
            right_bbox.expand(&bbox);
            right.push(item);
        } else {
            rest.push((item, bbox));
        }
    }

    let total = rest.len();
    for (processed, (item, bbox)) in rest.into_iter().enumerate() {
        let pending = total - processed;
        if left.len() + pending <= min_entries {
            left_bbox.expand(&bbox);
            left.push(item);
            continue;
        }
        if right.len() + pending <= min_entries {
            right_bbox.expand(&bbox);
            right.push(item);
            continue;
        }

        let left_growth = left_bbox.enlargement(&bbox);
        let right_growth = right_bbox.enlargement(&bbox);
        let choose_left = match cmp_scalar(&left_growth, &right_growth) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => match cmp_scalar(&left_bbox.area(), &right_bbox.area()) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => left.len() <= right.len(),
            },
        };
        if choose_left {
            left_bbox.expand(&bbox);
            left.push(item);
        } else {
            right_bbox.expand(&bbox);
            right.push(item);
        }
    }

    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree_options() -> TreeOptions {
        TreeOptions::new(2, 4).unwrap()
    }

    #[test]
    fn test_empty_tree() {
        let tree: RTree<f64, i32, 2> = RTree::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn test_insert_single() {
        let mut tree: RTree<f64, i32, 2> = RTree::new();
        tree.insert(Point::new([1.0, 2.0]), 7);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), 1);
        assert!(tree.check_integrity().is_valid);
    }

    #[test]
    fn test_insert_splits_grow_height() {
        let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_tree_options());
        for i in 0..5 {
            tree.insert(Point::new([i as f64, i as f64]), i);
        }
        // Five entries overflow a max-4 leaf; the root must have split once.
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.len(), 5);
        let report = tree.check_integrity();
        assert!(report.is_valid, "{:?}", report.errors);
    }

    #[test]
    fn test_insert_many_integrity() {
        let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_tree_options());
        for i in 0..100 {
            let x = (i % 10) as f64;
            let y = (i / 10) as f64;
            tree.insert(Point::new([x, y]), i);
            let report = tree.check_integrity();
            assert!(report.is_valid, "after insert {}: {:?}", i, report.errors);
        }
        assert_eq!(tree.len(), 100);
        assert_eq!(tree.iter().count(), 100);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut tree: RTree<f64, i32, 2> = RTree::new();
        tree.insert(Point::new([1.0, 1.0]), 1);

        assert_eq!(tree.remove(&Point::new([2.0, 2.0]), &1), None);
        assert_eq!(tree.remove(&Point::new([1.0, 1.0]), &2), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_remove_returns_payload() {
        let mut tree: RTree<f64, String, 2> = RTree::new();
        tree.insert(Point::new([1.0, 1.0]), "payload".to_string());

        let removed = tree.remove(&Point::new([1.0, 1.0]), &"payload".to_string());
        assert_eq!(removed, Some("payload".to_string()));
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_same_coordinates_distinct_payloads() {
        let mut tree: RTree<f64, i32, 2> = RTree::new();
        let p = Point::new([3.0, 3.0]);
        tree.insert(p, 1);
        tree.insert(p, 2);

        assert_eq!(tree.remove(&p, &2), Some(2));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.remove(&p, &2), None);
        assert_eq!(tree.remove(&p, &1), Some(1));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_custom_value_eq() {
        // Payloads compare by id only; the label is ignored.
        #[derive(Debug, Clone)]
        struct Tagged {
            id: u64,
            label: &'static str,
        }

        let mut tree: RTree<f64, Tagged, 2> = RTree::with_value_eq(
            TreeOptions::default(),
            Arc::new(|a: &Tagged, b: &Tagged| a.id == b.id),
        );
        let p = Point::new([0.0, 0.0]);
        tree.insert(
            p,
            Tagged {
                id: 42,
                label: "stored",
            },
        );

        let probe = Tagged {
            id: 42,
            label: "probe",
        };
        let removed = tree.remove(&p, &probe);
        assert_eq!(removed.map(|t| t.label), Some("stored"));
    }

    #[test]
    fn test_round_trip_leaves_empty_tree() {
        let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_tree_options());
        let points: Vec<Point<f64, 2>> = (0..30)
            .map(|i| Point::new([(i * 7 % 13) as f64, (i * 5 % 11) as f64]))
            .collect();

        for (i, p) in points.iter().enumerate() {
            tree.insert(*p, i);
        }
        for (i, p) in points.iter().enumerate() {
            assert_eq!(tree.remove(p, &i), Some(i), "entry {} missing", i);
            let report = tree.check_integrity();
            assert!(report.is_valid, "after remove {}: {:?}", i, report.errors);
        }

        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_clear() {
        let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_tree_options());
        for i in 0..20 {
            tree.insert(Point::new([i as f64, 0.0]), i);
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.check_integrity().is_valid);
    }

    #[test]
    fn test_stats() {
        let mut tree: RTree<f64, usize, 2> = RTree::with_options(small_tree_options());
        for i in 0..20 {
            tree.insert(Point::new([i as f64, (i % 3) as f64]), i);
        }
        let stats = tree.stats();
        assert_eq!(stats.total_entries, 20);
        assert_eq!(stats.tree_height, tree.height());
        assert!(stats.leaf_count >= 5); // 20 entries cannot fit fewer max-4 leaves
        assert!(stats.node_count > stats.leaf_count);
        assert_eq!(stats.min_entries, 2);
        assert_eq!(stats.max_entries, 4);
    }

    #[test]
    fn test_quadratic_partition_respects_minimum() {
        let points: Vec<Point<f64, 2>> = vec![
            Point::new([0.0, 0.0]),
            Point::new([0.1, 0.1]),
            Point::new([0.2, 0.0]),
            Point::new([10.0, 10.0]),
            Point::new([10.1, 10.1]),
        ];
        let (left, right) = quadratic_partition(points, |p| BoundingBox::from_point(*p), 2);
        assert!(left.len() >= 2, "left holds {}", left.len());
        assert!(right.len() >= 2, "right holds {}", right.len());
        assert_eq!(left.len() + right.len(), 5);
    }

    #[test]
    fn test_quadratic_partition_separates_clusters() {
        let points: Vec<Point<f64, 2>> = vec![
            Point::new([0.0, 0.0]),
            Point::new([1.0, 1.0]),
            Point::new([100.0, 100.0]),
            Point::new([101.0, 101.0]),
        ];
        let (left, right) = quadratic_partition(points, |p| BoundingBox::from_point(*p), 1);

        let near = |p: &Point<f64, 2>| p[0] < 50.0;
        assert!(left.iter().all(near) || left.iter().all(|p| !near(p)));
        assert!(right.iter().all(near) || right.iter().all(|p| !near(p)));
    }
}
