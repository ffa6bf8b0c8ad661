//! Node types and the arena they live in.

use crate::bounding_box::BoundingBox;
use crate::point::{Point, Scalar};

/// Stable handle of a node inside the arena.
pub(crate) type NodeId = usize;

/// An entry stored in a leaf node.
#[derive(Debug, Clone)]
pub(crate) struct LeafEntry<K: Scalar, V, const M: usize> {
    pub key: Point<K, M>,
    pub value: V,
}

/// A child reference held by an internal node. The stored box is always the
/// exact bounding box of the child's subtree.
#[derive(Debug, Clone)]
pub(crate) struct ChildRef<K: Scalar, const M: usize> {
    pub bbox: BoundingBox<K, M>,
    pub node: NodeId,
}

/// A tree node.
#[derive(Debug)]
pub(crate) enum Node<K: Scalar, V, const M: usize> {
    /// Leaf node holding actual entries.
    Leaf { entries: Vec<LeafEntry<K, V, M>> },
    /// Internal node holding child references.
    Internal { children: Vec<ChildRef<K, M>> },
}

impl<K: Scalar, V, const M: usize> Node<K, V, M> {
    /// Recomputes the bounding box enclosing all entries/children.
    pub fn compute_bbox(&self) -> BoundingBox<K, M> {
        match self {
            Node::Leaf { entries } => {
                let mut bbox = BoundingBox::empty();
                for entry in entries {
                    bbox.expand_point(&entry.key);
                }
                bbox
            }
            Node::Internal { children } => {
                let mut bbox = BoundingBox::empty();
                for child in children {
                    bbox.expand(&child.bbox);
                }
                bbox
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Leaf { entries } => entries.len(),
            Node::Internal { children } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arena owning every node of a tree, addressed by stable [`NodeId`]s.
///
/// Released slots are recycled through a free list, so ids stay small and
/// long-lived trees do not leak slots across insert/remove churn.
#[derive(Debug)]
pub(crate) struct NodeArena<K: Scalar, V, const M: usize> {
    slots: Vec<Option<Node<K, V, M>>>,
    free: Vec<NodeId>,
}

impl<K: Scalar, V, const M: usize> NodeArena<K, V, M> {
    pub fn new() -> Self {
        NodeArena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a node and returns its handle, reusing a free slot if any.
    pub fn allocate(&mut self, node: Node<K, V, M>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        }
    }

    /// Removes a node from the arena, returning ownership to the caller.
    pub fn release(&mut self, id: NodeId) -> Node<K, V, M> {
        let node = self.slots[id].take().expect("released node id is dangling");
        self.free.push(id);
        node
    }

    pub fn node(&self, id: NodeId) -> &Node<K, V, M> {
        self.slots[id].as_ref().expect("node id is dangling")
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V, M> {
        self.slots[id].as_mut().expect("node id is dangling")
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
