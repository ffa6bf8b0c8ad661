//! # Skytree - Spatial Index with Pareto Front Extraction
//!
//! Skytree is an in-memory, multidimensional R-tree that answers geometric
//! range queries, nearest-neighbour queries and incremental Pareto front
//! ("skyline") extraction over one shared index structure.
//!
//! ## Key Features
//!
//! - **Generic Geometry**: points are `[K; M]` arrays with a const-generic
//!   dimension and any numeric scalar type
//! - **Balanced R-Tree**: quadratic-split insertion, deletion with
//!   condensation, exact bounding box maintenance
//! - **Composable Filters**: intersects, within, disjoint, arbitrary value
//!   predicates and nearest-k, combinable with AND/OR
//! - **Lazy Queries**: cursors produce matches on demand and restart from
//!   the root; immutable borrows make concurrent mutation impossible
//! - **Skyline Queries**: branch-and-bound Pareto front extraction that
//!   prunes dominated subtrees through the bounding box hierarchy
//! - **Diagnostics**: shape statistics and a structural integrity checker
//!
//! ## Quick Start
//!
//! ```rust
//! use skytree::{intersects, BoundingBox, Direction, Point, RTree};
//!
//! # fn main() -> Result<(), skytree::TreeError> {
//! let mut tree: RTree<f64, &str, 2> = RTree::new();
//! tree.insert(Point::new([1.0, 5.0]), "a");
//! tree.insert(Point::new([2.0, 3.0]), "b");
//! tree.insert(Point::new([4.0, 1.0]), "c");
//!
//! // Range query
//! let query = BoundingBox::new(Point::new([0.0, 0.0]), Point::new([3.0, 6.0]))?;
//! let hits: Vec<_> = tree.find(intersects(query))?.collect();
//! assert_eq!(hits.len(), 2);
//!
//! // Nearest neighbours
//! let (closest, _) = tree.nearest(Point::new([4.0, 2.0]), 1).next().unwrap();
//! assert_eq!(closest, &Point::new([4.0, 1.0]));
//!
//! // Pareto front under minimize/minimize
//! let front = tree.pareto_front(&Direction::minimize());
//! assert_eq!(front.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! A tree is single-threaded: mutation takes `&mut self`, queries take
//! `&self`, and the borrow checker rules out mutation while any cursor is
//! alive. For shared access, wrap the tree in an external reader-writer
//! lock; concurrent readers are safe because queries never mutate.
//!
//! ## Module Organization
//!
//! - [`point`] - coordinate points and the scalar trait
//! - [`bounding_box`] - axis-aligned boxes used for storage and queries
//! - [`rtree`] - the tree itself: insertion, removal, diagnostics
//! - [`filter`] - composable spatial filters
//! - [`query`] - lazy query cursors
//! - [`front`] - objective directions and Pareto front extraction
//! - [`errors`] - error types

pub mod bounding_box;
pub mod errors;
pub mod filter;
pub mod front;
pub mod point;
pub mod query;
pub mod rtree;

pub use bounding_box::BoundingBox;
pub use errors::{TreeError, TreeResult};
pub use filter::{
    and, disjoint, intersects, nearest, or, satisfies, within, BoxMatch, SpatialFilter,
    ValuePredicate,
};
pub use front::{Direction, FrontOptions, Objective, ParetoFront};
pub use point::{Point, Scalar};
pub use query::{EntryCursor, EntryIter};
pub use rtree::{IntegrityReport, RTree, TreeOptions, TreeStats, ValueEq};
