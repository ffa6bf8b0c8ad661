//! Spatial filters for querying the index.
//!
//! This module provides the filter types understood by
//! [`RTree::find`](crate::RTree::find):
//! - [`intersects`] - entries whose location lies inside a query box
//! - [`within`] - entries contained within a query box
//! - [`disjoint`] - entries outside a query box
//! - [`satisfies`] - entries accepted by an arbitrary caller predicate
//! - [`nearest`] - the `k` entries closest to a query point
//!
//! Filters compose with [`and`]/[`or`] (or the equivalent
//! [`SpatialFilter::and`]/[`SpatialFilter::or`] methods).
//!
//! ## Two-phase evaluation
//!
//! Every filter is evaluated in two phases during traversal:
//! 1. **Box phase**: [`SpatialFilter::matches_bbox`] classifies a subtree's
//!    bounding box as certainly-in, certainly-out or undecided, which lets
//!    the traversal skip whole subtrees.
//! 2. **Point phase**: [`SpatialFilter::matches_entry`] gives the final
//!    verdict for each stored entry. Pruning can only ever reduce traversal
//!    cost; it never changes the result set.

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::point::{Point, Scalar};

/// Caller-supplied predicate over a stored entry, consumed by [`satisfies`].
pub type ValuePredicate<K, V, const M: usize> =
    Arc<dyn Fn(&Point<K, M>, &V) -> bool + Send + Sync>;

/// Verdict of evaluating a filter against a subtree bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxMatch {
    /// Every entry below this box matches; the point phase cannot fail.
    Inside,
    /// Entries below this box may or may not match; descend and test points.
    Maybe,
    /// No entry below this box can match; the subtree is skipped.
    Outside,
}

/// A spatial filter over indexed entries.
///
/// Filters form a tree: the leaf variants test geometry or values, and the
/// `And`/`Or` variants combine sub-filters with short-circuit logic.
/// `Nearest` is special: it is a traversal strategy rather than a pruning
/// predicate and is only accepted at the root of a filter tree.
pub enum SpatialFilter<K: Scalar, V, const M: usize> {
    /// Matches entries whose location intersects the query box.
    Intersects(BoundingBox<K, M>),
    /// Matches entries contained within the query box.
    Within(BoundingBox<K, M>),
    /// Matches entries sharing no region with the query box.
    Disjoint(BoundingBox<K, M>),
    /// Matches entries accepted by a caller-supplied predicate.
    /// Provides no box-phase pruning; the traversal visits every subtree.
    Satisfies(ValuePredicate<K, V, M>),
    /// Yields the `count` entries nearest to `center`, in increasing
    /// distance order.
    Nearest {
        center: Point<K, M>,
        count: usize,
    },
    /// Matches entries accepted by all sub-filters.
    And(Vec<SpatialFilter<K, V, M>>),
    /// Matches entries accepted by at least one sub-filter.
    Or(Vec<SpatialFilter<K, V, M>>),
}

/// Creates a filter matching entries whose location lies inside `bbox`.
pub fn intersects<K: Scalar, V, const M: usize>(bbox: BoundingBox<K, M>) -> SpatialFilter<K, V, M> {
    SpatialFilter::Intersects(bbox)
}

/// Creates a filter matching entries contained within `bbox`.
pub fn within<K: Scalar, V, const M: usize>(bbox: BoundingBox<K, M>) -> SpatialFilter<K, V, M> {
    SpatialFilter::Within(bbox)
}

/// Creates a filter matching entries sharing no region with `bbox`.
pub fn disjoint<K: Scalar, V, const M: usize>(bbox: BoundingBox<K, M>) -> SpatialFilter<K, V, M> {
    SpatialFilter::Disjoint(bbox)
}

/// Creates a filter matching entries accepted by `predicate`.
///
/// The predicate sees the entry's location and payload. It cannot prune
/// subtrees, so a query using only `satisfies` visits every entry.
pub fn satisfies<K, V, F, const M: usize>(predicate: F) -> SpatialFilter<K, V, M>
where
    K: Scalar,
    F: Fn(&Point<K, M>, &V) -> bool + Send + Sync + 'static,
{
    SpatialFilter::Satisfies(Arc::new(predicate))
}

/// Creates a filter yielding the `count` entries nearest to `center`.
pub fn nearest<K: Scalar, V, const M: usize>(
    center: Point<K, M>,
    count: usize,
) -> SpatialFilter<K, V, M> {
    SpatialFilter::Nearest { center, count }
}

/// Combines multiple filters; entries must match all of them.
pub fn and<K: Scalar, V, const M: usize>(
    filters: Vec<SpatialFilter<K, V, M>>,
) -> SpatialFilter<K, V, M> {
    SpatialFilter::And(filters)
}

/// Combines multiple filters; entries must match at least one.
pub fn or<K: Scalar, V, const M: usize>(
    filters: Vec<SpatialFilter<K, V, M>>,
) -> SpatialFilter<K, V, M> {
    SpatialFilter::Or(filters)
}

impl<K: Scalar, V, const M: usize> SpatialFilter<K, V, M> {
    /// Combines this filter with another using logical AND.
    pub fn and(self, other: SpatialFilter<K, V, M>) -> SpatialFilter<K, V, M> {
        SpatialFilter::And(vec![self, other])
    }

    /// Combines this filter with another using logical OR.
    pub fn or(self, other: SpatialFilter<K, V, M>) -> SpatialFilter<K, V, M> {
        SpatialFilter::Or(vec![self, other])
    }

    /// Classifies a subtree bounding box against this filter.
    ///
    /// `And` short-circuits to [`BoxMatch::Outside`] on the first
    /// certainly-out child; `Or` short-circuits to [`BoxMatch::Inside`] on
    /// the first certainly-in child.
    pub fn matches_bbox(&self, bbox: &BoundingBox<K, M>) -> BoxMatch {
        match self {
            SpatialFilter::Intersects(query) | SpatialFilter::Within(query) => {
                if !query.intersects(bbox) {
                    BoxMatch::Outside
                } else if query.contains_box(bbox) {
                    BoxMatch::Inside
                } else {
                    BoxMatch::Maybe
                }
            }
            SpatialFilter::Disjoint(query) => {
                if !query.intersects(bbox) {
                    BoxMatch::Inside
                } else if query.contains_box(bbox) {
                    BoxMatch::Outside
                } else {
                    BoxMatch::Maybe
                }
            }
            SpatialFilter::Satisfies(_) | SpatialFilter::Nearest { .. } => BoxMatch::Maybe,
            SpatialFilter::And(filters) => {
                let mut all_inside = true;
                for filter in filters {
                    match filter.matches_bbox(bbox) {
                        BoxMatch::Outside => return BoxMatch::Outside,
                        BoxMatch::Maybe => all_inside = false,
                        BoxMatch::Inside => {}
                    }
                }
                if all_inside {
                    BoxMatch::Inside
                } else {
                    BoxMatch::Maybe
                }
            }
            SpatialFilter::Or(filters) => {
                let mut all_outside = true;
                for filter in filters {
                    match filter.matches_bbox(bbox) {
                        BoxMatch::Inside => return BoxMatch::Inside,
                        BoxMatch::Maybe => all_outside = false,
                        BoxMatch::Outside => {}
                    }
                }
                if all_outside {
                    BoxMatch::Outside
                } else {
                    BoxMatch::Maybe
                }
            }
        }
    }

    /// Gives the final verdict for a stored entry.
    pub fn matches_entry(&self, key: &Point<K, M>, value: &V) -> bool {
        match self {
            SpatialFilter::Intersects(query) | SpatialFilter::Within(query) => {
                query.contains_point(key)
            }
            SpatialFilter::Disjoint(query) => !query.contains_point(key),
            SpatialFilter::Satisfies(predicate) => predicate(key, value),
            SpatialFilter::Nearest { .. } => true,
            SpatialFilter::And(filters) => filters.iter().all(|f| f.matches_entry(key, value)),
            SpatialFilter::Or(filters) => filters.iter().any(|f| f.matches_entry(key, value)),
        }
    }

    /// Checks whether a `Nearest` filter appears anywhere in this tree.
    pub(crate) fn has_nearest(&self) -> bool {
        match self {
            SpatialFilter::Nearest { .. } => true,
            SpatialFilter::And(filters) | SpatialFilter::Or(filters) => {
                filters.iter().any(|f| f.has_nearest())
            }
            _ => false,
        }
    }
}

impl<K: Scalar, V, const M: usize> Clone for SpatialFilter<K, V, M> {
    fn clone(&self) -> Self {
        match self {
            SpatialFilter::Intersects(b) => SpatialFilter::Intersects(*b),
            SpatialFilter::Within(b) => SpatialFilter::Within(*b),
            SpatialFilter::Disjoint(b) => SpatialFilter::Disjoint(*b),
            SpatialFilter::Satisfies(p) => SpatialFilter::Satisfies(Arc::clone(p)),
            SpatialFilter::Nearest { center, count } => SpatialFilter::Nearest {
                center: *center,
                count: *count,
            },
            SpatialFilter::And(f) => SpatialFilter::And(f.clone()),
            SpatialFilter::Or(f) => SpatialFilter::Or(f.clone()),
        }
    }
}

impl<K: Scalar, V, const M: usize> Debug for SpatialFilter<K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl<K: Scalar, V, const M: usize> Display for SpatialFilter<K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialFilter::Intersects(b) => write!(f, "intersects({})", b),
            SpatialFilter::Within(b) => write!(f, "within({})", b),
            SpatialFilter::Disjoint(b) => write!(f, "disjoint({})", b),
            SpatialFilter::Satisfies(_) => write!(f, "satisfies(<predicate>)"),
            SpatialFilter::Nearest { center, count } => {
                write!(f, "nearest({}, {})", center, count)
            }
            SpatialFilter::And(filters) => {
                write!(f, "(")?;
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        write!(f, " && ")?;
                    }
                    write!(f, "{}", filter)?;
                }
                write!(f, ")")
            }
            SpatialFilter::Or(filters) => {
                write!(f, "(")?;
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    write!(f, "{}", filter)?;
                }
                write!(f, ")")
            }
        }
    }
}
