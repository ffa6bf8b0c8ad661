//! Axis-aligned bounding boxes in `M`-dimensional space.

use std::fmt::{self, Display};

use crate::errors::{TreeError, TreeResult};
use crate::point::{scalar_max, scalar_min, Point, Scalar};

/// An axis-aligned bounding box defined by a minimum and a maximum corner.
///
/// A box is valid when `min[i] <= max[i]` holds in every dimension;
/// [`BoundingBox::new`] enforces this at construction. A degenerate box
/// (`min == max`) represents a single point.
///
/// # Examples
///
/// ```rust
/// use skytree::{BoundingBox, Point};
///
/// # fn main() -> Result<(), skytree::TreeError> {
/// let bbox = BoundingBox::new(Point::new([0.0, 0.0]), Point::new([10.0, 10.0]))?;
/// assert!(bbox.contains_point(&Point::new([5.0, 5.0])));
/// assert_eq!(bbox.area(), 100.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox<K: Scalar, const M: usize> {
    min: Point<K, M>,
    max: Point<K, M>,
}

impl<K: Scalar, const M: usize> BoundingBox<K, M> {
    /// Creates a new bounding box from its corners.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::MalformedBox`] when `min[i] > max[i]` in any
    /// dimension. A malformed box is a contract violation and is never
    /// silently repaired.
    pub fn new(min: Point<K, M>, max: Point<K, M>) -> TreeResult<Self> {
        for i in 0..M {
            if min[i] > max[i] {
                log::error!(
                    "rejecting bounding box: min {} exceeds max {} in dimension {}",
                    min[i],
                    max[i],
                    i
                );
                return Err(TreeError::MalformedBox(format!(
                    "min {} exceeds max {} in dimension {}",
                    min[i], max[i], i
                )));
            }
        }
        Ok(BoundingBox { min, max })
    }

    /// Creates the degenerate box covering a single point.
    pub fn from_point(point: Point<K, M>) -> Self {
        BoundingBox {
            min: point,
            max: point,
        }
    }

    /// Returns the identity element for [`expand`](Self::expand): a box that
    /// contains nothing and disappears under union.
    pub fn empty() -> Self {
        BoundingBox {
            min: Point::new([K::max_value(); M]),
            max: Point::new([K::min_value(); M]),
        }
    }

    /// Checks whether this box contains nothing.
    pub fn is_empty(&self) -> bool {
        (0..M).any(|i| self.min[i] > self.max[i])
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> &Point<K, M> {
        &self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> &Point<K, M> {
        &self.max
    }

    /// Checks whether this box is degenerate (covers a single point).
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Returns the extent along the given dimension.
    pub fn extent(&self, dim: usize) -> K {
        self.max[dim] - self.min[dim]
    }

    /// Returns the volume of the box (product of all extents).
    pub fn area(&self) -> K {
        if self.is_empty() {
            return K::zero();
        }
        let mut acc = K::one();
        for i in 0..M {
            acc = acc * self.extent(i);
        }
        acc
    }

    /// Returns the smallest box covering both boxes.
    pub fn union(&self, other: &Self) -> Self {
        let mut min = *self.min.coords();
        let mut max = *self.max.coords();
        for i in 0..M {
            min[i] = scalar_min(min[i], other.min[i]);
            max[i] = scalar_max(max[i], other.max[i]);
        }
        BoundingBox {
            min: Point::new(min),
            max: Point::new(max),
        }
    }

    /// Grows this box in place to cover `other`.
    pub fn expand(&mut self, other: &Self) {
        *self = self.union(other);
    }

    /// Grows this box in place to cover `point`.
    pub fn expand_point(&mut self, point: &Point<K, M>) {
        self.expand(&BoundingBox::from_point(*point));
    }

    /// Checks whether the two boxes share any region; touching counts.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..M).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    /// Checks whether `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Self) -> bool {
        (0..M).all(|i| other.min[i] >= self.min[i] && other.max[i] <= self.max[i])
    }

    /// Checks whether the point lies inside this box; borders count.
    pub fn contains_point(&self, point: &Point<K, M>) -> bool {
        (0..M).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Returns how much this box's volume would grow to also cover `other`.
    ///
    /// Saturates at zero so the result stays valid for unsigned scalars.
    pub fn enlargement(&self, other: &Self) -> K {
        let grown = self.union(other).area();
        let own = self.area();
        if grown > own {
            grown - own
        } else {
            K::zero()
        }
    }

    /// Returns the squared distance from `point` to the nearest point of
    /// this box; zero when the point lies inside.
    ///
    /// This is the lower bound used to prune subtrees during best-first
    /// nearest-neighbour traversal.
    pub fn min_distance_sq(&self, point: &Point<K, M>) -> K {
        let mut acc = K::zero();
        for i in 0..M {
            let d = if point[i] < self.min[i] {
                self.min[i] - point[i]
            } else if point[i] > self.max[i] {
                point[i] - self.max[i]
            } else {
                K::zero()
            };
            acc = acc + d * d;
        }
        acc
    }
}

impl<K: Scalar, const M: usize> Display for BoundingBox<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundingBox({}, {})", self.min, self.max)
    }
}
