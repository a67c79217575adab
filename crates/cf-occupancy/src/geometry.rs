//! Axis-aligned and oriented boxes.

use nalgebra::{Isometry3, Point3, Vector3};

use crate::error::{OccupancyError, Result};

/// An axis-aligned bounding box.
///
/// The frame is whatever the producer uses: link boxes reported by a
/// [`CollisionOracle`](crate::CollisionOracle) are in world space, cell boxes
/// from [`GridFrame::aabb_from_voxel`](crate::GridFrame::aabb_from_voxel) are in
/// grid space.
///
/// # Example
///
/// ```
/// use cf_occupancy::Aabb;
/// use nalgebra::Point3;
///
/// let aabb = Aabb::new(Point3::new(1.0, 1.0, 1.0), Point3::new(0.0, 0.0, 0.0));
/// assert_eq!(aabb.min, Point3::origin());
/// assert!(aabb.contains(&Point3::new(1.0, 0.5, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Lower corner.
    pub min: Point3<f64>,
    /// Upper corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a box spanning two corners given in any order.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates a box from explicit lower and upper corners without reordering.
    ///
    /// Use [`Aabb::validate`] to reject inverted input.
    #[must_use]
    pub const fn from_corners(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Creates a box centered at `center` with the given half extents.
    #[must_use]
    pub fn from_center(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing every point, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self::from_corners(first, first);
        for p in iter {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        Some(aabb)
    }

    /// Fails with [`OccupancyError::InvertedAabb`] if `min > max` on any axis.
    ///
    /// # Errors
    ///
    /// Returns the first offending axis.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<()> {
        for axis in 0..3 {
            // NaN bounds compare false here and are rejected too.
            if !(self.min[axis] <= self.max[axis]) {
                return Err(OccupancyError::InvertedAabb {
                    axis,
                    min: self.min[axis],
                    max: self.max[axis],
                });
            }
        }
        Ok(())
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Checks whether a point is inside; the boundary counts as inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Checks whether two boxes overlap (touching counts).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// The 8 corners, with bit 0 of the index selecting max x, bit 1 max y
    /// and bit 2 max z.
    #[must_use]
    pub fn vertices(&self) -> [Point3<f64>; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::from_corners(Point3::origin(), Point3::origin())
    }
}

/// An oriented box: an [`Aabb`] in a local frame plus the pose of that frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Oobb {
    /// Box in the local frame.
    pub aabb: Aabb,
    /// Pose mapping the local frame into world space.
    pub pose: Isometry3<f64>,
}

impl Oobb {
    /// Creates an oriented box.
    #[must_use]
    pub const fn new(aabb: Aabb, pose: Isometry3<f64>) -> Self {
        Self { aabb, pose }
    }

    /// World-space center.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.pose * self.aabb.center()
    }

    /// World-space corners, in the same order as [`Aabb::vertices`].
    #[must_use]
    pub fn vertices(&self) -> [Point3<f64>; 8] {
        self.aabb.vertices().map(|v| self.pose * v)
    }

    /// World-space axis-aligned box enclosing this oriented box.
    #[must_use]
    pub fn world_aabb(&self) -> Aabb {
        let vertices = self.vertices();
        Aabb::from_points(&vertices).unwrap_or_default()
    }
}
