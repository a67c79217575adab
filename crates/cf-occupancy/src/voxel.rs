//! Voxel index type.

use nalgebra::Vector3;

/// A discrete 3D cell index `(i, j, k)` in grid space.
///
/// Indices are signed so the grid extends in every direction from its frame
/// origin. Ordering is lexicographic over `(x, y, z)`, which is the "sorted
/// key order" used by [`VoxelGrid::occupied`](crate::VoxelGrid::occupied).
///
/// # Example
///
/// ```
/// use cf_occupancy::VoxelCoord;
///
/// let coord = VoxelCoord::new(1, -2, 3);
/// assert_eq!(coord.as_array(), [1, -2, 3]);
/// assert!(VoxelCoord::new(0, 9, 9) < VoxelCoord::new(1, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// Index along the grid x axis.
    pub x: i32,
    /// Index along the grid y axis.
    pub y: i32,
    /// Index along the grid z (vertical) axis.
    pub z: i32,
}

impl VoxelCoord {
    /// Creates a new voxel index.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The index `(0, 0, 0)`.
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the index as an array, axis 0 first.
    #[must_use]
    pub const fn as_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns the `(x, y)` column this voxel belongs to.
    #[must_use]
    pub const fn column(self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Converts to a floating-point vector of indices.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Returns a copy with `delta` added to the index along `axis`.
    ///
    /// Axes other than 0 and 1 address z.
    #[must_use]
    pub const fn offset(self, axis: usize, delta: i32) -> Self {
        match axis {
            0 => Self::new(self.x.wrapping_add(delta), self.y, self.z),
            1 => Self::new(self.x, self.y.wrapping_add(delta), self.z),
            _ => Self::new(self.x, self.y, self.z.wrapping_add(delta)),
        }
    }

    /// Returns the 6 face-adjacent neighbors.
    ///
    /// The order is fixed: axis 0, then 1, then 2, with the `-1` neighbor
    /// before the `+1` neighbor on each axis. Clustering output order depends
    /// on it.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::VoxelCoord;
    ///
    /// let n = VoxelCoord::origin().face_neighbors();
    /// assert_eq!(n[0], VoxelCoord::new(-1, 0, 0));
    /// assert_eq!(n[1], VoxelCoord::new(1, 0, 0));
    /// assert_eq!(n[5], VoxelCoord::new(0, 0, 1));
    /// ```
    #[must_use]
    pub const fn face_neighbors(self) -> [Self; 6] {
        [
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(1, -1),
            self.offset(1, 1),
            self.offset(2, -1),
            self.offset(2, 1),
        ]
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn inf(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn sup(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Computes the Manhattan distance to another index.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        dx.saturating_add(dy).saturating_add(dz)
    }
}

impl From<(i32, i32, i32)> for VoxelCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i32; 3]> for VoxelCoord {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<VoxelCoord> for [i32; 3] {
    fn from(coord: VoxelCoord) -> Self {
        coord.as_array()
    }
}
