//! Conversion between world space and grid indices.
//!
//! A [`GridFrame`] is the rigid pose of the grid (`world_from_grid`) plus a
//! per-axis cell size. Grid space is the frame the pose maps from; voxel
//! `(i, j, k)` occupies `[i, i + 1) × [j, j + 1) × [k, k + 1)` scaled by the
//! resolution in that frame.

use nalgebra::{Isometry3, Point3, Translation3, Vector3};

use crate::bounds::GridBounds;
use crate::error::{OccupancyError, Result};
use crate::geometry::{Aabb, Oobb};
use crate::voxel::VoxelCoord;

/// Pose and resolution of a voxel grid.
///
/// # Example
///
/// ```
/// use cf_occupancy::{GridFrame, VoxelCoord};
/// use nalgebra::{Isometry3, Point3, Vector3};
///
/// let frame = GridFrame::new(Vector3::new(0.1, 0.1, 0.2), Isometry3::identity()).unwrap();
/// assert_eq!(frame.voxel_from_point(&Point3::new(0.15, -0.05, 0.45)), VoxelCoord::new(1, -1, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridFrame {
    resolution: Vector3<f64>,
    world_from_grid: Isometry3<f64>,
}

impl GridFrame {
    /// Creates a frame from per-axis cell sizes and the grid pose.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidResolution`] if any cell size is not
    /// positive and finite.
    pub fn new(resolution: Vector3<f64>, world_from_grid: Isometry3<f64>) -> Result<Self> {
        for (axis, &value) in resolution.iter().enumerate() {
            if value <= 0.0 || !value.is_finite() {
                return Err(OccupancyError::InvalidResolution { axis, value });
            }
        }
        Ok(Self {
            resolution,
            world_from_grid,
        })
    }

    /// Creates an axis-aligned frame at the world origin with cubic cells.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidResolution`] if `cell_size` is not
    /// positive and finite.
    pub fn cubic(cell_size: f64) -> Result<Self> {
        Self::new(Vector3::repeat(cell_size), Isometry3::identity())
    }

    /// Per-axis cell size.
    #[must_use]
    pub const fn resolution(&self) -> &Vector3<f64> {
        &self.resolution
    }

    /// Pose of the grid in world space.
    #[must_use]
    pub const fn world_from_grid(&self) -> &Isometry3<f64> {
        &self.world_from_grid
    }

    /// Maps a world-space point into grid space.
    #[must_use]
    pub fn to_grid(&self, point_world: &Point3<f64>) -> Point3<f64> {
        self.world_from_grid.inverse_transform_point(point_world)
    }

    /// Maps a grid-space point into world space.
    #[must_use]
    pub fn to_world(&self, point_grid: &Point3<f64>) -> Point3<f64> {
        self.world_from_grid.transform_point(point_grid)
    }

    /// Index of the voxel containing a world-space point.
    #[must_use]
    pub fn voxel_from_point(&self, point_world: &Point3<f64>) -> VoxelCoord {
        self.voxel_from_grid_point(&self.to_grid(point_world))
    }

    /// Index of the voxel containing a grid-space point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn voxel_from_grid_point(&self, point_grid: &Point3<f64>) -> VoxelCoord {
        let scaled = point_grid.coords.component_div(&self.resolution);
        VoxelCoord::new(
            scaled.x.floor() as i32,
            scaled.y.floor() as i32,
            scaled.z.floor() as i32,
        )
    }

    /// Grid-space lower corner of a voxel.
    #[must_use]
    pub fn lower_from_voxel(&self, voxel: VoxelCoord) -> Point3<f64> {
        Point3::from(voxel.to_vector().component_mul(&self.resolution))
    }

    /// Grid-space center of a voxel.
    #[must_use]
    pub fn center_from_voxel(&self, voxel: VoxelCoord) -> Point3<f64> {
        Point3::from(
            voxel
                .to_vector()
                .add_scalar(0.5)
                .component_mul(&self.resolution),
        )
    }

    /// Grid-space upper corner of a voxel.
    #[must_use]
    pub fn upper_from_voxel(&self, voxel: VoxelCoord) -> Point3<f64> {
        Point3::from(
            voxel
                .to_vector()
                .add_scalar(1.0)
                .component_mul(&self.resolution),
        )
    }

    /// Grid-space box of a voxel.
    #[must_use]
    pub fn aabb_from_voxel(&self, voxel: VoxelCoord) -> Aabb {
        Aabb::from_corners(self.lower_from_voxel(voxel), self.upper_from_voxel(voxel))
    }

    /// World-space center of a voxel.
    #[must_use]
    pub fn world_center_from_voxel(&self, voxel: VoxelCoord) -> Point3<f64> {
        self.to_world(&self.center_from_voxel(voxel))
    }

    /// World pose of a frame sitting at the voxel center with the grid's
    /// orientation.
    #[must_use]
    pub fn pose_from_voxel(&self, voxel: VoxelCoord) -> Isometry3<f64> {
        self.world_from_grid * Translation3::from(self.center_from_voxel(voxel).coords)
    }

    /// World-space corners of a voxel.
    #[must_use]
    pub fn vertices_from_voxel(&self, voxel: VoxelCoord) -> [Point3<f64>; 8] {
        self.oobb_from_voxel(voxel).vertices()
    }

    /// A voxel as an oriented box: its grid-space box plus the grid pose.
    #[must_use]
    pub fn oobb_from_voxel(&self, voxel: VoxelCoord) -> Oobb {
        Oobb::new(self.aabb_from_voxel(voxel), self.world_from_grid)
    }

    /// One-cell box centered on the voxel's pose, the shape used for
    /// collision probes.
    #[must_use]
    pub fn probe_from_voxel(&self, voxel: VoxelCoord) -> Oobb {
        Oobb::new(
            Aabb::from_center(Point3::origin(), self.resolution * 0.5),
            self.pose_from_voxel(voxel),
        )
    }

    /// Candidate voxels overlapping a world-space box.
    ///
    /// Each of the 8 corners is voxelized with [`GridFrame::voxel_from_point`]
    /// and the inclusive index range spanning them is returned. The corners
    /// are taken as given, without re-deriving the box in the grid's local
    /// orientation, so for rotated grids the result is an approximation of
    /// the true overlap.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvertedAabb`] if `min > max` on any axis.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{Aabb, GridFrame};
    /// use nalgebra::Point3;
    ///
    /// let frame = GridFrame::cubic(1.0).unwrap();
    /// let aabb = Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(1.5, 0.9, 0.9));
    /// let bounds = frame.voxels_from_aabb(&aabb).unwrap();
    /// assert_eq!(bounds.volume(), 2);
    /// ```
    pub fn voxels_from_aabb(&self, aabb: &Aabb) -> Result<GridBounds> {
        aabb.validate()?;
        let [first, rest @ ..] = aabb.vertices().map(|p| self.voxel_from_point(&p));
        Ok(GridBounds {
            min: rest.iter().fold(first, |lo, &corner| lo.inf(corner)),
            max: rest.iter().fold(first, |hi, &corner| hi.sup(corner)),
        })
    }
}

impl Default for GridFrame {
    /// Unit cubic cells, axis-aligned at the world origin.
    fn default() -> Self {
        Self {
            resolution: Vector3::repeat(1.0),
            world_from_grid: Isometry3::identity(),
        }
    }
}
