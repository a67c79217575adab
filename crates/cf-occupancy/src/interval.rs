//! Run-length compression of occupied columns.
//!
//! Each vertical column `(i, j)` of occupied voxels is split into maximal runs
//! of consecutive `k`. Runs are the cheap way to hand a grid to a renderer or a
//! collision world: one box per run instead of one per voxel.

use nalgebra::Point3;

use crate::frame::GridFrame;
use crate::geometry::{Aabb, Oobb};
use crate::grid::VoxelGrid;
use crate::voxel::VoxelCoord;

/// A maximal run of occupied voxels `(i, j, start..=end)` in one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnInterval {
    /// Column x index.
    pub i: i32,
    /// Column y index.
    pub j: i32,
    /// Lowest occupied k of the run.
    pub start: i32,
    /// Highest occupied k of the run (inclusive).
    pub end: i32,
}

impl ColumnInterval {
    /// Number of voxels in the run.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end.abs_diff(self.start) + 1
    }

    /// Always `false`: a run holds at least one voxel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether the voxel lies in this run.
    #[must_use]
    pub const fn contains(&self, voxel: VoxelCoord) -> bool {
        voxel.x == self.i && voxel.y == self.j && voxel.z >= self.start && voxel.z <= self.end
    }

    /// Bottom voxel of the run.
    #[must_use]
    pub const fn bottom(&self) -> VoxelCoord {
        VoxelCoord::new(self.i, self.j, self.start)
    }

    /// Top voxel of the run.
    #[must_use]
    pub const fn top(&self) -> VoxelCoord {
        VoxelCoord::new(self.i, self.j, self.end)
    }

    fn extends_to(&self, voxel: VoxelCoord) -> bool {
        voxel.x == self.i && voxel.y == self.j && self.end.checked_add(1) == Some(voxel.z)
    }

    /// Grid-space box spanning the run.
    #[must_use]
    pub fn grid_aabb(&self, frame: &GridFrame) -> Aabb {
        Aabb::from_corners(
            frame.lower_from_voxel(self.bottom()),
            frame.upper_from_voxel(self.top()),
        )
    }
}

impl<T> VoxelGrid<T> {
    /// Compresses every occupied column into maximal runs of consecutive `k`.
    ///
    /// Runs are ordered by `(i, j)` and then ascending within a column; every
    /// occupied voxel lies in exactly one run.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{ColumnInterval, VoxelCoord, VoxelGrid};
    ///
    /// let grid: VoxelGrid<()> = [2, 3, 4, 7]
    ///     .into_iter()
    ///     .map(|k| VoxelCoord::new(0, 0, k))
    ///     .collect();
    ///
    /// assert_eq!(
    ///     grid.create_intervals(),
    ///     vec![
    ///         ColumnInterval { i: 0, j: 0, start: 2, end: 4 },
    ///         ColumnInterval { i: 0, j: 0, start: 7, end: 7 },
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn create_intervals(&self) -> Vec<ColumnInterval> {
        let mut intervals: Vec<ColumnInterval> = Vec::new();

        // Sorted order groups columns and ascends k within each.
        for voxel in self.occupied() {
            match intervals.last_mut() {
                Some(run) if run.extends_to(voxel) => run.end = voxel.z,
                _ => intervals.push(ColumnInterval {
                    i: voxel.x,
                    j: voxel.y,
                    start: voxel.z,
                    end: voxel.z,
                }),
            }
        }

        intervals
    }

    /// One oriented box per run, posed by the grid's `world_from_grid`.
    #[must_use]
    pub fn interval_oobbs(&self) -> Vec<Oobb> {
        let frame = self.frame();
        self.create_intervals()
            .iter()
            .map(|run| Oobb::new(run.grid_aabb(frame), *frame.world_from_grid()))
            .collect()
    }

    /// World-space vertical segment through the center of each run, from its
    /// bottom face to its top face.
    #[must_use]
    pub fn interval_segments(&self) -> Vec<(Point3<f64>, Point3<f64>)> {
        let frame = self.frame();
        self.create_intervals()
            .iter()
            .map(|run| {
                let bottom = frame.center_from_voxel(run.bottom());
                let lower_z = frame.lower_from_voxel(run.bottom()).z;
                let upper_z = frame.upper_from_voxel(run.top()).z;
                (
                    frame.to_world(&Point3::new(bottom.x, bottom.y, lower_z)),
                    frame.to_world(&Point3::new(bottom.x, bottom.y, upper_z)),
                )
            })
            .collect()
    }
}
