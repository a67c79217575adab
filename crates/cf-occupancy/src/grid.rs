//! Sparse occupancy set.

use hashbrown::HashMap;
use nalgebra::Point3;

use crate::bounds::GridBounds;
use crate::error::{OccupancyError, Result};
use crate::frame::GridFrame;
use crate::geometry::Aabb;
use crate::voxel::VoxelCoord;

/// World-space centers of occupied voxels, kept in lockstep with the value
/// map.
///
/// `points[n]` is the center of `voxels[n]`, and `slots` maps each voxel back
/// to `n` so a removal is a swap-remove instead of a scan.
#[derive(Debug, Clone, Default)]
struct OccupiedCenters {
    points: Vec<Point3<f64>>,
    voxels: Vec<VoxelCoord>,
    slots: HashMap<VoxelCoord, usize>,
}

impl OccupiedCenters {
    fn push(&mut self, voxel: VoxelCoord, point: Point3<f64>) {
        self.slots.insert(voxel, self.voxels.len());
        self.points.push(point);
        self.voxels.push(voxel);
    }

    fn remove(&mut self, voxel: VoxelCoord) {
        let Some(slot) = self.slots.remove(&voxel) else {
            return;
        };
        self.points.swap_remove(slot);
        self.voxels.swap_remove(slot);
        if let Some(moved) = self.voxels.get(slot) {
            self.slots.insert(*moved, slot);
        }
    }

    fn clear(&mut self) {
        self.points.clear();
        self.voxels.clear();
        self.slots.clear();
    }

    fn within<'a>(
        &'a self,
        aabb: &'a Aabb,
    ) -> impl Iterator<Item = (&'a Point3<f64>, &'a VoxelCoord)> + 'a {
        self.points
            .iter()
            .zip(&self.voxels)
            .filter(move |(point, _)| aabb.contains(point))
    }
}

/// A sparse voxel grid storing a value per occupied voxel.
///
/// Only occupied voxels are stored. Alongside the value map the grid keeps the
/// world-space center of every occupied voxel so range queries by world box
/// ([`VoxelGrid::occupied_voxels_from_aabb`]) need no coordinate conversion.
///
/// The value stored by [`VoxelGrid::set_occupied`] is `T::default()`; use
/// `()` or `bool` for plain occupancy.
///
/// # Example
///
/// ```
/// use cf_occupancy::{VoxelCoord, VoxelGrid};
///
/// let mut grid: VoxelGrid<u8> = VoxelGrid::with_cell_size(0.1).unwrap();
/// let v = VoxelCoord::new(1, 2, 3);
///
/// assert!(grid.set_occupied(v));
/// assert!(!grid.set_occupied(v));
/// assert_eq!(grid.get_value(v).unwrap(), &0);
///
/// assert!(grid.set_free(v));
/// assert!(!grid.set_free(v));
/// assert!(grid.get_value(v).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct VoxelGrid<T> {
    frame: GridFrame,
    values: HashMap<VoxelCoord, T>,
    centers: OccupiedCenters,
}

impl<T> VoxelGrid<T> {
    /// Creates an empty grid over `frame`.
    #[must_use]
    pub fn new(frame: GridFrame) -> Self {
        Self {
            frame,
            values: HashMap::new(),
            centers: OccupiedCenters::default(),
        }
    }

    /// Creates an empty axis-aligned grid with cubic cells at the world origin.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidResolution`] if `cell_size` is not
    /// positive and finite.
    pub fn with_cell_size(cell_size: f64) -> Result<Self> {
        Ok(Self::new(GridFrame::cubic(cell_size)?))
    }

    /// Pose and resolution of the grid.
    #[must_use]
    pub const fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// Index of the voxel containing a world-space point.
    #[must_use]
    pub fn voxel_from_point(&self, point_world: &Point3<f64>) -> VoxelCoord {
        self.frame.voxel_from_point(point_world)
    }

    /// Number of occupied voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no voxel is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks whether a voxel is occupied.
    #[must_use]
    pub fn contains(&self, voxel: VoxelCoord) -> bool {
        self.values.contains_key(&voxel)
    }

    /// Alias of [`VoxelGrid::contains`].
    #[must_use]
    pub fn is_occupied(&self, voxel: VoxelCoord) -> bool {
        self.contains(voxel)
    }

    /// Value of a voxel, or `None` if unoccupied.
    #[must_use]
    pub fn get(&self, voxel: VoxelCoord) -> Option<&T> {
        self.values.get(&voxel)
    }

    /// Value of an occupied voxel.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::NotFound`] if the voxel is not occupied.
    pub fn get_value(&self, voxel: VoxelCoord) -> Result<&T> {
        self.values
            .get(&voxel)
            .ok_or(OccupancyError::NotFound { coord: voxel })
    }

    /// Mutable value of an occupied voxel.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::NotFound`] if the voxel is not occupied.
    pub fn get_value_mut(&mut self, voxel: VoxelCoord) -> Result<&mut T> {
        self.values
            .get_mut(&voxel)
            .ok_or(OccupancyError::NotFound { coord: voxel })
    }

    /// Stores a value, occupying the voxel if needed. Returns the previous
    /// value.
    pub fn set_value(&mut self, voxel: VoxelCoord, value: T) -> Option<T> {
        let previous = self.values.insert(voxel, value);
        if previous.is_none() {
            self.centers
                .push(voxel, self.frame.world_center_from_voxel(voxel));
        }
        previous
    }

    /// Frees a voxel and returns its value, or `None` if it was unoccupied.
    pub fn remove_value(&mut self, voxel: VoxelCoord) -> Option<T> {
        let removed = self.values.remove(&voxel)?;
        self.centers.remove(voxel);
        Some(removed)
    }

    /// Frees a voxel. Returns `false` if it was already free.
    pub fn set_free(&mut self, voxel: VoxelCoord) -> bool {
        self.remove_value(voxel).is_some()
    }

    /// Frees every voxel.
    pub fn clear(&mut self) {
        self.values.clear();
        self.centers.clear();
    }

    /// The 6 face-adjacent neighbors of a voxel, in the order given by
    /// [`VoxelCoord::face_neighbors`]. Occupancy is not consulted.
    #[must_use]
    pub const fn neighbors(&self, voxel: VoxelCoord) -> [VoxelCoord; 6] {
        voxel.face_neighbors()
    }

    /// Occupied voxels in sorted order.
    #[must_use]
    pub fn occupied(&self) -> Vec<VoxelCoord> {
        let mut voxels: Vec<_> = self.values.keys().copied().collect();
        voxels.sort_unstable();
        voxels
    }

    /// Iterates occupied voxels and their values in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&VoxelCoord, &T)> {
        self.values.iter()
    }

    /// World-space centers of occupied voxels, index-aligned with
    /// [`VoxelGrid::occupied_center_voxels`]. Order is unspecified.
    #[must_use]
    pub fn occupied_centers(&self) -> &[Point3<f64>] {
        &self.centers.points
    }

    /// Voxels whose centers are listed by [`VoxelGrid::occupied_centers`].
    #[must_use]
    pub fn occupied_center_voxels(&self) -> &[VoxelCoord] {
        &self.centers.voxels
    }

    /// Occupied voxels whose world-space center lies inside `aabb`
    /// (inclusive).
    #[must_use]
    pub fn occupied_voxels_from_aabb(&self, aabb: &Aabb) -> Vec<VoxelCoord> {
        self.centers.within(aabb).map(|(_, v)| *v).collect()
    }

    /// World-space centers of occupied voxels that lie inside `aabb`
    /// (inclusive).
    #[must_use]
    pub fn occupied_points_from_aabb(&self, aabb: &Aabb) -> Vec<Point3<f64>> {
        self.centers.within(aabb).map(|(p, _)| *p).collect()
    }

    /// Index bounds of all occupied voxels, or `None` if empty.
    #[must_use]
    pub fn bounds(&self) -> Option<GridBounds> {
        GridBounds::enclosing(self.values.keys().copied())
    }
}

impl<T: Default> VoxelGrid<T> {
    /// Occupies a voxel with `T::default()`. Returns `false` if it was
    /// already occupied, in which case nothing changes.
    pub fn set_occupied(&mut self, voxel: VoxelCoord) -> bool {
        if self.contains(voxel) {
            return false;
        }
        self.set_value(voxel, T::default());
        true
    }

    /// Occupies the voxel containing a world-space point.
    pub fn add_point(&mut self, point_world: &Point3<f64>) -> bool {
        self.set_occupied(self.voxel_from_point(point_world))
    }

    /// Occupies every candidate voxel of a world-space box without any
    /// collision test. Returns how many voxels became occupied.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvertedAabb`] if the box is inverted.
    pub fn add_aabb(&mut self, aabb: &Aabb) -> Result<usize> {
        let mut added = 0;
        for voxel in self.frame.voxels_from_aabb(aabb)? {
            if self.set_occupied(voxel) {
                added += 1;
            }
        }
        Ok(added)
    }
}

impl<T> Default for VoxelGrid<T> {
    fn default() -> Self {
        Self::new(GridFrame::default())
    }
}

impl<T: Default> FromIterator<VoxelCoord> for VoxelGrid<T> {
    /// Builds a unit-cell grid at the world origin occupying every voxel.
    fn from_iter<I: IntoIterator<Item = VoxelCoord>>(iter: I) -> Self {
        let mut grid = Self::default();
        for voxel in iter {
            grid.set_occupied(voxel);
        }
        grid
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Vector3};

    fn grid() -> VoxelGrid<u32> {
        VoxelGrid::with_cell_size(0.5).unwrap()
    }

    fn assert_cache_consistent<T>(grid: &VoxelGrid<T>) {
        assert_eq!(grid.occupied_centers().len(), grid.len());
        assert_eq!(grid.occupied_center_voxels().len(), grid.len());
        for (point, voxel) in grid
            .occupied_centers()
            .iter()
            .zip(grid.occupied_center_voxels())
        {
            assert!(grid.contains(*voxel));
            assert_eq!(grid.voxel_from_point(point), *voxel);
        }
    }

    #[test]
    fn test_set_occupied_idempotent() {
        let mut grid = grid();
        let v = VoxelCoord::new(1, 1, 1);
        assert!(grid.set_occupied(v));
        assert!(!grid.set_occupied(v));
        assert_eq!(grid.len(), 1);
        assert_cache_consistent(&grid);
    }

    #[test]
    fn test_set_occupied_keeps_existing_value() {
        let mut grid = grid();
        let v = VoxelCoord::new(0, 0, 0);
        grid.set_value(v, 7);
        assert!(!grid.set_occupied(v));
        assert_eq!(*grid.get_value(v).unwrap(), 7);
    }

    #[test]
    fn test_get_value_not_found() {
        let grid = grid();
        let err = grid.get_value(VoxelCoord::new(3, 3, 3)).unwrap_err();
        assert!(matches!(
            err,
            OccupancyError::NotFound { coord } if coord == VoxelCoord::new(3, 3, 3)
        ));
    }

    #[test]
    fn test_set_value_upserts_and_tracks_center() {
        let mut grid = grid();
        let v = VoxelCoord::new(2, -1, 0);
        assert_eq!(grid.set_value(v, 1), None);
        assert_eq!(grid.set_value(v, 2), Some(1));
        assert_eq!(grid.len(), 1);
        assert_cache_consistent(&grid);
        *grid.get_value_mut(v).unwrap() += 5;
        assert_eq!(grid.get(v), Some(&7));
    }

    #[test]
    fn test_set_free() {
        let mut grid = grid();
        let a = VoxelCoord::new(0, 0, 0);
        let b = VoxelCoord::new(1, 0, 0);
        let c = VoxelCoord::new(2, 0, 0);
        for v in [a, b, c] {
            grid.set_occupied(v);
        }
        assert!(grid.set_free(a));
        assert!(!grid.set_free(a));
        assert!(!grid.contains(a));
        assert_eq!(grid.len(), 2);
        assert_cache_consistent(&grid);

        assert!(grid.set_free(c));
        assert!(grid.set_free(b));
        assert!(grid.is_empty());
        assert_cache_consistent(&grid);
    }

    #[test]
    fn test_remove_value_returns_value() {
        let mut grid = grid();
        let v = VoxelCoord::new(4, 4, 4);
        grid.set_value(v, 9);
        assert_eq!(grid.remove_value(v), Some(9));
        assert_eq!(grid.remove_value(v), None);
        assert_cache_consistent(&grid);
    }

    #[test]
    fn test_clear() {
        let mut grid = grid();
        grid.set_occupied(VoxelCoord::new(0, 0, 0));
        grid.set_occupied(VoxelCoord::new(0, 0, 1));
        grid.clear();
        assert!(grid.is_empty());
        assert!(grid.occupied_centers().is_empty());
        assert!(grid.set_occupied(VoxelCoord::new(0, 0, 0)));
        assert_cache_consistent(&grid);
    }

    #[test]
    fn test_occupied_sorted() {
        let grid: VoxelGrid<()> = [
            VoxelCoord::new(1, 0, 0),
            VoxelCoord::new(0, 0, 5),
            VoxelCoord::new(0, 1, -2),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            grid.occupied(),
            vec![
                VoxelCoord::new(0, 0, 5),
                VoxelCoord::new(0, 1, -2),
                VoxelCoord::new(1, 0, 0),
            ]
        );
    }

    #[test]
    fn test_occupied_from_aabb_inclusive() {
        let mut grid = grid();
        grid.set_occupied(VoxelCoord::new(0, 0, 0)); // center 0.25
        grid.set_occupied(VoxelCoord::new(1, 0, 0)); // center 0.75
        grid.set_occupied(VoxelCoord::new(3, 0, 0)); // center 1.75

        let aabb = Aabb::new(Point3::new(0.25, 0.0, 0.0), Point3::new(0.75, 0.5, 0.5));
        let mut voxels = grid.occupied_voxels_from_aabb(&aabb);
        voxels.sort_unstable();
        assert_eq!(
            voxels,
            vec![VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 0)]
        );
        let points = grid.occupied_points_from_aabb(&aabb);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| aabb.contains(p)));
    }

    #[test]
    fn test_centers_follow_grid_pose() {
        let pose = Isometry3::translation(10.0, 0.0, 0.0);
        let frame = GridFrame::new(Vector3::repeat(1.0), pose).unwrap();
        let mut grid: VoxelGrid<()> = VoxelGrid::new(frame);
        grid.set_occupied(VoxelCoord::new(0, 0, 0));
        assert_relative_eq!(grid.occupied_centers()[0], Point3::new(10.5, 0.5, 0.5));
    }

    #[test]
    fn test_add_point_and_aabb() {
        let mut grid = grid();
        assert!(grid.add_point(&Point3::new(0.6, 0.1, 0.1)));
        assert!(grid.contains(VoxelCoord::new(1, 0, 0)));

        let aabb = Aabb::new(Point3::new(0.1, 0.1, 0.1), Point3::new(0.9, 0.1, 0.1));
        assert_eq!(grid.add_aabb(&aabb).unwrap(), 1);
        assert_eq!(grid.len(), 2);

        let inverted = Aabb::from_corners(Point3::new(1.0, 0.0, 0.0), Point3::origin());
        assert!(grid.add_aabb(&inverted).is_err());
        assert_cache_consistent(&grid);
    }

    #[test]
    fn test_neighbors_ignore_occupancy() {
        let grid = grid();
        assert_eq!(
            grid.neighbors(VoxelCoord::origin()),
            VoxelCoord::origin().face_neighbors()
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let mut grid = grid();
        grid.set_occupied(VoxelCoord::new(0, 0, 0));
        let mut copy = grid.clone();
        copy.set_occupied(VoxelCoord::new(1, 1, 1));
        assert_eq!(grid.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_bounds() {
        let mut grid = grid();
        assert!(grid.bounds().is_none());
        grid.set_occupied(VoxelCoord::new(-1, 2, 0));
        grid.set_occupied(VoxelCoord::new(3, 0, 5));
        let bounds = grid.bounds().unwrap();
        assert_eq!(bounds.min, VoxelCoord::new(-1, 0, 0));
        assert_eq!(bounds.max, VoxelCoord::new(3, 2, 5));
    }
}
