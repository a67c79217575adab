//! Top-down projections of the grid.
//!
//! Columns are reduced to their tallest occupied voxel, then rendered into a
//! normalized height image or scanned for exploration frontiers.

use hashbrown::HashSet;
use nalgebra::{DMatrix, Point2, Point3};
use tracing::{debug, trace};

use crate::config::HeightMapConfig;
use crate::error::{OccupancyError, Result};
use crate::grid::VoxelGrid;
use crate::voxel::VoxelCoord;

const DIAGONALS: [(i64, i64); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// The tallest occupied voxel of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnTop {
    /// Column x index.
    pub i: i32,
    /// Column y index.
    pub j: i32,
    /// Highest occupied k in the column.
    pub k: i32,
}

impl ColumnTop {
    /// The voxel this top refers to.
    #[must_use]
    pub const fn voxel(&self) -> VoxelCoord {
        VoxelCoord::new(self.i, self.j, self.k)
    }
}

/// A normalized height image.
///
/// Row 0 is the top of the image (largest y); column 0 is the smallest x.
/// Unpainted pixels are `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    pixels: DMatrix<f64>,
}

impl HeightMap {
    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Pixel value, or `None` outside the image.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.pixels.get((row, col)).copied()
    }

    /// Largest pixel value.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.pixels.max()
    }

    /// Borrows the pixel matrix (`height × width`).
    #[must_use]
    pub const fn as_matrix(&self) -> &DMatrix<f64> {
        &self.pixels
    }

    /// Consumes the map, returning the pixel matrix.
    #[must_use]
    pub fn into_matrix(self) -> DMatrix<f64> {
        self.pixels
    }
}

impl<T> VoxelGrid<T> {
    /// Tallest occupied voxel of every occupied column, sorted by `(i, j)`.
    #[must_use]
    pub fn project2d(&self) -> Vec<ColumnTop> {
        let mut tops: Vec<ColumnTop> = Vec::new();
        // Sorted order visits each column's voxels in ascending k.
        for voxel in self.occupied() {
            match tops.last_mut() {
                Some(top) if top.i == voxel.x && top.j == voxel.y => top.k = voxel.z,
                _ => tops.push(ColumnTop {
                    i: voxel.x,
                    j: voxel.y,
                    k: voxel.z,
                }),
            }
        }
        tops
    }

    /// Renders column heights into an image.
    ///
    /// The image covers the square of side `planar_extent` centered on
    /// `reference_point` in the grid's xy plane. Each column's top face height
    /// is normalized by `config`; the column's footprint is painted, keeping
    /// the larger value where footprints overlap. Columns whose footprint
    /// reaches outside the image are skipped entirely.
    ///
    /// A footprint spans the pixels from `floor` of its lower edge to `floor`
    /// of its upper edge, both inclusive. The upper edge lands on the first
    /// pixel of the next cell, so a footprint covers one extra pixel row and
    /// column: side-by-side columns share a pixel line (the larger value
    /// wins), and a column whose upper edge lies on the image's far border is
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidConfig`] if `planar_extent` is not
    /// positive and finite, or if `config` fails
    /// [`HeightMapConfig::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{HeightMapConfig, VoxelCoord, VoxelGrid};
    /// use nalgebra::Point3;
    ///
    /// let mut grid: VoxelGrid<()> = VoxelGrid::with_cell_size(0.5).unwrap();
    /// grid.set_occupied(VoxelCoord::new(1, 1, 1));
    ///
    /// let config = HeightMapConfig::new().with_size(8, 8).with_z_range(0.0, 2.0);
    /// let map = grid
    ///     .create_height_map(&Point3::new(1.0, 1.0, 0.0), 2.0, &config)
    ///     .unwrap();
    /// assert_eq!(map.max_value(), 0.5);
    /// ```
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn create_height_map(
        &self,
        reference_point: &Point3<f64>,
        planar_extent: f64,
        config: &HeightMapConfig,
    ) -> Result<HeightMap> {
        config.validate()?;
        if !planar_extent.is_finite() || planar_extent <= 0.0 {
            return Err(OccupancyError::invalid_config(format!(
                "planar extent must be positive and finite, got {planar_extent}"
            )));
        }

        let frame = self.frame();
        let (width, height) = (config.width(), config.height());
        let reference = frame.to_grid(reference_point);
        let half = planar_extent / 2.0;
        let lower = Point2::new(reference.x - half, reference.y - half);
        let scale = Point2::new(width as f64, height as f64) / planar_extent;
        let pixel =
            |value: f64, axis: usize| ((value - lower[axis]) * scale[axis]).floor() as i64;

        let mut pixels = DMatrix::zeros(height, width);
        let mut painted = 0usize;
        for top in self.project2d() {
            let lo = frame.lower_from_voxel(top.voxel());
            let hi = frame.upper_from_voxel(top.voxel());
            let (x1, x2) = (pixel(lo.x, 0), pixel(hi.x, 0));
            let (y1, y2) = (pixel(lo.y, 1), pixel(hi.y, 1));
            if x1 < 0 || y1 < 0 || x2 >= width as i64 || y2 >= height as i64 {
                trace!("Column ({}, {}) outside height map", top.i, top.j);
                continue;
            }

            let value = config.normalize(hi.z);
            for col in x1 as usize..=x2 as usize {
                for y in y1 as usize..=y2 as usize {
                    let cell: &mut f64 = &mut pixels[(height - y - 1, col)];
                    *cell = cell.max(value);
                }
            }
            painted += 1;
        }

        debug!("Painted {} columns into {}x{} height map", painted, width, height);
        Ok(HeightMap { pixels })
    }

    /// Occupied columns with an unoccupied diagonal neighbor column.
    ///
    /// Only neighbors inside the bounding rectangle of the occupied columns
    /// count. Returned as world-space xy of each column's top voxel center,
    /// in `(i, j)` order.
    #[must_use]
    pub fn frontier(&self) -> Vec<Point2<f64>> {
        let Some(bounds) = self.bounds() else {
            return Vec::new();
        };
        let (i_range, j_range) = (
            i64::from(bounds.min.x)..=i64::from(bounds.max.x),
            i64::from(bounds.min.y)..=i64::from(bounds.max.y),
        );
        let tops = self.project2d();
        let columns: HashSet<(i64, i64)> = tops
            .iter()
            .map(|top| (i64::from(top.i), i64::from(top.j)))
            .collect();

        tops.iter()
            .filter(|top| {
                let (i, j) = (i64::from(top.i), i64::from(top.j));
                DIAGONALS.iter().any(|&(di, dj)| {
                    let (ni, nj) = (i + di, j + dj);
                    i_range.contains(&ni)
                        && j_range.contains(&nj)
                        && !columns.contains(&(ni, nj))
                })
            })
            .map(|top| {
                let center = self.frame().world_center_from_voxel(top.voxel());
                Point2::new(center.x, center.y)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Vector3};

    use crate::frame::GridFrame;

    fn tall_grid() -> VoxelGrid<()> {
        let frame = GridFrame::new(Vector3::new(1.0, 1.0, 0.1), Isometry3::identity()).unwrap();
        VoxelGrid::new(frame)
    }

    fn config() -> HeightMapConfig {
        HeightMapConfig::new().with_size(4, 4).with_z_range(0.0, 1.0)
    }

    fn render(grid: &VoxelGrid<()>) -> HeightMap {
        grid.create_height_map(&Point3::new(2.0, 2.0, 0.0), 4.0, &config())
            .unwrap()
    }

    #[test]
    fn test_project2d_keeps_tallest() {
        let grid: VoxelGrid<()> = [(0, 0, 1), (0, 0, 5), (0, 0, -2), (1, 0, 0)]
            .into_iter()
            .map(VoxelCoord::from)
            .collect();
        assert_eq!(
            grid.project2d(),
            vec![ColumnTop { i: 0, j: 0, k: 5 }, ColumnTop { i: 1, j: 0, k: 0 }]
        );
    }

    #[test]
    fn test_footprint_includes_upper_edge() {
        // One cell per pixel: column (1, 1) covers pixels 1..=2 on both axes.
        let mut grid = tall_grid();
        grid.set_occupied(VoxelCoord::new(1, 1, 4));
        let map = render(&grid);
        for (row, col) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            assert_relative_eq!(map.get(row, col).unwrap(), 0.5, epsilon = 1e-9);
        }
        for i in 0..4 {
            assert_eq!(map.get(0, i).unwrap(), 0.0);
            assert_eq!(map.get(3, i).unwrap(), 0.0);
            assert_eq!(map.get(i, 0).unwrap(), 0.0);
            assert_eq!(map.get(i, 3).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_shared_pixel_keeps_max() {
        // Footprints of columns (1, 1) and (2, 1) share pixel column 2.
        for (first, second) in [(2, 6), (6, 2)] {
            let mut grid = tall_grid();
            grid.set_occupied(VoxelCoord::new(1, 1, first));
            grid.set_occupied(VoxelCoord::new(2, 1, second));
            let map = render(&grid);
            assert_relative_eq!(map.get(1, 2).unwrap(), 0.7, epsilon = 1e-9);
            assert_relative_eq!(map.get(2, 2).unwrap(), 0.7, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rows_flipped() {
        let mut grid = tall_grid();
        grid.set_occupied(VoxelCoord::new(0, 0, 4));
        let map = render(&grid);
        // y pixels 0..=1 land on the bottom two rows.
        assert_relative_eq!(map.get(3, 0).unwrap(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(map.get(2, 1).unwrap(), 0.5, epsilon = 1e-9);
        assert_eq!(map.get(0, 0).unwrap(), 0.0);
        assert_eq!(map.get(1, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_heights_clamped() {
        let mut grid = tall_grid();
        grid.set_occupied(VoxelCoord::new(0, 0, 40));
        grid.set_occupied(VoxelCoord::new(0, 2, -30));
        let map = render(&grid);
        assert_eq!(map.get(3, 0).unwrap(), 1.0);
        assert_eq!(map.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_out_of_image_columns_discarded() {
        let mut grid = tall_grid();
        // Upper edge of column 3 maps to pixel 4, past the last column.
        grid.set_occupied(VoxelCoord::new(3, 0, 5));
        grid.set_occupied(VoxelCoord::new(-1, 0, 5));
        let map = render(&grid);
        assert_eq!(map.max_value(), 0.0);
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 4);
    }

    #[test]
    fn test_invalid_arguments() {
        let grid = tall_grid();
        let origin = Point3::origin();
        for extent in [0.0, -1.0, f64::NAN] {
            let err = grid.create_height_map(&origin, extent, &config()).unwrap_err();
            assert!(err.is_validation());
        }
        let empty = HeightMapConfig::new().with_size(0, 4);
        assert!(grid.create_height_map(&origin, 1.0, &empty).is_err());
    }

    #[test]
    fn test_frontier_plus_shape() {
        let grid: VoxelGrid<()> = [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)]
            .into_iter()
            .map(|(i, j)| VoxelCoord::new(i, j, 0))
            .collect();
        let frontier = grid.frontier();
        assert_eq!(frontier.len(), 1);
        assert_relative_eq!(frontier[0], Point2::new(1.5, 1.5));
    }

    #[test]
    fn test_frontier_full_square_is_empty() {
        let grid: VoxelGrid<()> = (0..3)
            .flat_map(|i| (0..3).map(move |j| VoxelCoord::new(i, j, 0)))
            .collect();
        assert!(grid.frontier().is_empty());
    }

    #[test]
    fn test_frontier_offset_columns() {
        let grid: VoxelGrid<()> = [(10, 10), (11, 11), (10, 11)]
            .into_iter()
            .map(|(i, j)| VoxelCoord::new(i, j, 3))
            .collect();
        // Only (10, 11) has an empty diagonal, (11, 10), inside the bounds.
        let frontier = grid.frontier();
        assert_eq!(frontier.len(), 1);
        assert_relative_eq!(frontier[0], Point2::new(10.5, 11.5));
    }

    #[test]
    fn test_frontier_empty_grid() {
        let grid: VoxelGrid<()> = VoxelGrid::default();
        assert!(grid.frontier().is_empty());
    }
}
