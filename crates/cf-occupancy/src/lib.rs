//! Sparse voxel occupancy grids for manipulation planning.
//!
//! This crate discretizes a workspace into a regular lattice of cells and
//! records which cells are occupied, so planners can ask cheap questions about
//! free space:
//!
//! - [`GridFrame`] - Cell size and pose of a grid, with world/grid/voxel conversions
//! - [`VoxelGrid`] - Sparse occupancy set storing a value per occupied voxel
//! - [`VoxelCoord`] and [`GridBounds`] - Integer voxel indices and ranges
//! - [`Aabb`] and [`Oobb`] - Axis-aligned and oriented boxes
//! - [`CollisionOracle`] - Injected collision checker for updating occupancy from bodies
//! - [`Ray`] and [`VoxelTraversal`] - DDA traversal for visibility queries
//! - [`ColumnInterval`] - Run-length compressed columns
//! - [`HeightMap`] - Top-down height image of the occupied columns
//!
//! # Coordinate Systems
//!
//! Three spaces are involved:
//! - **World**: continuous `f64` coordinates of the scene
//! - **Grid**: world coordinates expressed in the grid's own frame, see
//!   [`GridFrame::world_from_grid`]
//! - **Voxel**: integer indices; voxel `v` spans
//!   `[v * resolution, (v + 1) * resolution)` in grid space
//!
//! Z is up. Columns are the voxels sharing `(i, j)`.
//!
//! # Example
//!
//! ```
//! use cf_occupancy::{Aabb, VoxelCoord, VoxelGrid};
//! use nalgebra::Point3;
//!
//! // A grid of 0.1 unit cells at the world origin
//! let mut grid: VoxelGrid<()> = VoxelGrid::with_cell_size(0.1).unwrap();
//!
//! // Occupy every cell touched by a box
//! let table = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.35, 0.15, 0.05));
//! let added = grid.add_aabb(&table).unwrap();
//! assert_eq!(added, grid.len());
//!
//! // Point queries go through the frame
//! let v = grid.voxel_from_point(&Point3::new(0.12, 0.05, 0.01));
//! assert_eq!(v, VoxelCoord::new(1, 0, 0));
//! assert!(grid.contains(v));
//! ```
//!
//! # Updating From Bodies
//!
//! Bulk updates ask a [`CollisionOracle`] whether a one-cell probe at each
//! candidate voxel touches a body. See [`VoxelGrid::add_bodies`] and
//! [`VoxelGrid::remove_bodies`].
//!
//! # Projections
//!
//! ```
//! use cf_occupancy::{VoxelCoord, VoxelGrid};
//!
//! let grid: VoxelGrid<()> = [(0, 0, 0), (0, 0, 1), (0, 0, 4), (2, 1, 0)]
//!     .into_iter()
//!     .map(VoxelCoord::from)
//!     .collect();
//!
//! assert_eq!(grid.create_intervals().len(), 3);
//! assert_eq!(grid.project2d().len(), 2);
//! assert_eq!(grid.clusters().len(), 3);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod cluster;
mod collision;
mod config;
mod error;
mod frame;
mod geometry;
mod grid;
mod heightmap;
mod interval;
mod raycast;
mod voxel;

// Re-export core types
pub use bounds::{GridBounds, GridBoundsIter};
pub use collision::{AffectedVoxels, CollisionOracle};
pub use config::{HeightMapConfig, MAX_TEXTURE_WIDTH};
pub use error::{OccupancyError, Result};
pub use frame::GridFrame;
pub use geometry::{Aabb, Oobb};
pub use grid::VoxelGrid;
pub use heightmap::{ColumnTop, HeightMap};
pub use interval::ColumnInterval;
pub use raycast::{Ray, RayTrace, VoxelTraversal};
pub use voxel::VoxelCoord;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, Vector3};
