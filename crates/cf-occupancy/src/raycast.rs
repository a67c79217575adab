//! Visibility queries by grid traversal.
//!
//! Rays are marched cell by cell with the DDA (digital differential analyzer)
//! of Amanatides & Woo: for each axis the traversal tracks the ray parameter
//! at which the next cell face is crossed, and always advances across the
//! nearest one. Every cell the ray passes through is visited exactly once.
//!
//! Rays live in grid space, so anisotropic resolutions and rotated grids are
//! handled by the same traversal.

use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::error::{OccupancyError, Result};
use crate::frame::GridFrame;
use crate::grid::VoxelGrid;
use crate::voxel::VoxelCoord;

/// A ray in grid space.
///
/// The direction does not need to be normalized; traversal parameters are in
/// multiples of its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point in grid space.
    pub origin: Point3<f64>,
    /// Direction in grid space.
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Creates a ray.
    #[must_use]
    pub const fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Iterates the cells of `frame` the ray passes through.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{GridFrame, Ray, VoxelCoord};
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let frame = GridFrame::cubic(1.0).unwrap();
    /// let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(1.0, 1.0, 0.0));
    /// let cells: Vec<_> = ray.traverse(&frame).take(3).map(|(c, _)| c).collect();
    /// assert_eq!(
    ///     cells,
    ///     vec![VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 0), VoxelCoord::new(1, 1, 0)]
    /// );
    /// ```
    #[must_use]
    pub fn traverse(&self, frame: &GridFrame) -> VoxelTraversal {
        VoxelTraversal::new(*self, frame)
    }
}

/// Iterator over the cells a [`Ray`] passes through.
///
/// Yields `(cell, t)` where `t` is the ray parameter at which the cell is
/// entered; the first item is the cell containing the origin with `t = 0`.
/// When the ray crosses two faces at the same parameter, the lower axis is
/// crossed first. Unbounded: callers decide when to stop.
#[derive(Debug, Clone)]
pub struct VoxelTraversal {
    current: VoxelCoord,
    step: [i32; 3],
    t_max: [f64; 3],
    t_delta: [f64; 3],
    first: bool,
}

impl VoxelTraversal {
    fn new(ray: Ray, frame: &GridFrame) -> Self {
        let current = frame.voxel_from_grid_point(&ray.origin);
        let lower = frame.lower_from_voxel(current);
        let upper = frame.upper_from_voxel(current);

        let mut step = [0i32; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];

        for axis in 0..3 {
            let dir = ray.direction[axis];
            if dir.abs() <= f64::EPSILON {
                continue;
            }
            // Far face when stepping up, near face when stepping down.
            let face = if dir > 0.0 {
                step[axis] = 1;
                upper[axis]
            } else {
                step[axis] = -1;
                lower[axis]
            };
            t_max[axis] = (face - ray.origin[axis]) / dir;
            t_delta[axis] = frame.resolution()[axis] / dir.abs();
        }

        Self {
            current,
            step,
            t_max,
            t_delta,
            first: true,
        }
    }
}

impl VoxelTraversal {
    /// Advances like [`Iterator::next`], but never crosses a face on an axis
    /// where the current cell already has `goal`'s index.
    ///
    /// When the ray passes exactly through an edge or corner of the goal cell,
    /// plain traversal may step the wrong axis first and slip past it; this
    /// keeps every step on a monotone path into `goal`. Returns `None` once
    /// the goal is reached or no remaining axis moves along the ray.
    pub fn next_toward(&mut self, goal: VoxelCoord) -> Option<(VoxelCoord, f64)> {
        if self.first {
            self.first = false;
            return Some((self.current, 0.0));
        }
        let (current, target) = (self.current.as_array(), goal.as_array());
        self.advance(|axis| current[axis] != target[axis])
    }

    /// Crosses the nearest face among the eligible axes, lowest axis on ties.
    fn advance(&mut self, eligible: impl Fn(usize) -> bool) -> Option<(VoxelCoord, f64)> {
        let axis = (0..3)
            .filter(|&axis| eligible(axis))
            .min_by(|&a, &b| self.t_max[a].total_cmp(&self.t_max[b]))?;
        let t = self.t_max[axis];
        if !t.is_finite() {
            return None;
        }

        self.current = self.current.offset(axis, self.step[axis]);
        self.t_max[axis] += self.t_delta[axis];
        Some((self.current, t))
    }
}

impl Iterator for VoxelTraversal {
    type Item = (VoxelCoord, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.first {
            self.first = false;
            return Some((self.current, 0.0));
        }
        self.advance(|_| true)
    }
}

/// Outcome of [`VoxelGrid::ray_trace`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RayTrace {
    /// Cells passed through, starting at the start cell. Ends with the goal
    /// cell when `reached`; otherwise ends before the blocking cell.
    pub path: Vec<VoxelCoord>,
    /// Whether the goal cell was entered without crossing an occupied cell.
    pub reached: bool,
}

impl<T> VoxelGrid<T> {
    /// Traces a straight line from the center of `start` toward a world-space
    /// goal point.
    ///
    /// Fails immediately (empty path) when `start` is occupied. Otherwise
    /// cells are entered in DDA order until the goal point's cell is reached,
    /// or until a newly entered cell is occupied. Faces are only crossed
    /// toward the goal cell, so a ray through an edge or corner of that cell
    /// still ends in it and the path has one cell per unit of Manhattan
    /// distance between start and goal, plus the start.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::DegenerateRay`] if the goal point coincides
    /// with the center of `start`.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{VoxelCoord, VoxelGrid};
    /// use nalgebra::Point3;
    ///
    /// let mut grid: VoxelGrid<()> = VoxelGrid::with_cell_size(1.0).unwrap();
    /// let goal = Point3::new(4.5, 0.5, 0.5);
    ///
    /// let trace = grid.ray_trace(VoxelCoord::origin(), &goal).unwrap();
    /// assert!(trace.reached);
    /// assert_eq!(trace.path.last(), Some(&VoxelCoord::new(4, 0, 0)));
    ///
    /// grid.set_occupied(VoxelCoord::new(2, 0, 0));
    /// let trace = grid.ray_trace(VoxelCoord::origin(), &goal).unwrap();
    /// assert!(!trace.reached);
    /// assert_eq!(trace.path, vec![VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 0)]);
    /// ```
    pub fn ray_trace(&self, start: VoxelCoord, goal_point: &Point3<f64>) -> Result<RayTrace> {
        if self.contains(start) {
            return Ok(RayTrace::default());
        }

        let frame = self.frame();
        let goal = frame.voxel_from_point(goal_point);
        let origin = frame.center_from_voxel(start);
        let direction = frame.to_grid(goal_point) - origin;
        let length = direction.norm();
        if length < f64::EPSILON {
            return Err(OccupancyError::DegenerateRay);
        }

        let mut cells = Ray::new(origin, direction / length).traverse(frame);
        cells.next();
        let mut path = Vec::new();
        let mut current = start;

        while current != goal {
            path.push(current);
            let Some((next, _)) = cells.next_toward(goal) else {
                warn!(
                    "Ray from {:?} stalled at {:?} before goal cell {:?}",
                    start, current, goal
                );
                return Ok(RayTrace {
                    path,
                    reached: false,
                });
            };
            current = next;
            if self.contains(current) {
                return Ok(RayTrace {
                    path,
                    reached: false,
                });
            }
        }

        path.push(goal);
        Ok(RayTrace {
            path,
            reached: true,
        })
    }

    /// Whether `to` is visible from the cell containing `from`.
    ///
    /// Traces from the center of that cell as [`VoxelGrid::ray_trace`] does.
    /// A `to` at the cell center is visible when the cell is free.
    #[must_use]
    pub fn line_of_sight(&self, from: &Point3<f64>, to: &Point3<f64>) -> bool {
        let start = self.voxel_from_point(from);
        match self.ray_trace(start, to) {
            Ok(trace) => trace.reached,
            Err(_) => !self.contains(start),
        }
    }
}
