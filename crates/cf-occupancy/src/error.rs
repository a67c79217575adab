//! Error types for occupancy grid operations.

use crate::VoxelCoord;

/// Result alias for occupancy grid operations.
pub type Result<T> = std::result::Result<T, OccupancyError>;

/// Errors that can occur during occupancy grid operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OccupancyError {
    /// A resolution component was zero, negative or not finite.
    #[error("resolution along axis {axis} must be positive and finite, got {value}")]
    InvalidResolution {
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// The rejected cell size.
        value: f64,
    },

    /// A bounding box had `min > max` on some axis.
    #[error("inverted bounding box along axis {axis}: min {min} > max {max}")]
    InvertedAabb {
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// Lower bound on that axis.
        min: f64,
        /// Upper bound on that axis.
        max: f64,
    },

    /// The voxel is not occupied.
    #[error("voxel {coord:?} is not occupied")]
    NotFound {
        /// The requested voxel.
        coord: VoxelCoord,
    },

    /// A ray's start and goal coincide, so it has no direction.
    #[error("degenerate ray: start and goal points coincide")]
    DegenerateRay,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The collision oracle failed while updating occupancy from bodies.
    #[error("collision oracle failed: {0}")]
    Oracle(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl OccupancyError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Wraps an error reported by a collision oracle.
    #[must_use]
    pub fn oracle(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Oracle(Box::new(err))
    }

    /// Returns `true` for errors caused by rejected input values
    /// (resolution, bounding boxes, configuration).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidResolution { .. } | Self::InvertedAabb { .. } | Self::InvalidConfig(_)
        )
    }
}
