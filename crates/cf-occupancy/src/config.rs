//! Configuration for height-map rendering.
//!
//! # Example
//!
//! ```
//! use cf_occupancy::HeightMapConfig;
//!
//! let config = HeightMapConfig::default()
//!     .with_size(256, 128)
//!     .with_z_range(0.0, 1.5);
//! assert_eq!(config.width(), 256);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{OccupancyError, Result};

/// Default image side length in pixels.
pub const MAX_TEXTURE_WIDTH: usize = 418;

/// Image size and height range for [`VoxelGrid::create_height_map`].
///
/// Column tops are clamped to `[min_z, max_z]` (grid frame) before being
/// normalized to `[0, 1]`.
///
/// [`VoxelGrid::create_height_map`]: crate::VoxelGrid::create_height_map
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightMapConfig {
    /// Image width in pixels (columns).
    width: usize,
    /// Image height in pixels (rows).
    height: usize,
    /// Height mapped to 0.
    min_z: f64,
    /// Height mapped to 1.
    max_z: f64,
}

impl HeightMapConfig {
    /// Creates a configuration with default settings.
    ///
    /// Defaults:
    /// - Size: [`MAX_TEXTURE_WIDTH`] square
    /// - Height range: `[0.0, 2.0]`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: MAX_TEXTURE_WIDTH,
            height: MAX_TEXTURE_WIDTH,
            min_z: 0.0,
            max_z: 2.0,
        }
    }

    /// Sets the image size.
    #[must_use]
    pub const fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the clamped height range.
    #[must_use]
    pub const fn with_z_range(mut self, min_z: f64, max_z: f64) -> Self {
        self.min_z = min_z;
        self.max_z = max_z;
        self
    }

    /// Returns the image width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the height mapped to 0.
    #[must_use]
    pub const fn min_z(&self) -> f64 {
        self.min_z
    }

    /// Returns the height mapped to 1.
    #[must_use]
    pub const fn max_z(&self) -> f64 {
        self.max_z
    }

    /// Checks the image is non-empty and the height range is finite and
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(OccupancyError::invalid_config(format!(
                "height map size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.min_z.is_finite() || !self.max_z.is_finite() {
            return Err(OccupancyError::invalid_config(
                "height map z range must be finite",
            ));
        }
        if self.max_z <= self.min_z {
            return Err(OccupancyError::invalid_config(format!(
                "max_z ({}) must exceed min_z ({})",
                self.max_z, self.min_z
            )));
        }
        Ok(())
    }

    /// Maps a height to `[0, 1]`, clamping outside the range.
    #[must_use]
    pub fn normalize(&self, z: f64) -> f64 {
        (z.clamp(self.min_z, self.max_z) - self.min_z) / (self.max_z - self.min_z)
    }
}

impl Default for HeightMapConfig {
    fn default() -> Self {
        Self::new()
    }
}
