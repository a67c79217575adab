//! Inclusive boxes of voxel indices.

use std::iter::FusedIterator;

use crate::voxel::VoxelCoord;

/// An inclusive, axis-aligned range of voxel indices.
///
/// Iterating yields the Cartesian product of the three ranges with axis 0
/// varying slowest and axis 2 fastest.
///
/// # Example
///
/// ```
/// use cf_occupancy::{GridBounds, VoxelCoord};
///
/// let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 1));
/// let cells: Vec<_> = bounds.iter().collect();
/// assert_eq!(
///     cells,
///     vec![
///         VoxelCoord::new(0, 0, 0),
///         VoxelCoord::new(0, 0, 1),
///         VoxelCoord::new(1, 0, 0),
///         VoxelCoord::new(1, 0, 1),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    /// Lowest index on every axis.
    pub min: VoxelCoord,
    /// Highest index on every axis.
    pub max: VoxelCoord,
}

impl GridBounds {
    /// Bounds spanning two corners given in any order.
    #[must_use]
    pub fn new(a: VoxelCoord, b: VoxelCoord) -> Self {
        Self {
            min: a.inf(b),
            max: a.sup(b),
        }
    }

    /// Bounds holding the single cell `coord`.
    #[must_use]
    pub const fn single(coord: VoxelCoord) -> Self {
        Self {
            min: coord,
            max: coord,
        }
    }

    /// Smallest bounds holding every index in `coords`, or `None` if empty.
    pub fn enclosing(coords: impl IntoIterator<Item = VoxelCoord>) -> Option<Self> {
        let mut coords = coords.into_iter();
        let first = Self::single(coords.next()?);
        Some(coords.fold(first, |mut bounds, coord| {
            bounds.include(coord);
            bounds
        }))
    }

    /// Number of cells along x, y and z.
    #[must_use]
    pub fn shape(&self) -> [u32; 3] {
        let (lo, hi) = (self.min.as_array(), self.max.as_array());
        std::array::from_fn(|axis| hi[axis].abs_diff(lo[axis]).saturating_add(1))
    }

    /// Total number of cells.
    #[must_use]
    pub fn volume(&self) -> u64 {
        self.shape()
            .into_iter()
            .fold(1u64, |n, len| n.saturating_mul(u64::from(len)))
    }

    /// Whether `coord` lies inside the bounds.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.min.inf(coord) == self.min && self.max.sup(coord) == self.max
    }

    /// Grows the bounds to hold `coord`.
    pub fn include(&mut self, coord: VoxelCoord) {
        self.min = self.min.inf(coord);
        self.max = self.max.sup(coord);
    }

    /// Iterates every index in the bounds.
    #[must_use]
    pub fn iter(&self) -> GridBoundsIter {
        GridBoundsIter {
            min: self.min,
            shape: self.shape(),
            front: 0,
            back: self.volume(),
        }
    }
}

impl IntoIterator for GridBounds {
    type Item = VoxelCoord;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &GridBounds {
    type Item = VoxelCoord;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the indices of a [`GridBounds`].
///
/// Walks the linear cell numbers `front..back` and decodes each back into an
/// index, so it is exact-size and double-ended.
#[derive(Debug, Clone)]
pub struct GridBoundsIter {
    min: VoxelCoord,
    shape: [u32; 3],
    front: u64,
    back: u64,
}

impl GridBoundsIter {
    // Each quotient is below its axis length, which fits in u32.
    #[allow(clippy::cast_possible_truncation)]
    fn cell(&self, linear: u64) -> VoxelCoord {
        let [_, ny, nz] = self.shape.map(u64::from);
        let plane = ny * nz;
        let (i, rest) = (linear / plane, linear % plane);
        let (j, k) = (rest / nz, rest % nz);
        VoxelCoord::new(
            self.min.x.wrapping_add_unsigned(i as u32),
            self.min.y.wrapping_add_unsigned(j as u32),
            self.min.z.wrapping_add_unsigned(k as u32),
        )
    }
}

impl Iterator for GridBoundsIter {
    type Item = VoxelCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let cell = self.cell(self.front);
        self.front += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.back - self.front).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for GridBoundsIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.cell(self.back))
    }
}

impl ExactSizeIterator for GridBoundsIter {}

impl FusedIterator for GridBoundsIter {}
