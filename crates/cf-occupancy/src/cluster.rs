//! Connected components of occupied voxels.
//!
//! Two voxels are connected when they share a face (6-connectivity); diagonal
//! contact does not join clusters.

use hashbrown::HashSet;

use crate::grid::VoxelGrid;
use crate::voxel::VoxelCoord;

impl<T> VoxelGrid<T> {
    /// Partitions all occupied voxels into 6-connected clusters.
    ///
    /// Seeds are taken in sorted voxel order. See [`VoxelGrid::clusters_of`]
    /// for the output order.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{VoxelCoord, VoxelGrid};
    ///
    /// let grid: VoxelGrid<()> = [
    ///     VoxelCoord::new(0, 0, 0),
    ///     VoxelCoord::new(0, 0, 1),
    ///     VoxelCoord::new(5, 5, 5),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let clusters = grid.clusters();
    /// assert_eq!(clusters.len(), 2);
    /// assert_eq!(clusters[0].len(), 2);
    /// ```
    #[must_use]
    pub fn clusters(&self) -> Vec<Vec<VoxelCoord>> {
        self.clusters_of(self.occupied())
    }

    /// Groups the occupied voxels reachable from `seeds` into 6-connected
    /// clusters.
    ///
    /// Seeds are visited in the given order; unoccupied or already clustered
    /// seeds are skipped. Each cluster lists voxels in depth-first preorder,
    /// exploring neighbors in [`VoxelCoord::face_neighbors`] order, and
    /// clusters appear in the order of their seeds. Traversal may leave the
    /// seed set: every occupied voxel connected to a seed joins its cluster.
    #[must_use]
    pub fn clusters_of(&self, seeds: impl IntoIterator<Item = VoxelCoord>) -> Vec<Vec<VoxelCoord>> {
        let mut clusters = Vec::new();
        let mut assigned: HashSet<VoxelCoord> = HashSet::new();
        let mut stack = Vec::new();

        for seed in seeds {
            if assigned.contains(&seed) || !self.contains(seed) {
                continue;
            }

            let mut cluster = Vec::new();
            stack.push(seed);
            while let Some(current) = stack.pop() {
                if !self.contains(current) || !assigned.insert(current) {
                    continue;
                }
                cluster.push(current);
                // Reversed so the first neighbor is popped first.
                for neighbor in current.face_neighbors().into_iter().rev() {
                    if !assigned.contains(&neighbor) && self.contains(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
            clusters.push(cluster);
        }

        clusters
    }
}
