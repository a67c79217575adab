//! Occupancy updates driven by a collision backend.
//!
//! The grid never decides on its own whether a body overlaps a cell. It asks a
//! [`CollisionOracle`] for each body's links and their world-space bounding
//! boxes, voxelizes those boxes into candidate cells, and then asks the oracle
//! whether a one-cell probe box placed at each candidate intersects the link.
//!
//! Updates are applied voxel by voxel. If the oracle fails partway through a
//! batch, the transitions already applied stay in place and the error is
//! returned as [`OccupancyError::Oracle`].

use std::collections::BTreeMap;
use std::fmt::Debug;

use tracing::{debug, info};

use crate::error::{OccupancyError, Result};
use crate::geometry::{Aabb, Oobb};
use crate::grid::VoxelGrid;
use crate::voxel::VoxelCoord;

/// Geometry queries the grid needs from a physics or collision backend.
pub trait CollisionOracle {
    /// Handle of a rigid body.
    type Body: Copy + Eq + Debug;
    /// Handle of one link (collision part) of a body.
    type Link: Copy + Eq + Debug;
    /// Error reported by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Links making up `body`.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn links(&self, body: Self::Body) -> std::result::Result<Vec<Self::Link>, Self::Error>;

    /// Current world-space bounding box of one link.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn link_aabb(
        &self,
        body: Self::Body,
        link: Self::Link,
    ) -> std::result::Result<Aabb, Self::Error>;

    /// Whether the oriented `probe` box lies within `threshold` of the link.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn probe_intersects(
        &mut self,
        probe: &Oobb,
        body: Self::Body,
        link: Self::Link,
        threshold: f64,
    ) -> std::result::Result<bool, Self::Error>;
}

/// Candidate voxels of a bulk update and the links whose boxes cover them.
pub type AffectedVoxels<O> =
    BTreeMap<VoxelCoord, Vec<(<O as CollisionOracle>::Body, <O as CollisionOracle>::Link)>>;

impl<T> VoxelGrid<T> {
    /// Voxels covered by the bounding boxes of `bodies`' links whose current
    /// occupancy equals `occupied`, each with the `(body, link)` pairs that
    /// cover it.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::Oracle`] if the oracle fails and
    /// [`OccupancyError::InvertedAabb`] if it reports an inverted box.
    pub fn affected_voxels<O: CollisionOracle>(
        &self,
        oracle: &O,
        bodies: &[O::Body],
        occupied: bool,
    ) -> Result<AffectedVoxels<O>> {
        let mut affected = AffectedVoxels::<O>::new();
        for &body in bodies {
            for link in oracle.links(body).map_err(OccupancyError::oracle)? {
                let aabb = oracle
                    .link_aabb(body, link)
                    .map_err(OccupancyError::oracle)?;
                for voxel in self.frame().voxels_from_aabb(&aabb)? {
                    if self.contains(voxel) == occupied {
                        affected.entry(voxel).or_default().push((body, link));
                    }
                }
            }
        }
        Ok(affected)
    }

    /// Whether the probe at `voxel` intersects any of `pairs`.
    fn probe_hits<O: CollisionOracle>(
        &self,
        oracle: &mut O,
        voxel: VoxelCoord,
        pairs: &[(O::Body, O::Link)],
        threshold: f64,
    ) -> Result<bool> {
        let probe = self.frame().probe_from_voxel(voxel);
        for &(body, link) in pairs {
            if oracle
                .probe_intersects(&probe, body, link, threshold)
                .map_err(OccupancyError::oracle)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Frees occupied voxels whose probe intersects a link of `bodies`.
    /// Returns how many voxels were freed.
    ///
    /// # Errors
    ///
    /// See [`VoxelGrid::affected_voxels`]. On error, voxels freed so far stay
    /// free.
    pub fn remove_bodies<O: CollisionOracle>(
        &mut self,
        oracle: &mut O,
        bodies: &[O::Body],
        threshold: f64,
    ) -> Result<usize> {
        self.remove_bodies_retaining(oracle, bodies, &[], threshold)
    }

    /// Like [`VoxelGrid::remove_bodies`], but keeps a voxel occupied when its
    /// probe still intersects a link of one of the `retained` bodies.
    ///
    /// # Errors
    ///
    /// See [`VoxelGrid::affected_voxels`].
    pub fn remove_bodies_retaining<O: CollisionOracle>(
        &mut self,
        oracle: &mut O,
        bodies: &[O::Body],
        retained: &[O::Body],
        threshold: f64,
    ) -> Result<usize> {
        let candidates = self.affected_voxels(oracle, bodies, true)?;

        let mut retained_pairs = Vec::new();
        for &body in retained {
            for link in oracle.links(body).map_err(OccupancyError::oracle)? {
                retained_pairs.push((body, link));
            }
        }
        debug!(
            "Testing {} occupied voxels against {} bodies ({} retained links)",
            candidates.len(),
            bodies.len(),
            retained_pairs.len()
        );

        let mut freed = 0;
        for (voxel, pairs) in &candidates {
            if !self.probe_hits(oracle, *voxel, pairs, threshold)? {
                continue;
            }
            if self.probe_hits(oracle, *voxel, &retained_pairs, threshold)? {
                continue;
            }
            if self.set_free(*voxel) {
                freed += 1;
            }
        }

        info!("Freed {} of {} candidate voxels", freed, candidates.len());
        Ok(freed)
    }

    /// Removes a single body. See [`VoxelGrid::remove_bodies`].
    ///
    /// # Errors
    ///
    /// See [`VoxelGrid::affected_voxels`].
    pub fn remove_body<O: CollisionOracle>(
        &mut self,
        oracle: &mut O,
        body: O::Body,
        threshold: f64,
    ) -> Result<usize> {
        self.remove_bodies(oracle, &[body], threshold)
    }
}

impl<T: Default> VoxelGrid<T> {
    /// Occupies free voxels whose probe intersects a link of `bodies`.
    /// Returns how many voxels became occupied.
    ///
    /// # Errors
    ///
    /// See [`VoxelGrid::affected_voxels`]. On error, voxels occupied so far
    /// stay occupied.
    pub fn add_bodies<O: CollisionOracle>(
        &mut self,
        oracle: &mut O,
        bodies: &[O::Body],
        threshold: f64,
    ) -> Result<usize> {
        let candidates = self.affected_voxels(oracle, bodies, false)?;
        debug!(
            "Testing {} free voxels against {} bodies",
            candidates.len(),
            bodies.len()
        );

        let mut added = 0;
        for (voxel, pairs) in &candidates {
            if self.probe_hits(oracle, *voxel, pairs, threshold)? && self.set_occupied(*voxel) {
                added += 1;
            }
        }

        info!("Occupied {} of {} candidate voxels", added, candidates.len());
        Ok(added)
    }

    /// Adds a single body. See [`VoxelGrid::add_bodies`].
    ///
    /// # Errors
    ///
    /// See [`VoxelGrid::affected_voxels`].
    pub fn add_body<O: CollisionOracle>(
        &mut self,
        oracle: &mut O,
        body: O::Body,
        threshold: f64,
    ) -> Result<usize> {
        self.add_bodies(oracle, &[body], threshold)
    }
}
