//! Construction-time configuration.
//!
//! [`ConfigBuilder`] exposes the knobs a caller actually thinks in —
//! agent radius and height, world-space bounds — and derives the
//! voxel-unit [`Config`] the construction pipeline consumes.

use alloc::vec::Vec;

use crate::{Aabb3d, BuildContoursFlags, ConvexVolume, math::ops::ceil};

/// Every recognised construction option, in the voxel/world units the
/// pipeline stages actually consume. Build one with [`ConfigBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// World-space bounds the heightfield should cover.
    pub aabb: Aabb3d,
    /// XZ voxel size, in world units.
    pub cell_size: f32,
    /// Y voxel size, in world units.
    pub cell_height: f32,
    /// Minimum vertical clearance a walkable span needs, in voxels.
    pub walkable_height: u16,
    /// Maximum vertical step an agent can climb, in voxels.
    pub walkable_climb: u16,
    /// Agent radius, in voxels. Used for erosion.
    pub walkable_radius: u16,
    /// Maximum walkable triangle slope, in degrees.
    pub walkable_slope_angle: f32,
    /// Rim of cells reserved for tile stitching, in voxels.
    pub border_size: u16,
    /// Regions smaller than this (in voxel cells) are dropped.
    pub min_region_area: u32,
    /// Regions smaller than this are merged into their largest neighbour.
    pub merge_region_area: u32,
    /// Douglas-Peucker threshold for contour simplification, in voxel units.
    pub max_simplification_error: f32,
    /// Long wall edges are subdivided past this length, in voxels. `0` disables it.
    pub max_edge_len: u16,
    /// Contour tessellation flags.
    pub contour_flags: BuildContoursFlags,
    /// Maximum vertices per output polygon, `3..=16`.
    pub max_vertices_per_polygon: u8,
    /// Detail-mesh sampling grid spacing, in world units. `0` disables interior sampling.
    pub detail_sample_dist: f32,
    /// Maximum deviation to accept a detail sample, in world units.
    pub detail_sample_max_error: f32,
    /// Whether the navmesh should be built as a grid of tiles.
    pub tiling: bool,
    /// Tile size, in voxels (only meaningful when `tiling` is set).
    pub tile_size: u16,
    /// Convex volumes to stamp onto the compact heightfield before erosion.
    pub area_volumes: Vec<ConvexVolume>,
}

/// Builder for [`Config`], taking agent-centric world-space parameters and
/// deriving the voxel-unit values the pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBuilder {
    /// World-space bounds the heightfield should cover.
    pub aabb: Aabb3d,
    /// XZ voxel size, in world units.
    pub cell_size: f32,
    /// Y voxel size, in world units.
    pub cell_height: f32,
    /// Agent radius, in world units.
    pub agent_radius: f32,
    /// Agent height (minimum clearance), in world units.
    pub agent_height: f32,
    /// Maximum vertical step the agent can climb, in world units.
    pub agent_max_climb: f32,
    /// Maximum walkable triangle slope, in degrees.
    pub walkable_slope_angle: f32,
    /// Rim of cells reserved for tile stitching, in voxels.
    pub border_size: u16,
    /// Regions smaller than this, in world-space area units, are dropped.
    pub min_region_area_world: f32,
    /// Regions smaller than this, in world-space area units, are merged.
    pub merge_region_area_world: f32,
    /// Douglas-Peucker threshold, in world units.
    pub max_simplification_error: f32,
    /// Long wall edges are subdivided past this length, in world units. `0` disables it.
    pub max_edge_len_world: f32,
    /// Contour tessellation flags.
    pub contour_flags: BuildContoursFlags,
    /// Maximum vertices per output polygon, `3..=16`.
    pub max_vertices_per_polygon: u8,
    /// Detail-mesh sampling grid spacing, in world units. `0` disables interior sampling.
    pub detail_sample_dist: f32,
    /// Maximum deviation to accept a detail sample, in world units.
    pub detail_sample_max_error: f32,
    /// Whether the navmesh should be built as a grid of tiles.
    pub tiling: bool,
    /// Tile size, in voxels (only meaningful when `tiling` is set).
    pub tile_size: u16,
    /// Convex volumes to stamp onto the compact heightfield before erosion.
    pub area_volumes: Vec<ConvexVolume>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            aabb: Aabb3d::default(),
            cell_size: 0.3,
            cell_height: 0.2,
            agent_radius: 0.6,
            agent_height: 2.0,
            agent_max_climb: 0.9,
            walkable_slope_angle: 45.0,
            border_size: 0,
            min_region_area_world: 8.0 * 8.0,
            merge_region_area_world: 20.0 * 20.0,
            max_simplification_error: 1.3,
            max_edge_len_world: 12.0,
            contour_flags: BuildContoursFlags::default(),
            max_vertices_per_polygon: 6,
            detail_sample_dist: 6.0,
            detail_sample_max_error: 1.0,
            tiling: false,
            tile_size: 32,
            area_volumes: Vec::new(),
        }
    }
}

impl ConfigBuilder {
    /// Derives a voxel-unit [`Config`] from this agent-centric builder.
    pub fn build(self) -> Config {
        let walkable_height = ceil(self.agent_height / self.cell_height) as u16;
        let walkable_climb = ceil(self.agent_max_climb / self.cell_height) as u16;
        let walkable_radius = ceil(self.agent_radius / self.cell_size) as u16;
        let max_edge_len = ceil(self.max_edge_len_world / self.cell_size) as u16;
        let min_region_area =
            ceil(self.min_region_area_world / (self.cell_size * self.cell_size)) as u32;
        let merge_region_area =
            ceil(self.merge_region_area_world / (self.cell_size * self.cell_size)) as u32;
        let max_simplification_error = self.max_simplification_error / self.cell_size;

        Config {
            aabb: self.aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            walkable_height,
            walkable_climb,
            walkable_radius,
            walkable_slope_angle: self.walkable_slope_angle,
            border_size: self.border_size,
            min_region_area,
            merge_region_area,
            max_simplification_error,
            max_edge_len,
            contour_flags: self.contour_flags,
            max_vertices_per_polygon: self.max_vertices_per_polygon,
            detail_sample_dist: self.detail_sample_dist,
            detail_sample_max_error: self.detail_sample_max_error,
            tiling: self.tiling,
            tile_size: self.tile_size,
            area_volumes: self.area_volumes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn build_derives_voxel_units() {
        let config = ConfigBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0)),
            agent_radius: 0.6,
            agent_height: 2.0,
            ..Default::default()
        }
        .build();
        assert!(config.walkable_radius >= 2);
        assert!(config.walkable_height >= 10);
    }

    #[test]
    fn default_has_sane_region_areas() {
        let config = ConfigBuilder::default().build();
        assert!(config.min_region_area > 0);
        assert!(config.merge_region_area > config.min_region_area);
    }
}
