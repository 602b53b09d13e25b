//! Top-level construction entry points: [`generate_solo_navmesh`] builds a
//! single-tile [`NavMesh`] straight from a triangle soup, and
//! [`generate_tiled_navmesh`] drives [`TiledNavmeshConfig`] and assembles the
//! resulting tiles into one queryable mesh.

use thiserror::Error;

use crate::{
    CompactHeightfieldError, Config, DetailMeshError, HeightfieldBuilder, HeightfieldBuilderError,
    NavMesh, NavMeshError, PolyMeshError, RasterizationError, RegionBuildError, Tile,
    TileBuildError, TiledNavmeshConfig, TiledNavmeshError, TriMesh,
};

/// Errors from [`generate_solo_navmesh`] and [`generate_tiled_navmesh`]: any
/// pipeline stage's error, unified behind one type so callers don't have to
/// match on which stage failed just to propagate it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NavMeshGenerationError {
    /// Failed to allocate the heightfield.
    #[error(transparent)]
    Heightfield(#[from] HeightfieldBuilderError),
    /// Failed to rasterize the input triangles.
    #[error(transparent)]
    Rasterization(#[from] RasterizationError),
    /// Failed to compact the heightfield.
    #[error(transparent)]
    CompactHeightfield(#[from] CompactHeightfieldError),
    /// Failed to partition the compact heightfield into regions.
    #[error(transparent)]
    Region(#[from] RegionBuildError),
    /// Failed to triangulate contours into a polygon mesh.
    #[error(transparent)]
    PolyMesh(#[from] PolyMeshError),
    /// Failed to sample the detail mesh.
    #[error(transparent)]
    DetailMesh(#[from] DetailMeshError),
    /// The polygon and detail meshes disagreed on submesh count.
    #[error(transparent)]
    Tile(#[from] TileBuildError),
    /// Failed to insert a built tile into the navmesh.
    #[error(transparent)]
    NavMesh(#[from] NavMeshError),
    /// A tiled generation stage failed.
    #[error(transparent)]
    Tiled(#[from] TiledNavmeshError),
}

/// Builds a single-tile [`NavMesh`] covering `config.aabb` from `trimesh`.
///
/// Runs the full construction pipeline — rasterization, filtering,
/// compaction, erosion, area marking, the watershed distance field, region
/// partitioning, contour tracing, polygon meshing and detail meshing — then
/// wraps the result as the lone tile of a fresh navmesh at slot `(0, 0, 0)`.
///
/// Use [`generate_tiled_navmesh`] instead when `config.tiling` is set.
pub fn generate_solo_navmesh(
    trimesh: &TriMesh,
    config: &Config,
) -> Result<NavMesh, NavMeshGenerationError> {
    let mut trimesh = trimesh.clone();
    trimesh.mark_walkable_triangles(config.walkable_slope_angle);

    let mut heightfield = HeightfieldBuilder {
        aabb: config.aabb,
        cell_size: config.cell_size,
        cell_height: config.cell_height,
    }
    .build()?;

    heightfield.populate_from_trimesh(trimesh, config.walkable_height, config.walkable_climb)?;

    let mut compact_heightfield =
        heightfield.into_compact(config.walkable_height, config.walkable_climb)?;
    for volume in &config.area_volumes {
        compact_heightfield.mark_convex_poly_area(volume);
    }
    compact_heightfield.erode_walkable_area(config.walkable_radius);
    compact_heightfield.build_distance_field();
    compact_heightfield.build_regions(
        config.border_size,
        config.min_region_area,
        config.merge_region_area,
    )?;

    let contours = compact_heightfield.build_contours(
        config.max_simplification_error,
        config.max_edge_len,
        config.contour_flags,
    );
    let poly_mesh = contours.into_polygon_mesh(config.max_vertices_per_polygon)?;
    let detail_mesh = crate::DetailNavmesh::new(
        &poly_mesh,
        &compact_heightfield,
        config.detail_sample_dist,
        config.detail_sample_max_error,
    )?;

    let tile = Tile::build(poly_mesh, detail_mesh)?;

    let tile_width = config.aabb.max.x - config.aabb.min.x;
    let tile_depth = config.aabb.max.z - config.aabb.min.z;
    let mut navmesh = NavMesh::new(config.aabb.min, tile_width, tile_depth);
    navmesh.add_tile(tile, 0, 0, 0)?;
    Ok(navmesh)
}

/// Builds a tiled [`NavMesh`] from `trimesh` via `tiled_config`, assembling
/// every generated tile (parallel if the `parallel` feature is enabled) into
/// one queryable mesh.
pub fn generate_tiled_navmesh(
    trimesh: &TriMesh,
    tiled_config: &TiledNavmeshConfig,
) -> Result<NavMesh, NavMeshGenerationError> {
    let config = &tiled_config.config;
    let tile_world_size = config.tile_size as f32 * config.cell_size;
    let mut navmesh = NavMesh::new(config.aabb.min, tile_world_size, tile_world_size);

    for navmesh_tile in tiled_config.generate_tiles(trimesh)? {
        let tile = Tile::build(navmesh_tile.poly_mesh, navmesh_tile.detail_mesh)?;
        navmesh.add_tile(tile, navmesh_tile.coord.x as i32, navmesh_tile.coord.z as i32, 0)?;
    }

    Ok(navmesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, ConfigBuilder};
    use alloc::vec::Vec;
    use glam::{UVec3, Vec3, Vec3A};

    fn flat_square_trimesh(size: f32) -> TriMesh {
        let vertices = alloc::vec![
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(size, 0.0, 0.0),
            Vec3A::new(size, 0.0, size),
            Vec3A::new(0.0, 0.0, size),
        ];
        let indices = alloc::vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)];
        TriMesh {
            vertices,
            indices,
            area_types: Vec::new(),
        }
    }

    #[test]
    fn generate_solo_navmesh_builds_one_walkable_tile() {
        let trimesh = flat_square_trimesh(10.0);
        let config = ConfigBuilder {
            aabb: crate::Aabb3d::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(11.0, 1.0, 11.0)),
            cell_size: 0.3,
            cell_height: 0.2,
            ..ConfigBuilder::default()
        }
        .build();

        let navmesh = generate_solo_navmesh(&trimesh, &config).unwrap();
        assert_eq!(navmesh.tile_count(), 1);

        let slot = navmesh.tile_slot(crate::tile::TileId(0)).unwrap();
        assert!(slot.tile.polygon_count() > 0);
        assert!(slot
            .tile
            .poly_mesh
            .area_types
            .iter()
            .any(|a| *a == AreaType::DEFAULT_WALKABLE));
    }

    #[test]
    fn generate_tiled_navmesh_assembles_every_tile() {
        let trimesh = flat_square_trimesh(20.0);
        let builder = ConfigBuilder {
            aabb: crate::Aabb3d::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(21.0, 1.0, 21.0)),
            cell_size: 0.3,
            cell_height: 0.2,
            tiling: true,
            tile_size: 16,
            ..ConfigBuilder::default()
        };
        let config = builder.build();
        let tiled_config = TiledNavmeshConfig::new(config).unwrap();

        let navmesh = generate_tiled_navmesh(&trimesh, &tiled_config).unwrap();
        assert_eq!(navmesh.tile_count(), tiled_config.tile_count());
    }
}
