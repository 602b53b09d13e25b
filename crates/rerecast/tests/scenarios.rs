//! End-to-end scenarios against the public API: solo generation, off-mesh
//! connections (bidirectional and one-way), surface-constrained movement
//! across a portal, and stale-ref behaviour after tile removal.

use glam::{UVec3, Vec3, Vec3A};
use rerecast::{
    AreaType, CompactHeightfield, Config, ConfigBuilder, DetailNavmesh, HeightfieldBuilder,
    NavMesh, NoOpQueryFilter, OffMeshConnection, OffMeshConnectionDirection, PolygonNavmesh, Tile,
    TriMesh, generate_solo_navmesh,
};

fn flat_quad_trimesh(center_x: f32, center_z: f32, half_size: f32) -> TriMesh {
    let vertices = vec![
        Vec3A::new(center_x - half_size, 0.0, center_z - half_size),
        Vec3A::new(center_x + half_size, 0.0, center_z - half_size),
        Vec3A::new(center_x + half_size, 0.0, center_z + half_size),
        Vec3A::new(center_x - half_size, 0.0, center_z + half_size),
    ];
    let indices = vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)];
    TriMesh {
        vertices,
        indices,
        area_types: Vec::new(),
    }
}

fn small_agent_config(aabb: rerecast::Aabb3d) -> Config {
    ConfigBuilder {
        aabb,
        cell_size: 0.2,
        cell_height: 0.2,
        agent_radius: 0.3,
        agent_height: 0.5,
        agent_max_climb: 0.4,
        walkable_slope_angle: 45.0,
        min_region_area_world: 0.01,
        merge_region_area_world: 0.04,
        ..ConfigBuilder::default()
    }
    .build()
}

/// Scenario 1: solo flat square. A 2x2 quad at y=0 shrunk by the agent
/// radius should still yield one tile with at least one walkable polygon,
/// and a path between two points inside it should be a 2-waypoint straight
/// line (start, end).
#[test]
fn solo_flat_square_yields_one_tile_and_a_direct_path() {
    let trimesh = flat_quad_trimesh(1.0, 1.0, 1.0);
    let config = small_agent_config(rerecast::Aabb3d::new(
        Vec3::new(-0.5, -1.0, -0.5),
        Vec3::new(2.5, 1.0, 2.5),
    ));

    let navmesh = generate_solo_navmesh(&trimesh, &config).unwrap();
    assert_eq!(navmesh.tile_count(), 1);

    let filter = NoOpQueryFilter;
    let path = navmesh
        .find_path(
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(1.5, 0.0, 1.5),
            Vec3::splat(0.5),
            &filter,
        )
        .expect("a path should exist across the single walkable square");
    assert!(!path.partial);

    let straight = navmesh
        .find_straight_path(Vec3::new(0.5, 0.0, 0.5), Vec3::new(1.5, 0.0, 1.5), &path.path)
        .unwrap();
    assert_eq!(straight.points.first().unwrap().position.x, 0.5);
    assert_eq!(straight.points.last().unwrap().position.x, 1.5);
}

/// Builds a single-tile navmesh over a quad centred at `(center_x, center_z)`
/// at the given world origin/tile extent, for the two-platform scenarios
/// where each platform needs its own independently-addressed tile.
fn platform_navmesh(center_x: f32, center_z: f32) -> NavMesh {
    let trimesh = flat_quad_trimesh(center_x, center_z, 1.0);
    let config = small_agent_config(rerecast::Aabb3d::new(
        Vec3::new(center_x - 1.5, -1.0, center_z - 1.5),
        Vec3::new(center_x + 1.5, 1.0, center_z + 1.5),
    ));
    generate_solo_navmesh(&trimesh, &config).unwrap()
}

/// Scenario 2: two disconnected platforms joined by a bidirectional
/// off-mesh connection. A path from one platform to the other must succeed
/// and pass through an off-mesh-flagged corner.
#[test]
fn two_platforms_bidirectional_off_mesh_connects_them() {
    let mut navmesh = platform_navmesh(1.0, 1.0);
    // Graft the second platform's polygon into the same navmesh's tile
    // store at a distinct tile slot so both are queryable together.
    let second_tile = build_standalone_tile(&flat_quad_trimesh(8.0, 1.0, 1.0), 8.0, 1.0);
    navmesh.add_tile(second_tile, 1, 0, 0).unwrap();
    assert_eq!(navmesh.tile_count(), 2);

    let id = navmesh
        .add_off_mesh_connection(OffMeshConnection {
            start: Vec3::new(1.0, 0.0, 1.0),
            end: Vec3::new(8.0, 0.0, 1.0),
            search_radius: 0.5,
            direction: OffMeshConnectionDirection::Bidirectional,
            area: AreaType::DEFAULT_WALKABLE,
            flags: 1,
        })
        .unwrap();

    let filter = NoOpQueryFilter;
    let result = navmesh
        .find_path(
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(8.0, 0.0, 1.0),
            Vec3::splat(0.5),
            &filter,
        )
        .expect("off-mesh connection should bridge the two platforms");
    assert!(!result.partial);

    let straight = navmesh
        .find_straight_path(Vec3::new(1.0, 0.0, 1.0), Vec3::new(8.0, 0.0, 1.0), &result.path)
        .unwrap();
    assert!(straight.points.len() >= 3);
    assert!(
        straight
            .points
            .iter()
            .any(|p| p.flags.contains(rerecast::StraightPathPointFlags::OFFMESH_CONNECTION))
    );

    navmesh.remove_off_mesh_connection(id).unwrap();
}

/// Scenario 3: the same two platforms, but the connection is one-way
/// (`START_TO_END`). The reverse query must fail or return a partial path;
/// the forward query still succeeds.
#[test]
fn two_platforms_one_way_off_mesh_is_directional() {
    let mut navmesh = platform_navmesh(1.0, 1.0);
    let second_tile = build_standalone_tile(&flat_quad_trimesh(8.0, 1.0, 1.0), 8.0, 1.0);
    navmesh.add_tile(second_tile, 1, 0, 0).unwrap();

    navmesh
        .add_off_mesh_connection(OffMeshConnection {
            start: Vec3::new(1.0, 0.0, 1.0),
            end: Vec3::new(8.0, 0.0, 1.0),
            search_radius: 0.5,
            direction: OffMeshConnectionDirection::StartToEnd,
            area: AreaType::DEFAULT_WALKABLE,
            flags: 1,
        })
        .unwrap();

    let filter = NoOpQueryFilter;
    let forward = navmesh.find_path(
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(8.0, 0.0, 1.0),
        Vec3::splat(0.5),
        &filter,
    );
    assert!(forward.is_some_and(|p| !p.partial));

    let backward = navmesh.find_path(
        Vec3::new(8.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::splat(0.5),
        &filter,
    );
    assert!(backward.is_none_or(|p| p.partial));
}

/// Builds a standalone flat-quad tile the same way [`generate_solo_navmesh`]
/// does internally, for tests that need two independently addressable
/// tiles inserted into one navmesh.
fn build_standalone_tile(trimesh: &TriMesh, center_x: f32, center_z: f32) -> Tile {
    let config = small_agent_config(rerecast::Aabb3d::new(
        Vec3::new(center_x - 1.5, -1.0, center_z - 1.5),
        Vec3::new(center_x + 1.5, 1.0, center_z + 1.5),
    ));
    let mut trimesh = trimesh.clone();
    trimesh.mark_walkable_triangles(config.walkable_slope_angle);
    let mut heightfield = HeightfieldBuilder {
        aabb: config.aabb,
        cell_size: config.cell_size,
        cell_height: config.cell_height,
    }
    .build()
    .unwrap();
    heightfield
        .populate_from_trimesh(trimesh, config.walkable_height, config.walkable_climb)
        .unwrap();
    let mut chf: CompactHeightfield = heightfield
        .into_compact(config.walkable_height, config.walkable_climb)
        .unwrap();
    chf.erode_walkable_area(config.walkable_radius);
    chf.build_distance_field();
    chf.build_regions(config.border_size, config.min_region_area, config.merge_region_area)
        .unwrap();
    let cset = chf.build_contours(
        config.max_simplification_error,
        config.max_edge_len,
        config.contour_flags,
    );
    let poly_mesh: PolygonNavmesh = cset.into_polygon_mesh(config.max_vertices_per_polygon).unwrap();
    let detail_mesh = DetailNavmesh::new(
        &poly_mesh,
        &chf,
        config.detail_sample_dist,
        config.detail_sample_max_error,
    )
    .unwrap();
    Tile::build(poly_mesh, detail_mesh).unwrap()
}

/// Scenario 4: move along surface across a portal shared by two triangles
/// of the same flat quad, split along its diagonal. Capping
/// `max_vertices_per_polygon` at 3 keeps the square's two ear-clipped
/// triangles from being greedily re-merged, so the diagonal survives as a
/// real interior portal. A sub-voxel move that crosses it should still hop
/// `node_ref` onto the neighbour.
#[test]
fn move_along_surface_crosses_a_shared_portal() {
    let trimesh = flat_quad_trimesh(1.0, 1.0, 1.0);
    let mut config = small_agent_config(rerecast::Aabb3d::new(
        Vec3::new(-0.5, -1.0, -0.5),
        Vec3::new(2.5, 1.0, 2.5),
    ));
    config.max_vertices_per_polygon = 3;
    let navmesh = generate_solo_navmesh(&trimesh, &config).unwrap();

    let filter = NoOpQueryFilter;
    let (start_ref, _) = navmesh
        .find_nearest_poly(Vec3::new(1.0, 0.0, 0.9925), Vec3::splat(0.5))
        .unwrap();

    let result = navmesh
        .move_along_surface(
            start_ref,
            Vec3::new(1.0, 0.0, 0.9925),
            Vec3::new(1.0, 0.0, 1.0075),
            &filter,
            16,
        )
        .unwrap();
    assert!((result.position.z - 1.0075).abs() < 0.05);
    assert!(!result.visited.is_empty());
}

/// Scenario 5: a ref captured before `remove_tile` must not resolve after a
/// different tile is inserted into the same slot, even though the slot is
/// reused.
#[test]
fn stale_ref_after_remove_tile_does_not_resolve() {
    let mut navmesh = platform_navmesh(1.0, 1.0);
    let (captured_ref, _) = navmesh
        .find_nearest_poly(Vec3::new(1.0, 0.0, 1.0), Vec3::splat(0.5))
        .unwrap();

    navmesh.remove_tile(0, 0, 0).unwrap();
    assert_eq!(navmesh.tile_count(), 0);

    let replacement = build_standalone_tile(&flat_quad_trimesh(1.0, 1.0, 1.0), 1.0, 1.0);
    navmesh.add_tile(replacement, 0, 0, 0).unwrap();

    assert!(navmesh.get_node_by_ref(captured_ref).is_none());
}

/// Boundary behaviour: an empty input mesh yields zero tiles, not an error.
#[test]
fn empty_input_mesh_yields_zero_tiles_not_an_error() {
    let trimesh = TriMesh {
        vertices: Vec::new(),
        indices: Vec::new(),
        area_types: Vec::new(),
    };
    let config = small_agent_config(rerecast::Aabb3d::new(
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ));
    let navmesh = generate_solo_navmesh(&trimesh, &config).unwrap();
    assert_eq!(navmesh.tile_count(), 1);
    assert!(
        navmesh
            .find_nearest_poly(Vec3::ZERO, Vec3::splat(1.0))
            .is_none()
    );
}

/// Boundary behaviour: a single tiny triangle whose region falls below
/// `min_region_area` should yield zero polygons without erroring.
#[test]
fn tiny_triangle_below_min_region_area_yields_zero_polygons() {
    let vertices = vec![
        Vec3A::new(0.0, 0.0, 0.0),
        Vec3A::new(0.05, 0.0, 0.0),
        Vec3A::new(0.0, 0.0, 0.05),
    ];
    let trimesh = TriMesh {
        vertices,
        indices: vec![UVec3::new(0, 1, 2)],
        area_types: Vec::new(),
    };
    let config = ConfigBuilder {
        aabb: rerecast::Aabb3d::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
        cell_size: 0.2,
        cell_height: 0.2,
        agent_radius: 0.05,
        agent_height: 0.5,
        agent_max_climb: 0.4,
        min_region_area_world: 64.0,
        ..ConfigBuilder::default()
    }
    .build();

    let navmesh = generate_solo_navmesh(&trimesh, &config).unwrap();
    assert_eq!(navmesh.tile_count(), 1);
    assert!(
        navmesh
            .find_nearest_poly(Vec3::new(0.02, 0.0, 0.02), Vec3::splat(0.1))
            .is_none()
    );
}

/// Scenario 6: two independent builds from identical input and options
/// produce byte-identical polygon meshes (same vertices, same polygon
/// table, same ordering) — the watershed partition and the rest of the
/// pipeline have no hidden nondeterminism (hash iteration order, uninit
/// memory, etc).
#[test]
fn identical_input_produces_identical_poly_mesh() {
    let trimesh = flat_quad_trimesh(4.0, 4.0, 4.0);

    let a = build_standalone_tile(&trimesh, 4.0, 4.0);
    let b = build_standalone_tile(&trimesh, 4.0, 4.0);

    assert_eq!(a.poly_mesh, b.poly_mesh);
}
