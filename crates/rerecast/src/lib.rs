#![doc = include_str!("../../../readme.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod compact_cell;
mod compact_heightfield;
mod compact_span;
mod config;
mod contours;
mod detail_mesh;
mod generate;
mod heightfield;
mod mark_area;
mod mark_convex_poly_area;
pub(crate) mod math;
mod navmesh;
mod poly_mesh;
mod pre_filter;
pub mod query;
mod rasterize;
mod region;
mod span;
mod tile;
mod tiled_navmesh;
mod trimesh;
mod watershed_distance_field;

pub use compact_cell::CompactCell;
pub use compact_heightfield::{CompactHeightfield, CompactHeightfieldError};
pub use compact_span::{CompactSpan, NOT_CONNECTED};
pub use config::{Config, ConfigBuilder};
pub use contours::{BuildContoursFlags, Contour, ContourSet};
pub use detail_mesh::{DetailMeshError, DetailNavmesh, SubMesh};
pub use generate::{generate_solo_navmesh, generate_tiled_navmesh, NavMeshGenerationError};
pub use heightfield::{Heightfield, HeightfieldBuilder, HeightfieldBuilderError, RasterizationError};
pub use mark_convex_poly_area::ConvexVolume;
pub use math::{Aabb2d, Aabb3d};
pub(crate) use math::ops;
pub use navmesh::{
    Link, LinkSide, Node, NodeKind, NodeRef, NavMesh, NavMeshError, OffMeshConnection,
    OffMeshConnectionDirection, OffMeshConnectionId,
};
pub use poly_mesh::{PolyMeshError, PolygonNavmesh, EXTERNAL_LINK, NULL_INDEX};
pub use query::{
    FindPathResult, MoveAlongSurfaceResult, NoOpQueryFilter, QueryFilter, RandomPointError,
    StraightPath, StraightPathPoint, StraightPathPointFlags,
};
pub use region::{Region, RegionBuildError};
pub use span::{AreaType, Span, SpanKey};
pub use tile::{BvNode, Tile, TileBuildError, TileId};
pub use tiled_navmesh::{NavmeshTile, TileCoord, TiledNavmeshConfig, TiledNavmeshError};
pub use trimesh::TriMesh;

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(feature = "std")]
#[allow(unused_imports)]
use std::vec;
