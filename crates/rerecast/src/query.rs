//! Runtime queries over a [`crate::NavMesh`]: pathfinding, string-pulling,
//! moving along the surface, and random point sampling.

mod astar;
mod funnel;
mod move_along_surface;
mod random_point;

use alloc::vec::Vec;
use bitflags::bitflags;
use glam::Vec3;
use thiserror::Error;

use crate::navmesh::NodeRef;
use crate::span::AreaType;

pub use astar::FindPathResult;
pub use move_along_surface::MoveAlongSurfaceResult;
pub use random_point::RandomPointError;

/// Filters which polygons a query is allowed to cross, and the cost of
/// crossing them.
///
/// Implementations are cheap to call many times per query; [`NoOpQueryFilter`]
/// is the default when no filtering is needed.
pub trait QueryFilter {
    /// Whether a polygon (or off-mesh connection) of the given area and
    /// flags may be entered at all.
    fn pass_filter(&self, area: AreaType, flags: u16) -> bool;

    /// The cost of moving in a straight line from `from` to `to` across a
    /// polygon of area `area`. Defaults to Euclidean distance.
    fn cost(&self, from: Vec3, to: Vec3, area: AreaType) -> f32 {
        let _ = area;
        from.distance(to)
    }
}

/// A [`QueryFilter`] that allows every walkable area and costs by distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpQueryFilter;

impl QueryFilter for NoOpQueryFilter {
    fn pass_filter(&self, area: AreaType, _flags: u16) -> bool {
        area.is_walkable()
    }
}

bitflags! {
    /// Flags describing why a [`StraightPathPoint`] is a corner in a
    /// straight path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StraightPathPointFlags: u8 {
        /// The first point of the path.
        const START = 1 << 0;
        /// The last point of the path.
        const END = 1 << 1;
        /// A forced corner at an off-mesh connection endpoint: the path
        /// must pass through this exact point rather than the funnel's
        /// taut-string shortcut.
        const OFFMESH_CONNECTION = 1 << 2;
    }
}

/// One corner of a [`StraightPath`].
#[derive(Debug, Clone, Copy)]
pub struct StraightPathPoint {
    /// World-space position of this corner.
    pub position: Vec3,
    /// Why this point is present in the straight path.
    pub flags: StraightPathPointFlags,
    /// The node this corner sits on (or leads into, for the last point).
    pub node_ref: NodeRef,
}

/// A taut, corner-to-corner path through a sequence of polygons, produced by
/// funnelling a polygon path down to its string-pulled shortest route.
#[derive(Debug, Clone, Default)]
pub struct StraightPath {
    /// The corners of the path, in travel order.
    pub points: Vec<StraightPathPoint>,
}

/// Errors from query-module entry points that aren't represented as an
/// empty/partial result.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// No polygon was found near the requested point within its search extents.
    #[error("no polygon found near the given point within the search extents")]
    NoNearbyPolygon,
    /// The given node reference is stale or was never valid.
    #[error("stale or invalid node reference")]
    StaleRef,
}
