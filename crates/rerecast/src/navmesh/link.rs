//! Links: directed edges of the polygon graph, either an ordinary
//! neighbour-polygon portal, a cross-tile portal, or one hop of an off-mesh
//! connection.

use super::node::NodeRef;

/// Which side of a polygon a [`Link`] crosses. The four cardinal directions
/// match [`crate::math::dir_offset_x`]'s winding; `OffMesh` marks a hop onto
/// or off an off-mesh connection rather than a polygon edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    /// `-X` tile border.
    NegX,
    /// `+Z` tile border.
    PosZ,
    /// `+X` tile border.
    PosX,
    /// `-Z` tile border.
    NegZ,
    /// An off-mesh connection hop, not a polygon edge.
    OffMesh,
}

impl LinkSide {
    /// Maps a grid direction (`0..=3`, see [`crate::math::dir_offset_x`])
    /// to its corresponding side.
    pub fn from_dir(dir: u16) -> Self {
        match dir & 0x3 {
            0 => LinkSide::NegX,
            1 => LinkSide::PosZ,
            2 => LinkSide::PosX,
            _ => LinkSide::NegZ,
        }
    }

    /// The side a neighbour tile sees this link from.
    pub fn opposite(self) -> Self {
        match self {
            LinkSide::NegX => LinkSide::PosX,
            LinkSide::PosX => LinkSide::NegX,
            LinkSide::PosZ => LinkSide::NegZ,
            LinkSide::NegZ => LinkSide::PosZ,
            LinkSide::OffMesh => LinkSide::OffMesh,
        }
    }

    /// The `(dx, dz)` tile-grid offset to the neighbour tile on this side.
    pub fn tile_offset(self) -> (i32, i32) {
        match self {
            LinkSide::NegX => (-1, 0),
            LinkSide::PosX => (1, 0),
            LinkSide::PosZ => (0, 1),
            LinkSide::NegZ => (0, -1),
            LinkSide::OffMesh => (0, 0),
        }
    }
}

/// A directed edge of the polygon graph: a portal from one node to another,
/// with enough geometry to reconstruct the crossing point during a funnel
/// pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// The node this link leaves from.
    pub from: NodeRef,
    /// The node this link arrives at.
    pub to: NodeRef,
    /// For a polygon link, the edge index on `from`'s polygon this portal
    /// crosses. Unused (`0`) for off-mesh hops.
    pub edge: u8,
    /// Which side of `from`'s polygon this link crosses.
    pub side: LinkSide,
    /// Portal overlap interval, quantized to `0..=255` along the shared
    /// edge. `0..=255` for an internal (same-tile) link; a sub-range for a
    /// cross-tile link whose neighbour only partially overlaps the edge.
    pub bmin: u8,
    /// See [`Link::bmin`].
    pub bmax: u8,
}
