//! Node and NodeRef: the vertices of the polygon graph a [`super::NavMesh`] query walks.

use alloc::vec::Vec;
use glam::Vec3;

use crate::{AreaType, tile::TileId};

/// Bit of [`NodeRef::poly_index`] (and [`Node::poly_index`]) marking an
/// off-mesh connection endpoint rather than an ordinary polygon. Keeps both
/// kinds in a single encoding, per-tile node arena.
pub const OFF_MESH_BIT: u16 = 0x8000;

/// Tag distinguishing an ordinary polygon node from an off-mesh connection
/// endpoint node. Redundant with [`NodeRef`]'s high bit, kept on [`Node`]
/// itself so callers don't have to re-derive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An ordinary polygon of a tile's [`crate::PolygonNavmesh`].
    Poly,
    /// One endpoint of an off-mesh connection, allocated into the owning
    /// polygon's tile.
    OffMesh,
}

/// A stable, opaque reference to a [`Node`]: `(salt, tile_id, poly_index)`
/// packed into a `u64`. `poly_index`'s top bit ([`OFF_MESH_BIT`]) marks an
/// off-mesh node; the low 15 bits then index into the tile's off-mesh node
/// arena instead of its polygon arena.
///
/// `salt` is bumped every time a tile slot is reused, so a `NodeRef` minted
/// before a [`super::NavMesh::remove_tile`] call is rejected by every query
/// issued after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRef(pub u64);

impl NodeRef {
    /// The null reference: matches no real node. `salt` `0` is never minted
    /// for a real tile slot, so this never aliases a live node.
    pub const NONE: NodeRef = NodeRef(0);

    /// Packs a `(salt, tile_id, poly_index)` triple into a `NodeRef`.
    pub fn new(salt: u32, tile_id: TileId, poly_index: u16) -> Self {
        NodeRef(((salt as u64) << 32) | ((tile_id.0 as u64) << 16) | poly_index as u64)
    }

    /// The salt this ref was minted with.
    pub fn salt(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The tile slot this ref points into.
    pub fn tile_id(&self) -> TileId {
        TileId((self.0 >> 16) as u16)
    }

    /// The raw poly/off-mesh slot, including the [`OFF_MESH_BIT`] tag.
    pub fn poly_index(&self) -> u16 {
        self.0 as u16
    }

    /// True if this ref points at an off-mesh node.
    pub fn is_off_mesh(&self) -> bool {
        self.poly_index() & OFF_MESH_BIT != 0
    }

    /// The index into the relevant arena (polygon or off-mesh), with the
    /// [`OFF_MESH_BIT`] tag stripped.
    pub fn index(&self) -> u16 {
        self.poly_index() & !OFF_MESH_BIT
    }

    /// True if this is the null reference.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

/// One vertex of the polygon graph a [`super::NavMesh`] query walks: either
/// an ordinary polygon or one endpoint of an off-mesh connection.
#[derive(Debug, Clone)]
pub struct Node {
    /// Whether this is a polygon or an off-mesh connection endpoint.
    pub kind: NodeKind,
    /// The tile this node belongs to.
    pub tile_id: TileId,
    /// For [`NodeKind::Poly`], the index into the tile's `PolygonNavmesh`.
    /// For [`NodeKind::OffMesh`], the index into the tile's off-mesh node
    /// arena (neither carries the [`OFF_MESH_BIT`] tag; that only appears on
    /// [`NodeRef`]).
    pub poly_index: u16,
    /// The area type inherited from the polygon (or the off-mesh
    /// connection's `area`).
    pub area: AreaType,
    /// User/filter flags, inherited from the polygon (or off-mesh
    /// connection).
    pub flags: u16,
    /// World-space representative position: the polygon's centroid, or the
    /// off-mesh connection endpoint this node sits at.
    pub position: Vec3,
    /// Indices into the owning tile's link arena for every link leaving
    /// this node.
    pub links: Vec<u32>,
}

impl Node {
    /// The [`NodeRef`] that refers to this node, given the owning tile's
    /// current salt.
    pub fn node_ref(&self, salt: u32) -> NodeRef {
        let index = match self.kind {
            NodeKind::Poly => self.poly_index,
            NodeKind::OffMesh => self.poly_index | OFF_MESH_BIT,
        };
        NodeRef::new(salt, self.tile_id, index)
    }
}
