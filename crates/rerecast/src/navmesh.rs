//! The tile-based NavMesh runtime: a store of [`Tile`]s stitched into a
//! single polygon graph of [`Node`]s and [`Link`]s, with off-mesh
//! connections grafted in alongside.
//!
//! Construction (everything up through [`Tile`]) is pure and synchronous;
//! this module is the mutable runtime built from the construction
//! pipeline's output, the thing queries in [`crate::query`] actually walk.

mod link;
mod node;
mod off_mesh;

pub use link::{Link, LinkSide};
pub use node::{NodeKind, NodeRef, OFF_MESH_BIT};
pub use off_mesh::{OffMeshConnection, OffMeshConnectionDirection, OffMeshConnectionId};

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use glam::Vec3;
use thiserror::Error;

pub use node::Node;

use crate::poly_mesh::NULL_INDEX;
use crate::tile::{Tile, TileId};

/// Errors from [`NavMesh`] mutation and lookup.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NavMeshError {
    /// A tile is already present at the given `(tile_x, tile_z, layer)` slot.
    #[error("tile slot ({tile_x}, {tile_z}, layer {layer}) is already occupied")]
    TileSlotOccupied {
        /// Tile grid X coordinate.
        tile_x: i32,
        /// Tile grid Z coordinate.
        tile_z: i32,
        /// Tile layer.
        layer: u8,
    },
    /// No tile is present at the given `(tile_x, tile_z, layer)` slot.
    #[error("no tile at slot ({tile_x}, {tile_z}, layer {layer})")]
    NoTileAtSlot {
        /// Tile grid X coordinate.
        tile_x: i32,
        /// Tile grid Z coordinate.
        tile_z: i32,
        /// Tile layer.
        layer: u8,
    },
    /// The given [`NodeRef`] no longer refers to a live node: its tile was
    /// removed (salt mismatch) or it was individually freed (off-mesh
    /// connection removal).
    #[error("stale node reference")]
    StaleRef,
    /// No polygon was found within the given search extents.
    #[error("no polygon found near the given point within the search extents")]
    NoNearbyPolygon,
    /// The given off-mesh connection id is unknown (never added, or already removed).
    #[error("unknown off-mesh connection id")]
    UnknownOffMeshConnection,
}

pub(crate) struct TileSlot {
    pub(crate) tile: Tile,
    pub(crate) salt: u32,
    pub(crate) coord: (i32, i32, u8),
    pub(crate) poly_nodes: Vec<Node>,
    pub(crate) off_mesh_nodes: Vec<Option<Node>>,
    pub(crate) free_off_mesh_nodes: Vec<u16>,
    pub(crate) links: Vec<Option<Link>>,
    pub(crate) free_links: Vec<u32>,
}

impl TileSlot {
    pub(crate) fn node(&self, poly_index: u16) -> Option<&Node> {
        if poly_index & OFF_MESH_BIT != 0 {
            self.off_mesh_nodes
                .get((poly_index & !OFF_MESH_BIT) as usize)
                .and_then(|n| n.as_ref())
        } else {
            self.poly_nodes.get(poly_index as usize)
        }
    }

    fn push_link(&mut self, link: Link) -> u32 {
        if let Some(free) = self.free_links.pop() {
            self.links[free as usize] = Some(link);
            free
        } else {
            self.links.push(Some(link));
            (self.links.len() - 1) as u32
        }
    }
}

/// A tile-based navmesh: a store of [`Tile`]s, stitched at their shared
/// borders into one polygon graph, plus off-mesh connections grafted across
/// tiles. Queries in [`crate::query`] are inherent methods of this type.
pub struct NavMesh {
    pub(crate) tiles: Vec<Option<TileSlot>>,
    /// Next salt to mint for slot `i`, kept alive across removal so a reused
    /// slot never repeats a salt a live [`NodeRef`] might still carry.
    pub(crate) slot_salts: Vec<u32>,
    pub(crate) free_tile_slots: Vec<u16>,
    pub(crate) tile_lookup: BTreeMap<(i32, i32, u8), u16>,
    pub(crate) off_mesh_connections: Vec<Option<off_mesh::OffMeshAttachment>>,
    pub(crate) off_mesh_generations: Vec<u16>,
    pub(crate) free_off_mesh_slots: Vec<u32>,
    /// World-space origin of tile `(0, 0)`.
    pub origin: Vec3,
    /// Tile width along X, in world units (excluding border rim).
    pub tile_width: f32,
    /// Tile width along Z, in world units (excluding border rim).
    pub tile_depth: f32,
}

impl NavMesh {
    /// Creates an empty navmesh. `tile_width`/`tile_depth` are used only to
    /// compute a neighbour's grid coordinate when searching for cross-tile
    /// portals; they must match the tile size used to build every tile
    /// subsequently added.
    pub fn new(origin: Vec3, tile_width: f32, tile_depth: f32) -> Self {
        NavMesh {
            tiles: Vec::new(),
            slot_salts: Vec::new(),
            free_tile_slots: Vec::new(),
            tile_lookup: BTreeMap::new(),
            off_mesh_connections: Vec::new(),
            off_mesh_generations: Vec::new(),
            free_off_mesh_slots: Vec::new(),
            origin,
            tile_width,
            tile_depth,
        }
    }

    /// Number of tiles currently present.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Adds `tile` at grid slot `(tile_x, tile_z, layer)`, stitching it to
    /// any already-present cardinal neighbour and allocating one [`Node`]
    /// per polygon.
    pub fn add_tile(
        &mut self,
        tile: Tile,
        tile_x: i32,
        tile_z: i32,
        layer: u8,
    ) -> Result<TileId, NavMeshError> {
        let coord = (tile_x, tile_z, layer);
        if self.tile_lookup.contains_key(&coord) {
            return Err(NavMeshError::TileSlotOccupied {
                tile_x,
                tile_z,
                layer,
            });
        }

        let poly_count = tile.polygon_count();
        let mut poly_nodes = Vec::with_capacity(poly_count);
        let (slot_index, slot_salt) = self.allocate_tile_slot();
        let tile_id = TileId(slot_index);

        for p in 0..poly_count {
            let area = tile.poly_mesh.area_types[p];
            let flags = if area.is_walkable() { 0x01 } else { 0x00 };
            poly_nodes.push(Node {
                kind: NodeKind::Poly,
                tile_id,
                poly_index: p as u16,
                area,
                flags,
                position: tile.polygon_centroid(p),
                links: Vec::new(),
            });
        }

        let slot = TileSlot {
            tile,
            salt: slot_salt,
            coord,
            poly_nodes,
            off_mesh_nodes: Vec::new(),
            free_off_mesh_nodes: Vec::new(),
            links: Vec::new(),
            free_links: Vec::new(),
        };
        self.tiles[slot_index as usize] = Some(slot);
        self.tile_lookup.insert(coord, slot_index);

        self.link_internal_edges(tile_id);
        self.stitch_neighbours(tile_id);

        #[cfg(feature = "tracing")]
        tracing::debug!(tile_x, tile_z, layer, polygons = poly_count, "added tile");

        Ok(tile_id)
    }

    /// Removes the tile at `(tile_x, tile_z, layer)`, bumping its slot's
    /// salt (invalidating every [`NodeRef`] minted for it) and pruning any
    /// link a neighbour tile held into it.
    pub fn remove_tile(&mut self, tile_x: i32, tile_z: i32, layer: u8) -> Result<(), NavMeshError> {
        let coord = (tile_x, tile_z, layer);
        let Some(&slot_index) = self.tile_lookup.get(&coord) else {
            return Err(NavMeshError::NoTileAtSlot {
                tile_x,
                tile_z,
                layer,
            });
        };

        for side in [LinkSide::NegX, LinkSide::PosX, LinkSide::PosZ, LinkSide::NegZ] {
            let (dx, dz) = side.tile_offset();
            let neighbour_coord = (tile_x + dx, tile_z + dz, layer);
            if let Some(&neighbour_index) = self.tile_lookup.get(&neighbour_coord) {
                self.prune_links_to_tile(neighbour_index, TileId(slot_index));
            }
        }

        self.tile_lookup.remove(&coord);
        self.tiles[slot_index as usize] = None;
        self.slot_salts[slot_index as usize] = self.slot_salts[slot_index as usize].wrapping_add(1).max(1);
        self.free_tile_slots.push(slot_index);

        #[cfg(feature = "tracing")]
        tracing::debug!(tile_x, tile_z, layer, "removed tile");

        Ok(())
    }

    /// Looks up the live [`Node`] a [`NodeRef`] points to, returning `None`
    /// if it's stale (tile removed, or the off-mesh node was individually freed).
    pub fn get_node_by_ref(&self, node_ref: NodeRef) -> Option<&Node> {
        let slot = self.tiles.get(node_ref.tile_id().0 as usize)?.as_ref()?;
        if slot.salt != node_ref.salt() {
            return None;
        }
        slot.node(node_ref.poly_index())
    }

    /// World-space representative position of a node (see [`Node::position`]).
    pub fn node_position(&self, node_ref: NodeRef) -> Option<Vec3> {
        self.get_node_by_ref(node_ref).map(|n| n.position)
    }

    /// World-space midpoint of the portal `link` represents, sliced by its
    /// `bmin`/`bmax` overlap range for a cross-tile link.
    pub fn edge_mid_point(&self, link: &Link) -> Option<Vec3> {
        if link.side == LinkSide::OffMesh {
            return self.node_position(link.to);
        }
        let from_node = self.get_node_by_ref(link.from)?;
        if from_node.kind == NodeKind::OffMesh {
            return self.node_position(link.to);
        }
        let slot = self.tile_slot(from_node.tile_id)?;
        let (indices, _) = slot.tile.poly_mesh.polygon(from_node.poly_index as usize);
        let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
        if n == 0 {
            return None;
        }
        let i = link.edge as usize % n;
        let a = slot.tile.world_vertex(indices[i]);
        let b = slot.tile.world_vertex(indices[(i + 1) % n]);
        let bmin = link.bmin as f32 / 255.0;
        let bmax = link.bmax as f32 / 255.0;
        Some(a.lerp(b, (bmin + bmax) * 0.5))
    }

    pub(crate) fn tile_slot(&self, tile_id: TileId) -> Option<&TileSlot> {
        self.tiles.get(tile_id.0 as usize)?.as_ref()
    }

    pub(crate) fn links_of(&self, node: &Node) -> impl Iterator<Item = &Link> + '_ {
        let slot = self.tile_slot(node.tile_id);
        node.links.iter().filter_map(move |&idx| {
            slot.and_then(|s| s.links.get(idx as usize)).and_then(|l| l.as_ref())
        })
    }

    fn allocate_tile_slot(&mut self) -> (u16, u32) {
        if let Some(index) = self.free_tile_slots.pop() {
            (index, self.slot_salts[index as usize])
        } else {
            self.tiles.push(None);
            self.slot_salts.push(1);
            (self.tiles.len() as u16 - 1, 1)
        }
    }

    fn link_internal_edges(&mut self, tile_id: TileId) {
        let Some(slot) = self.tile_slot(tile_id) else { return };
        let poly_count = slot.tile.polygon_count();
        let salt = slot.salt;

        let mut pending: Vec<(u16, u8, u16)> = Vec::new();
        for p in 0..poly_count {
            let (indices, neighbors) = slot.tile.poly_mesh.polygon(p);
            let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
            for i in 0..n {
                let nb = neighbors[i];
                if nb == NULL_INDEX || nb & crate::poly_mesh::EXTERNAL_LINK != 0 {
                    continue;
                }
                pending.push((p as u16, i as u8, nb));
            }
        }

        for (p, edge, nb) in pending {
            let from = NodeRef::new(salt, tile_id, p);
            let to = NodeRef::new(salt, tile_id, nb);
            self.push_poly_link(tile_id, p, Link {
                from,
                to,
                edge,
                side: LinkSide::NegX,
                bmin: 0,
                bmax: 255,
            });
        }
    }

    fn push_poly_link(&mut self, tile_id: TileId, poly_index: u16, link: Link) {
        let Some(slot) = self.tiles[tile_id.0 as usize].as_mut() else { return };
        let idx = slot.push_link(link);
        slot.poly_nodes[poly_index as usize].links.push(idx);
    }

    fn stitch_neighbours(&mut self, tile_id: TileId) {
        let Some((coord, poly_count, salt)) = self
            .tile_slot(tile_id)
            .map(|s| (s.coord, s.tile.polygon_count(), s.salt))
        else {
            return;
        };
        let (tile_x, tile_z, layer) = coord;

        for side in [LinkSide::NegX, LinkSide::PosX, LinkSide::PosZ, LinkSide::NegZ] {
            let (dx, dz) = side.tile_offset();
            let neighbour_coord = (tile_x + dx, tile_z + dz, layer);
            let Some(&neighbour_index) = self.tile_lookup.get(&neighbour_coord) else {
                continue;
            };
            let neighbour_id = TileId(neighbour_index);

            let matches = self.find_border_matches(tile_id, neighbour_id, side, poly_count);
            for link_match in matches {
                let from = NodeRef::new(salt, tile_id, link_match.poly);
                let neighbour_salt = self.tile_slot(neighbour_id).map(|s| s.salt).unwrap_or(0);
                let to = NodeRef::new(neighbour_salt, neighbour_id, link_match.other_poly);

                self.push_poly_link(tile_id, link_match.poly, Link {
                    from,
                    to,
                    edge: link_match.edge,
                    side,
                    bmin: link_match.bmin,
                    bmax: link_match.bmax,
                });
                self.push_poly_link(neighbour_id, link_match.other_poly, Link {
                    from: to,
                    to: from,
                    edge: link_match.other_edge,
                    side: side.opposite(),
                    bmin: link_match.other_bmin,
                    bmax: link_match.other_bmax,
                });
            }
        }
    }

    fn find_border_matches(
        &self,
        tile_id: TileId,
        neighbour_id: TileId,
        side: LinkSide,
        poly_count: usize,
    ) -> Vec<BorderMatch> {
        let mut out = Vec::new();
        let Some(slot) = self.tile_slot(tile_id) else { return out };
        let Some(neighbour_slot) = self.tile_slot(neighbour_id) else { return out };

        let dir = side_to_dir(side);
        for p in 0..poly_count {
            let (indices, neighbors) = slot.tile.poly_mesh.polygon(p);
            let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
            for i in 0..n {
                let nb = neighbors[i];
                if nb & crate::poly_mesh::EXTERNAL_LINK == 0 {
                    continue;
                }
                if (nb & 0x3) != dir as u16 {
                    continue;
                }
                let a = slot.tile.world_vertex(indices[i]);
                let b = slot.tile.world_vertex(indices[(i + 1) % n]);
                let (a_min, a_max, axis_is_z) = edge_interval(a, b, side);

                for q in 0..neighbour_slot.tile.polygon_count() {
                    let (q_indices, q_neighbors) = neighbour_slot.tile.poly_mesh.polygon(q);
                    let qn = q_indices.iter().take_while(|&&v| v != NULL_INDEX).count();
                    for j in 0..qn {
                        let qnb = q_neighbors[j];
                        if qnb & crate::poly_mesh::EXTERNAL_LINK == 0 {
                            continue;
                        }
                        if (qnb & 0x3) != side_to_dir(side.opposite()) as u16 {
                            continue;
                        }
                        let c = neighbour_slot.tile.world_vertex(q_indices[j]);
                        let d = neighbour_slot.tile.world_vertex(q_indices[(j + 1) % qn]);
                        let (c_min, c_max, _) = edge_interval(c, d, side.opposite());

                        let overlap_min = a_min.max(c_min);
                        let overlap_max = a_max.min(c_max);
                        if overlap_min >= overlap_max {
                            continue;
                        }

                        let a_span = (a_max - a_min).max(1e-6);
                        let c_span = (c_max - c_min).max(1e-6);
                        let bmin = (((overlap_min - a_min) / a_span) * 255.0).round().clamp(0.0, 255.0) as u8;
                        let bmax = (((overlap_max - a_min) / a_span) * 255.0).round().clamp(0.0, 255.0) as u8;
                        let other_bmin = (((overlap_min - c_min) / c_span) * 255.0).round().clamp(0.0, 255.0) as u8;
                        let other_bmax = (((overlap_max - c_min) / c_span) * 255.0).round().clamp(0.0, 255.0) as u8;
                        let _ = axis_is_z;

                        out.push(BorderMatch {
                            poly: p as u16,
                            edge: i as u8,
                            bmin,
                            bmax,
                            other_poly: q as u16,
                            other_edge: j as u8,
                            other_bmin,
                            other_bmax,
                        });
                    }
                }
            }
        }
        out
    }

    fn prune_links_to_tile(&mut self, tile_id: TileId, removed: TileId) {
        self.prune_links_in_tile(tile_id, |link| link.to.tile_id() == removed);
    }

    fn prune_links_to_node(&mut self, tile_id: TileId, node_ref: NodeRef) {
        self.prune_links_in_tile(tile_id, |link| link.to == node_ref);
    }

    fn prune_links_in_tile(&mut self, tile_id: TileId, mut should_remove: impl FnMut(&Link) -> bool) {
        let Some(slot) = self.tiles[tile_id.0 as usize].as_mut() else { return };
        for link_slot in slot.links.iter_mut() {
            if let Some(link) = link_slot {
                if should_remove(link) {
                    *link_slot = None;
                }
            }
        }
        for node in slot.poly_nodes.iter_mut() {
            node.links.retain(|&idx| slot.links[idx as usize].is_some());
        }
        for node in slot.off_mesh_nodes.iter_mut().flatten() {
            node.links.retain(|&idx| slot.links[idx as usize].is_some());
        }
    }

    pub(crate) fn find_nearest_poly_raw(
        &self,
        center: Vec3,
        half_extents: Vec3,
    ) -> Option<(TileId, u16, Vec3, f32)> {
        let mut best: Option<(TileId, u16, Vec3, f32)> = None;
        for (idx, slot) in self.tiles.iter().enumerate() {
            let Some(slot) = slot else { continue };
            if let Some((poly, pos, dist_sq)) = slot.tile.find_nearest_poly(center, half_extents) {
                if best.as_ref().is_none_or(|b| dist_sq < b.3) {
                    best = Some((TileId(idx as u16), poly, pos, dist_sq));
                }
            }
        }
        best
    }

    /// Finds the polygon nearest to `center` within `half_extents`, returning
    /// its [`NodeRef`] and the closest point on the polygon to `center`.
    ///
    /// Returns `None` if no polygon's AABB overlaps the search box (spec.md's
    /// `NoPath`/"nothing within halfExtents" case for nearest-poly lookups).
    pub fn find_nearest_poly(&self, center: Vec3, half_extents: Vec3) -> Option<(NodeRef, Vec3)> {
        let (tile_id, poly_index, pos, _) = self.find_nearest_poly_raw(center, half_extents)?;
        let salt = self.tile_slot(tile_id)?.salt;
        Some((NodeRef::new(salt, tile_id, poly_index), pos))
    }

    pub(crate) fn push_off_mesh_node(&mut self, tile_id: TileId, mut node: Node) -> Option<NodeRef> {
        let slot = self.tiles[tile_id.0 as usize].as_mut()?;
        node.kind = NodeKind::OffMesh;
        node.tile_id = tile_id;
        let index = if let Some(free) = slot.free_off_mesh_nodes.pop() {
            node.poly_index = free;
            slot.off_mesh_nodes[free as usize] = Some(node);
            free
        } else {
            let idx = slot.off_mesh_nodes.len() as u16;
            node.poly_index = idx;
            slot.off_mesh_nodes.push(Some(node));
            idx
        };
        Some(NodeRef::new(slot.salt, tile_id, index | OFF_MESH_BIT))
    }

    pub(crate) fn push_link_for(&mut self, node_ref: NodeRef, link: Link) {
        let tile_id = node_ref.tile_id();
        let Some(slot) = self.tiles[tile_id.0 as usize].as_mut() else { return };
        let idx = slot.push_link(link);
        if node_ref.is_off_mesh() {
            if let Some(n) = slot
                .off_mesh_nodes
                .get_mut(node_ref.index() as usize)
                .and_then(|n| n.as_mut())
            {
                n.links.push(idx);
            }
        } else if let Some(n) = slot.poly_nodes.get_mut(node_ref.index() as usize) {
            n.links.push(idx);
        }
    }

    /// Frees an off-mesh node and every link referencing it, in both
    /// directions. Does nothing if `node_ref` is stale or already an
    /// ordinary polygon node.
    pub(crate) fn free_off_mesh_node(&mut self, node_ref: NodeRef) {
        if !node_ref.is_off_mesh() {
            return;
        }
        let tile_id = node_ref.tile_id();
        let Some(slot) = self.tiles[tile_id.0 as usize].as_mut() else { return };
        if slot.salt != node_ref.salt() {
            return;
        }
        let idx = node_ref.index();
        let Some(node) = slot
            .off_mesh_nodes
            .get_mut(idx as usize)
            .and_then(|n| n.take())
        else {
            return;
        };
        for link_idx in &node.links {
            slot.links[*link_idx as usize] = None;
        }
        slot.free_off_mesh_nodes.push(idx);
        self.prune_links_to_node(tile_id, node_ref);
    }
}

struct BorderMatch {
    poly: u16,
    edge: u8,
    bmin: u8,
    bmax: u8,
    other_poly: u16,
    other_edge: u8,
    other_bmin: u8,
    other_bmax: u8,
}

fn side_to_dir(side: LinkSide) -> u8 {
    match side {
        LinkSide::NegX => 0,
        LinkSide::PosZ => 1,
        LinkSide::PosX => 2,
        LinkSide::NegZ => 3,
        LinkSide::OffMesh => 0,
    }
}

/// The perpendicular-axis interval `(min, max)` an edge spans on a tile
/// border of the given side (Z for an X-facing border, X for a Z-facing one).
fn edge_interval(a: Vec3, b: Vec3, side: LinkSide) -> (f32, f32, bool) {
    match side {
        LinkSide::NegX | LinkSide::PosX => (a.z.min(b.z), a.z.max(b.z), true),
        _ => (a.x.min(b.x), a.x.max(b.x), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, BuildContoursFlags, CompactHeightfield, HeightfieldBuilder};

    fn flat_tile(min: Vec3, size: u16) -> Tile {
        let mut hf = HeightfieldBuilder {
            aabb: crate::Aabb3d::new(min, min + Vec3::new(size as f32, 4.0, size as f32)),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        for z in 0..size {
            for x in 0..size {
                hf.add_span(x, z, 0, 2, AreaType::DEFAULT_WALKABLE);
            }
        }
        let mut chf: CompactHeightfield = hf.into_compact(2, 1).unwrap();
        chf.build_distance_field();
        chf.build_regions(0, 0, 0).unwrap();
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let poly_mesh = cset.into_polygon_mesh(6).unwrap();
        let detail_mesh = crate::DetailNavmesh::new(&poly_mesh, &chf, 0.0, 1.0).unwrap();
        Tile::build(poly_mesh, detail_mesh).unwrap()
    }

    #[test]
    fn add_tile_allocates_one_node_per_polygon() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        let tile = flat_tile(Vec3::ZERO, 8);
        let polys = tile.polygon_count();
        let id = nav.add_tile(tile, 0, 0, 0).unwrap();
        assert_eq!(nav.tile_slot(id).unwrap().poly_nodes.len(), polys);
    }

    #[test]
    fn remove_tile_invalidates_node_ref() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        let tile = flat_tile(Vec3::ZERO, 8);
        let id = nav.add_tile(tile, 0, 0, 0).unwrap();
        let salt = nav.tile_slot(id).unwrap().salt;
        let node_ref = NodeRef::new(salt, id, 0);
        assert!(nav.get_node_by_ref(node_ref).is_some());

        nav.remove_tile(0, 0, 0).unwrap();
        assert!(nav.get_node_by_ref(node_ref).is_none());
    }

    #[test]
    fn duplicate_tile_slot_is_rejected() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        nav.add_tile(flat_tile(Vec3::ZERO, 8), 0, 0, 0).unwrap();
        let err = nav.add_tile(flat_tile(Vec3::ZERO, 8), 0, 0, 0).unwrap_err();
        assert!(matches!(err, NavMeshError::TileSlotOccupied { .. }));
    }
}
