//! Off-mesh connections: point-to-point shortcuts (ladders, jumps, teleports)
//! grafted onto the polygon graph independent of tile boundaries.

use alloc::vec::Vec;
use glam::Vec3;

use super::link::{Link, LinkSide};
use super::node::{Node, NodeKind, NodeRef};
use super::{NavMesh, NavMeshError};
use crate::AreaType;

/// Opaque handle to an added [`OffMeshConnection`], returned by
/// [`NavMesh::add_off_mesh_connection`] and consumed by
/// [`NavMesh::remove_off_mesh_connection`].
///
/// Packs a slot index with a generation counter, the same stale-handle
/// protection [`NodeRef`] gets from a tile's salt: removing a connection and
/// adding a new one into the same slot never lets the old id validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffMeshConnectionId(u32, u16);

/// Whether an off-mesh connection can be traversed from `end` back to
/// `start`, or only `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffMeshConnectionDirection {
    /// Traversable in both directions.
    Bidirectional,
    /// Traversable only from `start` to `end`.
    StartToEnd,
}

/// A point-to-point shortcut between two world-space positions, independent
/// of tile structure. Each endpoint is snapped onto the nearest polygon
/// within `search_radius` when added.
#[derive(Debug, Clone, Copy)]
pub struct OffMeshConnection {
    /// World-space position of the start endpoint.
    pub start: Vec3,
    /// World-space position of the end endpoint.
    pub end: Vec3,
    /// How close a polygon must be, in world units, to snap to an endpoint.
    pub search_radius: f32,
    /// Traversal direction.
    pub direction: OffMeshConnectionDirection,
    /// Area type assigned to both endpoint nodes.
    pub area: AreaType,
    /// User/filter flags assigned to both endpoint nodes.
    pub flags: u16,
}

pub(crate) struct OffMeshAttachment {
    pub(crate) connection: OffMeshConnection,
    pub(crate) generation: u16,
    pub(crate) start_node: NodeRef,
    pub(crate) end_node: NodeRef,
}

impl NavMesh {
    /// Snaps both endpoints of `connection` onto their nearest polygon and
    /// grafts two off-mesh nodes into those polygons' owning tiles.
    ///
    /// Fails if either endpoint has no polygon within its search radius.
    /// Removing a tile that owns one of the endpoints leaves the other side
    /// dangling rather than invalidating the whole connection; traversal
    /// through a dangling endpoint simply finds no link there.
    pub fn add_off_mesh_connection(
        &mut self,
        connection: OffMeshConnection,
    ) -> Result<OffMeshConnectionId, NavMeshError> {
        let half_extents = Vec3::splat(connection.search_radius);
        let (start_tile, start_poly, _, _) = self
            .find_nearest_poly_raw(connection.start, half_extents)
            .ok_or(NavMeshError::NoNearbyPolygon)?;
        let (end_tile, end_poly, _, _) = self
            .find_nearest_poly_raw(connection.end, half_extents)
            .ok_or(NavMeshError::NoNearbyPolygon)?;

        let start_node = self
            .push_off_mesh_node(
                start_tile,
                Node {
                    kind: NodeKind::OffMesh,
                    tile_id: start_tile,
                    poly_index: 0,
                    area: connection.area,
                    flags: connection.flags,
                    position: connection.start,
                    links: Vec::new(),
                },
            )
            .ok_or(NavMeshError::NoNearbyPolygon)?;
        let end_node = self
            .push_off_mesh_node(
                end_tile,
                Node {
                    kind: NodeKind::OffMesh,
                    tile_id: end_tile,
                    poly_index: 0,
                    area: connection.area,
                    flags: connection.flags,
                    position: connection.end,
                    links: Vec::new(),
                },
            )
            .ok_or(NavMeshError::NoNearbyPolygon)?;

        let start_poly_ref = self.poly_node_ref(start_tile, start_poly);
        let end_poly_ref = self.poly_node_ref(end_tile, end_poly);

        self.link_pair(start_poly_ref, start_node);
        self.link_pair(start_node, end_node);
        self.link_pair(end_node, end_poly_ref);

        if connection.direction == OffMeshConnectionDirection::Bidirectional {
            self.link_pair(start_node, start_poly_ref);
            self.link_pair(end_poly_ref, end_node);
            self.link_pair(end_node, start_node);
        }

        let (slot_index, generation) = self.allocate_off_mesh_slot();
        self.off_mesh_connections[slot_index as usize] = Some(OffMeshAttachment {
            connection,
            generation,
            start_node,
            end_node,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            start = ?connection.start,
            end = ?connection.end,
            bidirectional = connection.direction == OffMeshConnectionDirection::Bidirectional,
            "added off-mesh connection"
        );

        Ok(OffMeshConnectionId(slot_index, generation))
    }

    /// Removes an off-mesh connection and every link attached to its two nodes.
    pub fn remove_off_mesh_connection(&mut self, id: OffMeshConnectionId) -> Result<(), NavMeshError> {
        let OffMeshConnectionId(slot_index, generation) = id;
        let attachment = self
            .off_mesh_connections
            .get(slot_index as usize)
            .and_then(|a| a.as_ref())
            .filter(|a| a.generation == generation)
            .ok_or(NavMeshError::UnknownOffMeshConnection)?;

        let start_node = attachment.start_node;
        let end_node = attachment.end_node;
        self.free_off_mesh_node(start_node);
        self.free_off_mesh_node(end_node);

        self.off_mesh_connections[slot_index as usize] = None;
        self.off_mesh_generations[slot_index as usize] =
            self.off_mesh_generations[slot_index as usize].wrapping_add(1);
        self.free_off_mesh_slots.push(slot_index);

        Ok(())
    }

    fn poly_node_ref(&self, tile_id: crate::tile::TileId, poly_index: u16) -> NodeRef {
        let salt = self.tile_slot(tile_id).map(|s| s.salt).unwrap_or(0);
        NodeRef::new(salt, tile_id, poly_index)
    }

    fn link_pair(&mut self, from: NodeRef, to: NodeRef) {
        self.push_link_for(
            from,
            Link {
                from,
                to,
                edge: 0,
                side: LinkSide::OffMesh,
                bmin: 0,
                bmax: 255,
            },
        );
    }

    fn allocate_off_mesh_slot(&mut self) -> (u32, u16) {
        if let Some(index) = self.free_off_mesh_slots.pop() {
            let generation = self.off_mesh_generations[index as usize];
            (index, generation)
        } else {
            self.off_mesh_connections.push(None);
            self.off_mesh_generations.push(0);
            (self.off_mesh_connections.len() as u32 - 1, 0)
        }
    }
}
