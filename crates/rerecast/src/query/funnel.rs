//! Funnel algorithm ("string pulling"): collapses a polygon path down to the
//! taut, corner-to-corner route a character would actually walk.

use alloc::vec::Vec;
use glam::Vec3;

use crate::NavMesh;
use crate::navmesh::{LinkSide, NodeKind, NodeRef};

use super::{StraightPath, StraightPathPoint, StraightPathPointFlags};

fn triangle_area_2d(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let ab_x = b.x - a.x;
    let ab_z = b.z - a.z;
    let ac_x = c.x - a.x;
    let ac_z = c.z - a.z;
    ac_x * ab_z - ab_x * ac_z
}

const EPSILON_SQ: f32 = 1.0 / 16384.0;

impl NavMesh {
    /// Funnels a node path (as returned by [`NavMesh::find_node_path`]) into
    /// a straight, corner-to-corner path.
    ///
    /// `start_pos`/`end_pos` are clamped onto the first/last node before
    /// funnelling starts, so callers can pass the original query positions
    /// even if they sat slightly outside the nearest polygon. An off-mesh
    /// connection endpoint along the path is always emitted as a forced
    /// corner (flagged [`StraightPathPointFlags::OFFMESH_CONNECTION`])
    /// rather than folded into the funnel, since a connection can't be cut
    /// short the way a polygon portal can.
    pub fn find_straight_path(
        &self,
        start_pos: Vec3,
        end_pos: Vec3,
        node_path: &[NodeRef],
    ) -> Option<StraightPath> {
        if node_path.is_empty() {
            return None;
        }

        let start_pos = self.clamp_to_node(node_path[0], start_pos);
        let end_pos = self.clamp_to_node(*node_path.last().unwrap(), end_pos);

        let mut points = Vec::with_capacity(node_path.len() + 2);
        points.push(StraightPathPoint {
            position: start_pos,
            flags: StraightPathPointFlags::START,
            node_ref: node_path[0],
        });

        if node_path.len() == 1 {
            points.push(StraightPathPoint {
                position: end_pos,
                flags: StraightPathPointFlags::END,
                node_ref: node_path[0],
            });
            return Some(StraightPath { points });
        }

        let mut portal_apex = start_pos;
        let mut portal_left = start_pos;
        let mut portal_right = start_pos;
        let mut left_index = 0usize;
        let mut right_index = 0usize;

        let mut i = 0usize;
        while i < node_path.len() {
            let (left, right, forced) = if let Some(&next) = node_path.get(i + 1) {
                let current = node_path[i];
                let link = self
                    .links_between(current, next)?;
                if link.side == LinkSide::OffMesh {
                    (
                        self.node_position(next)?,
                        self.node_position(next)?,
                        true,
                    )
                } else {
                    let (a, b) = self.portal_endpoints(current, &link)?;
                    (a, b, false)
                }
            } else {
                (end_pos, end_pos, false)
            };

            if forced {
                if points.last().map(|p| p.position) != Some(portal_apex) {
                    points.push(StraightPathPoint {
                        position: portal_apex,
                        flags: StraightPathPointFlags::empty(),
                        node_ref: node_path[i],
                    });
                }
                points.push(StraightPathPoint {
                    position: left,
                    flags: StraightPathPointFlags::OFFMESH_CONNECTION,
                    node_ref: node_path[i + 1],
                });
                portal_apex = left;
                portal_left = left;
                portal_right = left;
                left_index = i + 1;
                right_index = i + 1;
                i += 1;
                continue;
            }

            // Right vertex.
            if triangle_area_2d(portal_apex, portal_right, right) <= 0.0 {
                if portal_apex.distance_squared(portal_right) < EPSILON_SQ
                    || triangle_area_2d(portal_apex, portal_left, right) > 0.0
                {
                    portal_right = right;
                    right_index = i;
                } else {
                    portal_apex = portal_left;
                    push_corner(&mut points, portal_apex, node_path[left_index]);
                    portal_left = portal_apex;
                    portal_right = portal_apex;
                    right_index = left_index;
                    i = left_index + 1;
                    continue;
                }
            }

            // Left vertex.
            if triangle_area_2d(portal_apex, portal_left, left) >= 0.0 {
                if portal_apex.distance_squared(portal_left) < EPSILON_SQ
                    || triangle_area_2d(portal_apex, portal_right, left) < 0.0
                {
                    portal_left = left;
                    left_index = i;
                } else {
                    portal_apex = portal_right;
                    push_corner(&mut points, portal_apex, node_path[right_index]);
                    portal_left = portal_apex;
                    portal_right = portal_apex;
                    left_index = right_index;
                    i = right_index + 1;
                    continue;
                }
            }

            i += 1;
        }

        points.push(StraightPathPoint {
            position: end_pos,
            flags: StraightPathPointFlags::END,
            node_ref: *node_path.last().unwrap(),
        });

        Some(StraightPath { points })
    }

    fn clamp_to_node(&self, node_ref: NodeRef, pos: Vec3) -> Vec3 {
        let Some(node) = self.get_node_by_ref(node_ref) else {
            return pos;
        };
        if node.kind == NodeKind::OffMesh {
            return node.position;
        }
        let Some(slot) = self.tile_slot(node.tile_id) else {
            return pos;
        };
        slot.tile.closest_point_on_poly(node.poly_index as usize, pos)
    }

    fn links_between(&self, from: NodeRef, to: NodeRef) -> Option<crate::navmesh::Link> {
        let node = self.get_node_by_ref(from)?;
        self.links_of(node).find(|l| l.to == to).copied()
    }

    fn portal_endpoints(&self, from: NodeRef, link: &crate::navmesh::Link) -> Option<(Vec3, Vec3)> {
        let node = self.get_node_by_ref(from)?;
        let slot = self.tile_slot(node.tile_id)?;
        let (indices, _) = slot.tile.poly_mesh.polygon(node.poly_index as usize);
        let n = indices
            .iter()
            .take_while(|&&v| v != crate::poly_mesh::NULL_INDEX)
            .count();
        if n == 0 {
            return None;
        }
        let i = link.edge as usize % n;
        let a = slot.tile.world_vertex(indices[i]);
        let b = slot.tile.world_vertex(indices[(i + 1) % n]);
        const S: f32 = 1.0 / 255.0;
        let bmin = link.bmin as f32 * S;
        let bmax = link.bmax as f32 * S;
        Some((a.lerp(b, bmin), a.lerp(b, bmax)))
    }
}

fn push_corner(points: &mut Vec<StraightPathPoint>, position: Vec3, node_ref: NodeRef) {
    if points.last().map(|p| p.position) != Some(position) {
        points.push(StraightPathPoint {
            position,
            flags: StraightPathPointFlags::empty(),
            node_ref,
        });
    }
}
