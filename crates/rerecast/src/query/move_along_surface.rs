//! Surface-constrained movement: slides a point across the polygon graph
//! toward a target, hopping through portals and clipping against walls
//! rather than tunnelling through geometry.

use alloc::vec;
use alloc::vec::Vec;
use glam::{Vec2, Vec3};

use crate::NavMesh;
use crate::navmesh::{LinkSide, NodeKind, NodeRef};
use crate::poly_mesh::NULL_INDEX;

use super::QueryFilter;

/// The result of [`NavMesh::move_along_surface`].
#[derive(Debug, Clone)]
pub struct MoveAlongSurfaceResult {
    /// The final world-space position reached.
    pub position: Vec3,
    /// The node the final position lies on.
    pub node_ref: NodeRef,
    /// Every node crossed, in travel order, including the starting node.
    pub visited: Vec<NodeRef>,
}

/// Point-in-polygon test plus, on a miss, the boundary edge the segment from
/// `from` to `to` crosses first.
fn first_crossing(verts: &[Vec3], from: Vec3, to: Vec3) -> Option<(usize, Vec3)> {
    let n = verts.len();
    let mut best: Option<(usize, f32, Vec3)> = None;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        if let Some((t, point)) = segment_intersection_xz(from, to, a, b) {
            if best.as_ref().is_none_or(|(_, best_t, _)| t < *best_t) {
                best = Some((i, t, point));
            }
        }
    }
    best.map(|(edge, _, point)| (edge, point))
}

/// Intersects segment `p0..p1` against segment `a..b` in the XZ plane,
/// returning the parameter along `p0..p1` and the interpolated (with Y)
/// intersection point.
fn segment_intersection_xz(p0: Vec3, p1: Vec3, a: Vec3, b: Vec3) -> Option<(f32, Vec3)> {
    let p0_xz = Vec2::new(p0.x, p0.z);
    let p1_xz = Vec2::new(p1.x, p1.z);
    let a_xz = Vec2::new(a.x, a.z);
    let b_xz = Vec2::new(b.x, b.z);

    let d = p1_xz - p0_xz;
    let e = b_xz - a_xz;
    let denom = d.x * e.y - d.y * e.x;
    if denom.abs() < 1e-9 {
        return None;
    }
    let diff = a_xz - p0_xz;
    let t = (diff.x * e.y - diff.y * e.x) / denom;
    let u = (diff.x * d.y - diff.y * d.x) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    let xz = p0_xz + d * t;
    let y = p0.y + (p1.y - p0.y) * t;
    Some((t, Vec3::new(xz.x, y, xz.y)))
}

fn point_in_polygon_xz(verts: &[Vec3], x: f32, z: f32) -> bool {
    let n = verts.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, zi) = (verts[i].x, verts[i].z);
        let (xj, zj) = (verts[j].x, verts[j].z);
        if ((zi > z) != (zj > z)) && (x < (xj - xi) * (z - zi) / (zj - zi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl NavMesh {
    /// Slides from `start_pos` (on polygon `start`) toward `target_pos`,
    /// hopping across shared portals when the straight line would cross one
    /// and clipping to the wall (sliding along it) otherwise. Stops when the
    /// target is reached, `max_visited` nodes have been crossed, or the
    /// remaining motion stops making progress.
    ///
    /// Returns `None` only if `start` is stale or an off-mesh node — an
    /// off-mesh connection has no walkable surface to slide across.
    pub fn move_along_surface(
        &self,
        start: NodeRef,
        start_pos: Vec3,
        target_pos: Vec3,
        filter: &dyn QueryFilter,
        max_visited: usize,
    ) -> Option<MoveAlongSurfaceResult> {
        let start_node = self.get_node_by_ref(start)?;
        if start_node.kind == NodeKind::OffMesh {
            return None;
        }

        let slot = self.tile_slot(start_node.tile_id)?;
        let mut cur_pos = slot
            .tile
            .closest_point_on_poly(start_node.poly_index as usize, start_pos);
        let mut cur_ref = start;
        let mut target = target_pos;
        let mut visited = vec![cur_ref];
        let max_visited = max_visited.max(1);

        // Bounded by max_visited hops plus one extra iteration per hop for
        // wall-slide re-evaluation inside the same polygon.
        let iteration_budget = max_visited.saturating_mul(4).max(8);

        for _ in 0..iteration_budget {
            let node = self.get_node_by_ref(cur_ref)?;
            let slot = self.tile_slot(node.tile_id)?;
            let p = node.poly_index as usize;
            let (indices, _) = slot.tile.poly_mesh.polygon(p);
            let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
            if n == 0 {
                break;
            }
            let verts: Vec<Vec3> = indices[..n].iter().map(|&v| slot.tile.world_vertex(v)).collect();

            if point_in_polygon_xz(&verts, target.x, target.z) {
                let y = slot
                    .tile
                    .detail_mesh
                    .height_at(p, target.x, target.z)
                    .unwrap_or(cur_pos.y);
                cur_pos = Vec3::new(target.x, y, target.z);
                break;
            }

            let Some((edge_idx, cross_point)) = first_crossing(&verts, cur_pos, target) else {
                // The straight line in XZ doesn't cross the polygon boundary
                // at all (e.g. cur_pos sits exactly on a vertex); stop here
                // rather than spin.
                break;
            };

            let link = self
                .links_of(node)
                .find(|l| l.edge as usize == edge_idx && l.side != LinkSide::OffMesh)
                .copied();

            let hop = link.and_then(|l| {
                let to_node = self.get_node_by_ref(l.to)?;
                filter.pass_filter(to_node.area, to_node.flags).then_some(l.to)
            });

            if let Some(next_ref) = hop {
                cur_pos = cross_point;
                cur_ref = next_ref;
                visited.push(cur_ref);
                if visited.len() >= max_visited {
                    break;
                }
                continue;
            }

            // Wall: clip the remaining motion to the edge and slide along it.
            let a = verts[edge_idx];
            let b = verts[(edge_idx + 1) % n];
            let wall_dir = (Vec2::new(b.x, b.z) - Vec2::new(a.x, a.z)).normalize_or_zero();
            if wall_dir == Vec2::ZERO {
                cur_pos = cross_point;
                break;
            }
            let remaining = Vec2::new(target.x - cross_point.x, target.z - cross_point.z);
            let slide = wall_dir * remaining.dot(wall_dir);
            let new_target_xz = Vec2::new(cross_point.x, cross_point.z) + slide;

            if new_target_xz.distance_squared(Vec2::new(cur_pos.x, cur_pos.z)) < 1e-10 {
                cur_pos = cross_point;
                break;
            }

            cur_pos = cross_point;
            target = Vec3::new(new_target_xz.x, target.y, new_target_xz.y);
        }

        Some(MoveAlongSurfaceResult {
            position: cur_pos,
            node_ref: cur_ref,
            visited,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navmesh::NavMesh;
    use crate::query::NoOpQueryFilter;
    use crate::tile::Tile;
    use crate::{AreaType, BuildContoursFlags, CompactHeightfield, HeightfieldBuilder};

    fn flat_tile(size: u16) -> Tile {
        let mut hf = HeightfieldBuilder {
            aabb: crate::Aabb3d::new(Vec3::ZERO, Vec3::new(size as f32, 4.0, size as f32)),
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
    fn move_along_surface_reaches_target_inside_same_polygon() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        nav.add_tile(flat_tile(8), 0, 0, 0).unwrap();
        let start = NodeRef::new(nav.tile_slot(crate::tile::TileId(0)).unwrap().salt, crate::tile::TileId(0), 0);
        let filter = NoOpQueryFilter;
        let result = nav
            .move_along_surface(start, Vec3::new(1.0, 2.0, 1.0), Vec3::new(2.0, 2.0, 2.0), &filter, 8)
            .unwrap();
        assert!(result.position.distance(Vec3::new(2.0, result.position.y, 2.0)) < 0.5);
        assert_eq!(result.visited.len(), 1);
    }

    #[test]
    fn move_along_surface_stale_off_mesh_start_returns_none() {
        let nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        let bogus = NodeRef::new(1, crate::tile::TileId(0), 0);
        let filter = NoOpQueryFilter;
        assert!(
            nav.move_along_surface(bogus, Vec3::ZERO, Vec3::ONE, &filter, 8)
                .is_none()
        );
    }
}
