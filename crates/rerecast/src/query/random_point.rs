//! Random point sampling: a uniform point over the whole walkable surface,
//! or over the subset reachable within a given path distance of a start
//! polygon.

use alloc::collections::{BTreeMap, BinaryHeap};
use alloc::vec::Vec;
use core::cmp::{Ordering, Reverse};

use glam::Vec3;
use thiserror::Error;

use crate::NavMesh;
use crate::math::ops;
use crate::navmesh::NodeRef;
use crate::poly_mesh::NULL_INDEX;

use super::QueryFilter;

/// Errors from [`NavMesh::find_random_point`] and
/// [`NavMesh::find_random_point_around_circle`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RandomPointError {
    /// No polygon in the navmesh passes `filter`.
    #[error("no polygon in the navmesh passes the filter")]
    NoPassablePolygon,
    /// `start` is stale or doesn't point at a live node.
    #[error("stale or invalid start node reference")]
    StaleRef,
}

/// Triangulates `verts` (a convex XZ polygon) as a fan from vertex 0 and
/// returns twice the signed area of each fan triangle, plus the total. Used
/// both to weight polygon selection by area and to pick a triangle inside
/// the chosen polygon proportional to its own area.
fn fan_areas(verts: &[Vec3]) -> (Vec<f32>, f32) {
    let mut areas = Vec::with_capacity(verts.len().saturating_sub(2));
    let mut total = 0.0;
    for i in 1..verts.len().saturating_sub(1) {
        let a = verts[0];
        let b = verts[i];
        let c = verts[i + 1];
        let area = ((b.x - a.x) * (c.z - a.z) - (c.x - a.x) * (b.z - a.z)).abs() * 0.5;
        areas.push(area);
        total += area;
    }
    (areas, total)
}

/// Picks a uniform random point inside the convex XZ polygon `verts.len() >=
/// 3`, via triangle-fan decomposition weighted by area, then barycentric
/// sampling within the chosen triangle. `rng` must return a value in
/// `0.0..1.0`.
fn sample_point_in_polygon(verts: &[Vec3], rng: &mut dyn FnMut() -> f32) -> Vec3 {
    if verts.len() < 3 {
        return verts.first().copied().unwrap_or(Vec3::ZERO);
    }
    let (areas, total) = fan_areas(verts);
    if total <= 0.0 || areas.is_empty() {
        return verts[0];
    }
    let mut pick = rng() * total;
    let mut tri = 0;
    for (i, &area) in areas.iter().enumerate() {
        if pick <= area {
            tri = i;
            break;
        }
        pick -= area;
        tri = i;
    }

    let a = verts[0];
    let b = verts[tri + 1];
    let c = verts[tri + 2];

    // Uniform barycentric sample via the standard sqrt trick.
    let r1 = rng();
    let r2 = rng();
    let sqrt_r1 = ops::sqrt(r1.max(0.0));
    let u = 1.0 - sqrt_r1;
    let v = r2 * sqrt_r1;
    let w = 1.0 - u - v;
    Vec3::new(
        u * a.x + v * b.x + w * c.x,
        u * a.y + v * b.y + w * c.y,
        u * a.z + v * b.z + w * c.z,
    )
}

impl NavMesh {
    /// Samples a uniform random point over every polygon passing `filter`,
    /// weighting polygon selection by XZ area so a random point is as likely
    /// to land in a large room as the sum of many small ones. `rng` must
    /// return values in `0.0..1.0`.
    pub fn find_random_point(
        &self,
        filter: &dyn QueryFilter,
        rng: &mut dyn FnMut() -> f32,
    ) -> Result<(NodeRef, Vec3), RandomPointError> {
        let mut candidates: Vec<(NodeRef, f32)> = Vec::new();
        let mut total_area = 0.0;

        for (idx, slot) in self.tiles.iter().enumerate() {
            let Some(slot) = slot else { continue };
            for p in 0..slot.tile.polygon_count() {
                let node = &slot.poly_nodes[p];
                if !filter.pass_filter(node.area, node.flags) {
                    continue;
                }
                let (indices, _) = slot.tile.poly_mesh.polygon(p);
                let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
                if n < 3 {
                    continue;
                }
                let verts: Vec<Vec3> = indices[..n].iter().map(|&v| slot.tile.world_vertex(v)).collect();
                let (_, area) = fan_areas(&verts);
                if area <= 0.0 {
                    continue;
                }
                total_area += area;
                candidates.push((node.node_ref(slot.salt), area));
                let _ = idx;
            }
        }

        if candidates.is_empty() || total_area <= 0.0 {
            return Err(RandomPointError::NoPassablePolygon);
        }

        let mut pick = rng() * total_area;
        let mut chosen = candidates[0].0;
        for &(node_ref, area) in &candidates {
            if pick <= area {
                chosen = node_ref;
                break;
            }
            pick -= area;
            chosen = node_ref;
        }

        let node = self.get_node_by_ref(chosen).ok_or(RandomPointError::StaleRef)?;
        let slot = self.tile_slot(node.tile_id).ok_or(RandomPointError::StaleRef)?;
        let p = node.poly_index as usize;
        let (indices, _) = slot.tile.poly_mesh.polygon(p);
        let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
        let verts: Vec<Vec3> = indices[..n].iter().map(|&v| slot.tile.world_vertex(v)).collect();
        let point = sample_point_in_polygon(&verts, rng);

        Ok((chosen, point))
    }

    /// Samples a uniform random point among polygons whose shortest-path
    /// distance (Dijkstra, via `filter`'s edge cost) from `start`'s centre is
    /// at most `radius`, weighted by XZ area as in [`Self::find_random_point`].
    pub fn find_random_point_around_circle(
        &self,
        start: NodeRef,
        radius: f32,
        filter: &dyn QueryFilter,
        rng: &mut dyn FnMut() -> f32,
    ) -> Result<(NodeRef, Vec3), RandomPointError> {
        let start_node = self.get_node_by_ref(start).ok_or(RandomPointError::StaleRef)?;
        if !filter.pass_filter(start_node.area, start_node.flags) {
            return Err(RandomPointError::NoPassablePolygon);
        }
        let centre = start_node.position;

        let mut best_cost: BTreeMap<NodeRef, f32> = BTreeMap::new();
        let mut heap: BinaryHeap<Reverse<DijkstraEntry>> = BinaryHeap::new();
        best_cost.insert(start, 0.0);
        heap.push(Reverse(DijkstraEntry { cost: 0.0, node_ref: start }));

        let mut reachable: Vec<NodeRef> = Vec::new();

        while let Some(Reverse(DijkstraEntry { cost, node_ref })) = heap.pop() {
            if cost > best_cost.get(&node_ref).copied().unwrap_or(f32::MAX) {
                continue;
            }
            reachable.push(node_ref);

            let Some(node) = self.get_node_by_ref(node_ref) else { continue };
            let node_pos = node.position;

            for link in self.links_of(node).copied().collect::<Vec<_>>() {
                let Some(next_node) = self.get_node_by_ref(link.to) else { continue };
                if !filter.pass_filter(next_node.area, next_node.flags) {
                    continue;
                }
                let step = filter.cost(node_pos, next_node.position, next_node.area);
                let next_cost = cost + step;
                if next_cost > radius * 4.0 {
                    // Hard stop so a degenerate filter cost can't expand forever.
                    continue;
                }
                let better = best_cost
                    .get(&link.to)
                    .is_none_or(|&existing| next_cost < existing);
                if better {
                    best_cost.insert(link.to, next_cost);
                    heap.push(Reverse(DijkstraEntry { cost: next_cost, node_ref: link.to }));
                }
            }
        }

        let mut candidates: Vec<(NodeRef, f32)> = Vec::new();
        let mut total_area = 0.0;
        for node_ref in reachable {
            let Some(node) = self.get_node_by_ref(node_ref) else { continue };
            if node.position.distance(centre) > radius {
                continue;
            }
            let Some(slot) = self.tile_slot(node.tile_id) else { continue };
            if node_ref.is_off_mesh() {
                continue;
            }
            let p = node.poly_index as usize;
            let (indices, _) = slot.tile.poly_mesh.polygon(p);
            let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
            if n < 3 {
                continue;
            }
            let verts: Vec<Vec3> = indices[..n].iter().map(|&v| slot.tile.world_vertex(v)).collect();
            let (_, area) = fan_areas(&verts);
            if area <= 0.0 {
                continue;
            }
            total_area += area;
            candidates.push((node_ref, area));
        }

        if candidates.is_empty() || total_area <= 0.0 {
            return Err(RandomPointError::NoPassablePolygon);
        }

        let mut pick = rng() * total_area;
        let mut chosen = candidates[0].0;
        for &(node_ref, area) in &candidates {
            if pick <= area {
                chosen = node_ref;
                break;
            }
            pick -= area;
            chosen = node_ref;
        }

        let node = self.get_node_by_ref(chosen).ok_or(RandomPointError::StaleRef)?;
        let slot = self.tile_slot(node.tile_id).ok_or(RandomPointError::StaleRef)?;
        let p = node.poly_index as usize;
        let (indices, _) = slot.tile.poly_mesh.polygon(p);
        let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
        let verts: Vec<Vec3> = indices[..n].iter().map(|&v| slot.tile.world_vertex(v)).collect();
        let point = sample_point_in_polygon(&verts, rng);

        Ok((chosen, point))
    }
}

struct DijkstraEntry {
    cost: f32,
    node_ref: NodeRef,
}

impl PartialEq for DijkstraEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for DijkstraEntry {}
impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.partial_cmp(&other.cost).unwrap_or(Ordering::Equal)
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

    fn lcg(seed: &mut u32) -> f32 {
        *seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (*seed >> 8) as f32 / (1u32 << 24) as f32
    }

    #[test]
    fn find_random_point_lands_inside_the_navmesh_bounds() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        nav.add_tile(flat_tile(8), 0, 0, 0).unwrap();
        let filter = NoOpQueryFilter;
        let mut seed = 42u32;
        for _ in 0..50 {
            let (node_ref, point) = nav.find_random_point(&filter, &mut || lcg(&mut seed)).unwrap();
            assert!(nav.get_node_by_ref(node_ref).is_some());
            assert!(point.x >= 0.0 && point.x <= 8.0);
            assert!(point.z >= 0.0 && point.z <= 8.0);
        }
    }

    #[test]
    fn find_random_point_around_circle_stays_within_radius() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        nav.add_tile(flat_tile(8), 0, 0, 0).unwrap();
        let filter = NoOpQueryFilter;
        let start_salt = nav.tile_slot(crate::tile::TileId(0)).unwrap().salt;
        let start = NodeRef::new(start_salt, crate::tile::TileId(0), 0);
        let centre = nav.node_position(start).unwrap();
        let mut seed = 7u32;
        for _ in 0..20 {
            let (_, point) = nav
                .find_random_point_around_circle(start, 3.0, &filter, &mut || lcg(&mut seed))
                .unwrap();
            assert!(point.distance(centre) <= 3.0 + 1.0);
        }
    }

    #[test]
    fn find_random_point_rejects_when_nothing_passes_filter() {
        struct RejectAll;
        impl QueryFilter for RejectAll {
            fn pass_filter(&self, _area: crate::AreaType, _flags: u16) -> bool {
                false
            }
        }
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        nav.add_tile(flat_tile(8), 0, 0, 0).unwrap();
        let mut seed = 1u32;
        let err = nav
            .find_random_point(&RejectAll, &mut || lcg(&mut seed))
            .unwrap_err();
        assert_eq!(err, RandomPointError::NoPassablePolygon);
    }
}
