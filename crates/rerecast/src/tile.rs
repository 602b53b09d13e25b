//! Tile assembly: packages a [`PolygonNavmesh`] and its [`DetailNavmesh`]
//! together with a per-tile bounding-volume hierarchy, the unit a [`crate::NavMesh`]
//! actually stores and stitches together at runtime.

use alloc::vec::Vec;
use glam::UVec3;
use thiserror::Error;

use crate::{DetailNavmesh, PolygonNavmesh, poly_mesh::NULL_INDEX};

/// Identifies a tile slot inside a [`crate::NavMesh`]. Also the `tile_id`
/// field packed into every [`crate::NodeRef`] minted for that tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TileId(pub u16);

/// One node of a tile's bounding-volume hierarchy, stored depth-first.
/// A leaf has `poly_index != NULL_INDEX`; an internal node's `escape_index`
/// is the index of the node immediately following its subtree, letting a
/// query skip the whole subtree with one comparison on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BvNode {
    /// Minimum corner, in tile-local voxel coordinates.
    pub bmin: UVec3,
    /// Maximum corner, in tile-local voxel coordinates.
    pub bmax: UVec3,
    /// The polygon this leaf bounds, or [`NULL_INDEX`] for an internal node.
    pub poly_index: u16,
    /// Index of the node following this node's subtree.
    pub escape_index: u32,
}

impl BvNode {
    /// True if this is a leaf bounding a single polygon.
    pub fn is_leaf(&self) -> bool {
        self.poly_index != NULL_INDEX
    }

    fn overlaps(&self, min: UVec3, max: UVec3) -> bool {
        self.bmin.x <= max.x
            && self.bmax.x >= min.x
            && self.bmin.y <= max.y
            && self.bmax.y >= min.y
            && self.bmin.z <= max.z
            && self.bmax.z >= min.z
    }
}

/// A self-contained slice of a navmesh: one `PolygonNavmesh`, its
/// `DetailNavmesh`, and the bounding-volume tree built over its polygons.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    /// The tile's polygon mesh.
    pub poly_mesh: PolygonNavmesh,
    /// The tile's detail mesh.
    pub detail_mesh: DetailNavmesh,
    /// Bounding-volume hierarchy over `poly_mesh`'s polygons, depth-first.
    pub bv_tree: Vec<BvNode>,
}

/// Errors from [`Tile::build`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TileBuildError {
    /// `poly_mesh` and `detail_mesh` don't describe the same polygon count.
    #[error(
        "poly_mesh has {poly_count} polygons but detail_mesh has {detail_count} submeshes"
    )]
    SubmeshCountMismatch {
        /// Number of polygons in the poly mesh.
        poly_count: usize,
        /// Number of submeshes in the detail mesh.
        detail_count: usize,
    },
}

impl Tile {
    /// Assembles a tile from a polygon mesh and its matching detail mesh,
    /// building the bounding-volume hierarchy over the polygon mesh.
    pub fn build(poly_mesh: PolygonNavmesh, detail_mesh: DetailNavmesh) -> Result<Self, TileBuildError> {
        if poly_mesh.polygon_count() != detail_mesh.meshes.len() {
            return Err(TileBuildError::SubmeshCountMismatch {
                poly_count: poly_mesh.polygon_count(),
                detail_count: detail_mesh.meshes.len(),
            });
        }

        let bv_tree = build_bv_tree(&poly_mesh);

        Ok(Tile {
            poly_mesh,
            detail_mesh,
            bv_tree,
        })
    }

    /// Number of polygons in this tile.
    pub fn polygon_count(&self) -> usize {
        self.poly_mesh.polygon_count()
    }

    /// World-space position of vertex `v`.
    pub fn world_vertex(&self, v: u16) -> glam::Vec3 {
        let voxel = self.poly_mesh.vertices[v as usize];
        let aabb = self.poly_mesh.aabb;
        glam::Vec3::new(
            aabb.min.x + voxel.x as f32 * self.poly_mesh.cell_size,
            aabb.min.y + voxel.y as f32 * self.poly_mesh.cell_height,
            aabb.min.z + voxel.z as f32 * self.poly_mesh.cell_size,
        )
    }

    /// Centroid of polygon `p`, in world space.
    pub fn polygon_centroid(&self, p: usize) -> glam::Vec3 {
        let (indices, _) = self.poly_mesh.polygon(p);
        let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
        if n == 0 {
            return glam::Vec3::ZERO;
        }
        let sum: glam::Vec3 = indices[..n].iter().map(|&v| self.world_vertex(v)).sum();
        sum / n as f32
    }

    /// World-space AABB of polygon `p`.
    pub fn polygon_aabb(&self, p: usize) -> (glam::Vec3, glam::Vec3) {
        let (indices, _) = self.poly_mesh.polygon(p);
        let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
        let mut min = glam::Vec3::splat(f32::MAX);
        let mut max = glam::Vec3::splat(f32::MIN);
        for &v in &indices[..n] {
            let pos = self.world_vertex(v);
            min = min.min(pos);
            max = max.max(pos);
        }
        (min, max)
    }

    /// Closest point to `point` that lies within polygon `p` (XZ clamp,
    /// height from the detail mesh where available).
    pub fn closest_point_on_poly(&self, p: usize, point: glam::Vec3) -> glam::Vec3 {
        let (indices, _) = self.poly_mesh.polygon(p);
        let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
        if n == 0 {
            return point;
        }
        let verts: Vec<glam::Vec3> = indices[..n].iter().map(|&v| self.world_vertex(v)).collect();

        let xz = if point_in_polygon_xz(&verts, point.x, point.z) {
            glam::Vec2::new(point.x, point.z)
        } else {
            closest_point_on_boundary(&verts, point.x, point.z)
        };

        let y = self
            .detail_mesh
            .height_at(p, xz.x, xz.y)
            .unwrap_or_else(|| self.polygon_centroid(p).y);

        glam::Vec3::new(xz.x, y, xz.y)
    }

    /// Finds the polygon in this tile closest to `center`, among polygons
    /// whose AABB overlaps `[center - half_extents, center + half_extents]`,
    /// by walking the bounding-volume tree.
    pub fn find_nearest_poly(
        &self,
        center: glam::Vec3,
        half_extents: glam::Vec3,
    ) -> Option<(u16, glam::Vec3, f32)> {
        let query_min = self.world_to_voxel_floor(center - half_extents);
        let query_max = self.world_to_voxel_ceil(center + half_extents);

        let mut best: Option<(u16, glam::Vec3, f32)> = None;
        let mut i = 0usize;
        while i < self.bv_tree.len() {
            let node = self.bv_tree[i];
            if !node.overlaps(query_min, query_max) {
                i = node.escape_index as usize;
                continue;
            }
            if node.is_leaf() {
                let p = node.poly_index as usize;
                let closest = self.closest_point_on_poly(p, center);
                let dist_sq = closest.distance_squared(center);
                if best.is_none_or(|(_, _, best_dist)| dist_sq < best_dist) {
                    best = Some((node.poly_index, closest, dist_sq));
                }
            }
            i += 1;
        }
        best
    }

    fn world_to_voxel_floor(&self, p: glam::Vec3) -> UVec3 {
        let aabb = self.poly_mesh.aabb;
        UVec3::new(
            (((p.x - aabb.min.x) / self.poly_mesh.cell_size).floor().max(0.0)) as u32,
            (((p.y - aabb.min.y) / self.poly_mesh.cell_height).floor().max(0.0)) as u32,
            (((p.z - aabb.min.z) / self.poly_mesh.cell_size).floor().max(0.0)) as u32,
        )
    }

    fn world_to_voxel_ceil(&self, p: glam::Vec3) -> UVec3 {
        let aabb = self.poly_mesh.aabb;
        UVec3::new(
            (((p.x - aabb.min.x) / self.poly_mesh.cell_size).ceil().max(0.0)) as u32,
            (((p.y - aabb.min.y) / self.poly_mesh.cell_height).ceil().max(0.0)) as u32,
            (((p.z - aabb.min.z) / self.poly_mesh.cell_size).ceil().max(0.0)) as u32,
        )
    }
}

fn point_in_polygon_xz(verts: &[glam::Vec3], x: f32, z: f32) -> bool {
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

fn closest_point_on_boundary(verts: &[glam::Vec3], x: f32, z: f32) -> glam::Vec2 {
    let n = verts.len();
    let p = glam::Vec2::new(x, z);
    let mut best = glam::Vec2::new(verts[0].x, verts[0].z);
    let mut best_dist = f32::MAX;
    for i in 0..n {
        let a = glam::Vec2::new(verts[i].x, verts[i].z);
        let b = glam::Vec2::new(verts[(i + 1) % n].x, verts[(i + 1) % n].z);
        let ab = b - a;
        let len_sq = ab.length_squared();
        let t = if len_sq > 1e-9 {
            ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let candidate = a + ab * t;
        let dist = candidate.distance_squared(p);
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }
    best
}

struct BvItem {
    bmin: UVec3,
    bmax: UVec3,
    poly_index: u16,
}

fn build_bv_tree(poly_mesh: &PolygonNavmesh) -> Vec<BvNode> {
    let mut items = Vec::with_capacity(poly_mesh.polygon_count());
    for p in 0..poly_mesh.polygon_count() {
        let (indices, _) = poly_mesh.polygon(p);
        let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
        if n == 0 {
            continue;
        }
        let mut bmin = UVec3::splat(u32::MAX);
        let mut bmax = UVec3::ZERO;
        for &v in &indices[..n] {
            let voxel = poly_mesh.vertices[v as usize];
            bmin = bmin.min(voxel);
            bmax = bmax.max(voxel);
        }
        items.push(BvItem {
            bmin,
            bmax,
            poly_index: p as u16,
        });
    }

    let mut nodes = Vec::with_capacity(items.len() * 2);
    if !items.is_empty() {
        build_bv_recursive(&mut nodes, &mut items);
    }
    nodes
}

fn build_bv_recursive(nodes: &mut Vec<BvNode>, items: &mut [BvItem]) {
    if items.len() == 1 {
        nodes.push(BvNode {
            bmin: items[0].bmin,
            bmax: items[0].bmax,
            poly_index: items[0].poly_index,
            escape_index: nodes.len() as u32 + 1,
        });
        return;
    }

    let mut bmin = UVec3::splat(u32::MAX);
    let mut bmax = UVec3::ZERO;
    for item in items.iter() {
        bmin = bmin.min(item.bmin);
        bmax = bmax.max(item.bmax);
    }

    let extent = bmax.as_ivec3() - bmin.as_ivec3();
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };

    items.sort_by_key(|item| {
        let center = item.bmin.as_ivec3() + item.bmax.as_ivec3();
        match axis {
            0 => center.x,
            1 => center.y,
            _ => center.z,
        }
    });

    let node_index = nodes.len();
    nodes.push(BvNode {
        bmin,
        bmax,
        poly_index: NULL_INDEX,
        escape_index: 0,
    });

    let mid = items.len() / 2;
    let (left, right) = items.split_at_mut(mid);
    build_bv_recursive(nodes, left);
    build_bv_recursive(nodes, right);

    let escape_index = nodes.len() as u32;
    nodes[node_index].escape_index = escape_index;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, BuildContoursFlags, CompactHeightfield, HeightfieldBuilder};
    use glam::Vec3;

    fn flat_region(size: u16) -> CompactHeightfield {
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
        let mut chf = hf.into_compact(2, 1).unwrap();
        chf.build_distance_field();
        chf.build_regions(0, 0, 0).unwrap();
        chf
    }

    fn build_flat_tile(size: u16) -> Tile {
        let chf = flat_region(size);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let poly_mesh = cset.into_polygon_mesh(6).unwrap();
        let detail_mesh = DetailNavmesh::new(&poly_mesh, &chf, 0.0, 1.0).unwrap();
        Tile::build(poly_mesh, detail_mesh).unwrap()
    }

    #[test]
    fn bv_tree_has_one_leaf_per_polygon() {
        let tile = build_flat_tile(8);
        let leaves = tile.bv_tree.iter().filter(|n| n.is_leaf()).count();
        assert_eq!(leaves, tile.polygon_count());
    }

    #[test]
    fn find_nearest_poly_locates_the_single_polygon() {
        let tile = build_flat_tile(8);
        let (poly, _point, _dist) = tile
            .find_nearest_poly(Vec3::new(4.0, 1.0, 4.0), Vec3::new(1.0, 2.0, 1.0))
            .unwrap();
        assert_eq!(poly, 0);
    }

    #[test]
    fn mismatched_submesh_count_is_rejected() {
        let chf = flat_region(8);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let poly_mesh = cset.into_polygon_mesh(6).unwrap();
        let empty_detail = DetailNavmesh::default();
        assert!(matches!(
            Tile::build(poly_mesh, empty_detail),
            Err(TileBuildError::SubmeshCountMismatch { .. })
        ));
    }
}
