//! Convex polygon mesh construction: triangulates each contour and greedily
//! merges triangles back into larger convex polygons, the way Recast's
//! `rcBuildPolyMesh` does, so a flat room ends up as one polygon instead of
//! dozens of triangles.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use glam::UVec3;
use thiserror::Error;

use crate::{AreaType, Contour, ContourSet, Region, math::triangle_area_2d};

/// Sentinel for an unused vertex or neighbour slot in [`PolygonNavmesh::polygons`].
pub const NULL_INDEX: u16 = 0xffff;
/// Flag OR'd into a neighbour slot meaning the edge lies on the tile border;
/// the low 2 bits hold the grid direction (see [`crate::math::dir_offset_x`]).
pub const EXTERNAL_LINK: u16 = 0x8000;

/// A mesh of convex polygons, grounded on the watershed regions of a
/// [`ContourSet`]. Polygons never merge across a region boundary; boundary
/// edges between regions become internal neighbour links instead.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonNavmesh {
    /// Vertex positions, in voxel-grid coordinates.
    pub vertices: Vec<UVec3>,
    /// Flattened polygon table: for polygon `p`, vertex indices live at
    /// `[p * 2*nvp .. p * 2*nvp + nvp]` and per-edge neighbours at
    /// `[p * 2*nvp + nvp .. p * 2*nvp + 2*nvp]`, both padded with
    /// [`NULL_INDEX`].
    pub polygons: Vec<u16>,
    /// The region each polygon belongs to, parallel to the polygon table.
    pub region_ids: Vec<Region>,
    /// The area type each polygon was built from, parallel to the polygon table.
    pub area_types: Vec<AreaType>,
    /// The row stride of `polygons`: `3..=16`.
    pub max_vertices_per_polygon: u8,
    /// XZ voxel size, in world units.
    pub cell_size: f32,
    /// Y voxel size, in world units.
    pub cell_height: f32,
    /// World-space bounds, matching the source [`ContourSet`].
    pub aabb: crate::Aabb3d,
    /// The border rim width this mesh's source contours were built with.
    pub border_size: u16,
}

impl PolygonNavmesh {
    /// Number of polygons in this mesh.
    pub fn polygon_count(&self) -> usize {
        self.region_ids.len()
    }

    /// The vertex and neighbour slots for polygon `p`.
    pub fn polygon(&self, p: usize) -> (&[u16], &[u16]) {
        let nvp = self.max_vertices_per_polygon as usize;
        let row = &self.polygons[p * 2 * nvp..(p + 1) * 2 * nvp];
        row.split_at(nvp)
    }
}

/// Errors from [`ContourSet::into_polygon_mesh`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PolyMeshError {
    /// `max_vertices_per_polygon` was out of the supported `3..=16` range.
    #[error("max_vertices_per_polygon must be between 3 and 16, got {0}")]
    InvalidMaxVerticesPerPolygon(u8),
    /// A contour had fewer than 3 simplified vertices.
    #[error("contour for region {0:?} has fewer than 3 vertices")]
    DegenerateContour(Region),
    /// More vertices were produced than fit a `u16` index.
    #[error("too many vertices for a u16-indexed polygon mesh: {0}")]
    TooManyVertices(usize),
}

#[derive(Debug, Clone)]
struct WorkPoly {
    /// Global vertex indices, CCW.
    verts: Vec<u32>,
    /// Per-edge neighbour polygon index (edge `i` is `verts[i] -> verts[i+1]`).
    neighbors: Vec<Option<u32>>,
    /// Per-edge: the original contour-side region across that edge, for
    /// edges that come from an untouched contour boundary segment (`None`
    /// for diagonals introduced by triangulation or merging).
    border_region: Vec<Option<Region>>,
    region: Region,
    area: AreaType,
}

impl ContourSet {
    /// Triangulates and greedily merges every contour into a [`PolygonNavmesh`].
    pub fn into_polygon_mesh(&self, max_vertices_per_polygon: u8) -> Result<PolygonNavmesh, PolyMeshError> {
        if !(3..=16).contains(&max_vertices_per_polygon) {
            return Err(PolyMeshError::InvalidMaxVerticesPerPolygon(
                max_vertices_per_polygon,
            ));
        }

        let mut positions: Vec<(i32, i32, i32)> = Vec::new();
        let mut lookup: BTreeMap<(i32, i32, i32), u32> = BTreeMap::new();
        let mut polys: Vec<WorkPoly> = Vec::new();

        for contour in &self.contours {
            build_contour_polys(contour, &mut positions, &mut lookup, &mut polys)?;
        }

        link_adjacency(&mut polys);
        merge_polys(&mut polys, max_vertices_per_polygon as usize, &positions);

        if positions.len() > NULL_INDEX as usize {
            return Err(PolyMeshError::TooManyVertices(positions.len()));
        }

        let nvp = max_vertices_per_polygon as usize;
        let mut table = vec![NULL_INDEX; polys.len() * 2 * nvp];
        let mut region_ids = Vec::with_capacity(polys.len());
        let mut area_types = Vec::with_capacity(polys.len());

        let chf_width = self.width + self.border_size * 2;
        let chf_height = self.height + self.border_size * 2;

        for (p, poly) in polys.iter().enumerate() {
            let n = poly.verts.len();
            let row = &mut table[p * 2 * nvp..(p + 1) * 2 * nvp];
            for (i, &v) in poly.verts.iter().enumerate() {
                row[i] = v as u16;
            }
            for i in 0..n {
                row[nvp + i] = match poly.neighbors[i] {
                    Some(other) => other as u16,
                    None => {
                        let touches_border = poly.border_region[i]
                            .map(|r| r.is_border())
                            .unwrap_or(false);
                        if touches_border {
                            let a = positions[poly.verts[i] as usize];
                            let b = positions[poly.verts[(i + 1) % n] as usize];
                            EXTERNAL_LINK | tile_border_dir(a, b, chf_width, chf_height)
                        } else {
                            NULL_INDEX
                        }
                    }
                };
            }
            region_ids.push(poly.region);
            area_types.push(poly.area);
        }

        let vertices = positions
            .iter()
            .map(|&(x, y, z)| UVec3::new(x as u32, y as u32, z as u32))
            .collect();

        Ok(PolygonNavmesh {
            vertices,
            polygons: table,
            region_ids,
            area_types,
            max_vertices_per_polygon,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            aabb: self.aabb,
            border_size: self.border_size,
        })
    }
}

/// Which grid direction the border edge `(a, b)` faces, given the full
/// (un-trimmed) compact heightfield dimensions.
fn tile_border_dir(a: (i32, i32, i32), b: (i32, i32, i32), width: u16, height: u16) -> u16 {
    if a.0 == 0 && b.0 == 0 {
        0
    } else if a.2 == height as i32 && b.2 == height as i32 {
        1
    } else if a.0 == width as i32 && b.0 == width as i32 {
        2
    } else {
        3
    }
}

fn vertex_index(
    x: i32,
    y: i32,
    z: i32,
    positions: &mut Vec<(i32, i32, i32)>,
    lookup: &mut BTreeMap<(i32, i32, i32), u32>,
) -> u32 {
    *lookup.entry((x, y, z)).or_insert_with(|| {
        positions.push((x, y, z));
        (positions.len() - 1) as u32
    })
}

fn build_contour_polys(
    contour: &Contour,
    positions: &mut Vec<(i32, i32, i32)>,
    lookup: &mut BTreeMap<(i32, i32, i32), u32>,
    polys: &mut Vec<WorkPoly>,
) -> Result<(), PolyMeshError> {
    let n = contour.verts.len();
    if n < 3 {
        return Err(PolyMeshError::DegenerateContour(contour.region));
    }

    let global: Vec<u32> = contour
        .verts
        .iter()
        .map(|v| vertex_index(v.x, v.y, v.z, positions, lookup))
        .collect();

    // Ear clipping works on a CCW polygon; flip if the contour came out CW.
    let points: Vec<(f32, f32)> = contour
        .verts
        .iter()
        .map(|v| (v.x as f32, v.z as f32))
        .collect();
    let mut order: Vec<usize> = (0..n).collect();
    let mut border_region: Vec<Option<Region>> = contour.verts.iter().map(|v| Some(v.neighbor_region)).collect();
    if signed_area(&points) < 0.0 {
        order.reverse();
        border_region.reverse();
        // Reversing the vertex order shifts which vertex an edge's
        // "following" neighbour region applies to by one slot.
        border_region.rotate_left(1);
    }

    let triangles = ear_clip(&points, &order);

    for [a, b, c] in triangles {
        let verts = vec![global[a], global[b], global[c]];
        // A triangle edge only carries the original border-region metadata
        // when it connects two adjacent vertices in the (possibly flipped)
        // contour order; diagonals introduced by clipping do not.
        let edge_region = |from: usize, to: usize| -> Option<Region> {
            let pos_from = order.iter().position(|&i| i == from).unwrap();
            let pos_to = order.iter().position(|&i| i == to).unwrap();
            if (pos_from + 1) % n == pos_to {
                border_region[pos_from]
            } else {
                None
            }
        };
        let border_region = vec![
            edge_region(a, b),
            edge_region(b, c),
            edge_region(c, a),
        ];
        polys.push(WorkPoly {
            verts,
            neighbors: vec![None; 3],
            border_region,
            region: contour.region,
            area: contour.area,
        });
    }

    Ok(())
}

fn signed_area(points: &[(f32, f32)]) -> f32 {
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let (x0, z0) = points[i];
        let (x1, z1) = points[(i + 1) % n];
        area += x0 * z1 - x1 * z0;
    }
    area * 0.5
}

/// Ear-clip triangulation of a simple polygon given as a CCW `order` of
/// indices into `points`. Returns triangles as `[a, b, c]` original indices.
fn ear_clip(points: &[(f32, f32)], order: &[usize]) -> Vec<[usize; 3]> {
    let mut remaining = order.to_vec();
    let mut triangles = Vec::with_capacity(remaining.len().saturating_sub(2));

    let to_vec2 = |i: usize| glam::Vec2::new(points[i].0, points[i].1);

    let mut guard = 0usize;
    while remaining.len() > 3 && guard < remaining.len() * remaining.len() + 16 {
        guard += 1;
        let n = remaining.len();
        let mut clipped = false;
        for i in 0..n {
            let prev = remaining[(i + n - 1) % n];
            let cur = remaining[i];
            let next = remaining[(i + 1) % n];

            let area = triangle_area_2d(to_vec2(prev), to_vec2(cur), to_vec2(next));
            if area <= 0.0 {
                continue; // reflex vertex, not a valid ear
            }

            let mut contains_other = false;
            for &p in &remaining {
                if p == prev || p == cur || p == next {
                    continue;
                }
                if point_in_triangle(to_vec2(p), to_vec2(prev), to_vec2(cur), to_vec2(next)) {
                    contains_other = true;
                    break;
                }
            }
            if contains_other {
                continue;
            }

            triangles.push([prev, cur, next]);
            remaining.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            // Degenerate/self-intersecting input; fall back to a simple fan
            // rather than looping forever.
            break;
        }
    }

    if remaining.len() >= 3 {
        for i in 1..remaining.len() - 1 {
            triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
        }
    }

    triangles
}

fn point_in_triangle(p: glam::Vec2, a: glam::Vec2, b: glam::Vec2, c: glam::Vec2) -> bool {
    let d1 = triangle_area_2d(p, a, b);
    let d2 = triangle_area_2d(p, b, c);
    let d3 = triangle_area_2d(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Builds directed-edge adjacency across every polygon (triangles from every
/// contour at once), so shared borders between differently-regioned
/// polygons, and diagonals within one contour, are both discovered in a
/// single pass.
fn link_adjacency(polys: &mut [WorkPoly]) {
    let mut edges: BTreeMap<(u32, u32), (usize, usize)> = BTreeMap::new();
    for (p, poly) in polys.iter().enumerate() {
        let n = poly.verts.len();
        for i in 0..n {
            let a = poly.verts[i];
            let b = poly.verts[(i + 1) % n];
            edges.insert((a, b), (p, i));
        }
    }

    let lookups: Vec<(usize, usize, Option<(usize, usize)>)> = {
        let mut out = Vec::new();
        for (p, poly) in polys.iter().enumerate() {
            let n = poly.verts.len();
            for i in 0..n {
                let a = poly.verts[i];
                let b = poly.verts[(i + 1) % n];
                out.push((p, i, edges.get(&(b, a)).copied()));
            }
        }
        out
    };

    for (p, i, found) in lookups {
        if let Some((other_p, _)) = found {
            if other_p != p {
                polys[p].neighbors[i] = Some(other_p as u32);
            }
        }
    }
}

/// True if the polygon `verts`, read as 2D points via `pos`, is convex.
fn is_convex(verts: &[u32], pos: &dyn Fn(u32) -> (f32, f32)) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }
    let to_vec2 = |v: u32| {
        let (x, z) = pos(v);
        glam::Vec2::new(x, z)
    };
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = to_vec2(verts[i]);
        let b = to_vec2(verts[(i + 1) % n]);
        let c = to_vec2(verts[(i + 2) % n]);
        let area = triangle_area_2d(a, b, c);
        if area.abs() < 1e-6 {
            continue;
        }
        if sign == 0.0 {
            sign = area.signum();
        } else if area.signum() != sign {
            return false;
        }
    }
    true
}

/// Greedily merges adjacent same-region polygons sharing an edge into larger
/// convex polygons, up to `max_verts` vertices each.
fn merge_polys(polys: &mut Vec<WorkPoly>, max_verts: usize, positions: &[(i32, i32, i32)]) {
    let pos = |v: u32| {
        let (x, _, z) = positions[v as usize];
        (x as f32, z as f32)
    };

    loop {
        let mut merged_any = false;
        'outer: for p in 0..polys.len() {
            if polys[p].verts.is_empty() {
                continue;
            }
            let n = polys[p].verts.len();
            for i in 0..n {
                let Some(other) = polys[p].neighbors[i] else {
                    continue;
                };
                let other = other as usize;
                if other == p || polys[other].verts.is_empty() {
                    continue;
                }
                if polys[p].region != polys[other].region {
                    continue;
                }

                let shared_a = polys[p].verts[i];

                let Some(merged) = try_merge(&polys[p], &polys[other], shared_a, &pos) else {
                    continue;
                };
                if merged.verts.len() > max_verts {
                    continue;
                }

                polys[p] = merged;
                polys[other].verts.clear();
                merged_any = true;
                break 'outer;
            }
        }

        if !merged_any {
            break;
        }
        polys.retain(|p| !p.verts.is_empty());
        link_adjacency(polys);
    }
}

/// Attempts to splice `a` and `b` together across `a`'s edge
/// `shared_a -> shared_b`, returning the merged polygon if valid.
///
/// The merged boundary is `b`'s vertices starting at `shared_a` (`nb - 1` of
/// them, ending on `shared_b`) followed by `a`'s vertices starting at
/// `shared_b` (`na - 1` of them, ending back on `shared_a`) — the two
/// vertex chains that remain once the shared edge itself is discarded.
fn try_merge(
    a: &WorkPoly,
    b: &WorkPoly,
    shared_a: u32,
    pos: &dyn Fn(u32) -> (f32, f32),
) -> Option<WorkPoly> {
    let ia = a.verts.iter().position(|&v| v == shared_a)?;
    let ib = b.verts.iter().position(|&v| v == shared_a)?;

    let na = a.verts.len();
    let nb = b.verts.len();

    let mut verts = Vec::with_capacity(na + nb - 2);
    let mut neighbors = Vec::with_capacity(na + nb - 2);
    let mut border_region = Vec::with_capacity(na + nb - 2);

    for k in 0..nb.saturating_sub(1) {
        let idx = (ib + k) % nb;
        verts.push(b.verts[idx]);
        neighbors.push(b.neighbors[idx]);
        border_region.push(b.border_region[idx]);
    }
    for k in 0..na.saturating_sub(1) {
        let idx = (ia + 1 + k) % na;
        verts.push(a.verts[idx]);
        neighbors.push(a.neighbors[idx]);
        border_region.push(a.border_region[idx]);
    }

    if has_duplicate_verts(&verts) || verts.len() < 3 || !is_convex(&verts, pos) {
        return None;
    }

    Some(WorkPoly {
        verts,
        neighbors,
        border_region,
        region: a.region,
        area: a.area,
    })
}

fn has_duplicate_verts(verts: &[u32]) -> bool {
    for i in 0..verts.len() {
        for j in (i + 1)..verts.len() {
            if verts[i] == verts[j] {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, BuildContoursFlags, HeightfieldBuilder, Region};
    use glam::Vec3;

    fn flat_region(size: u16) -> crate::CompactHeightfield {
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

    #[test]
    fn flat_square_becomes_one_polygon() {
        let chf = flat_region(8);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let mesh = cset.into_polygon_mesh(6).unwrap();
        assert_eq!(mesh.polygon_count(), 1);
        let (verts, _neighbors) = mesh.polygon(0);
        assert_eq!(verts.iter().filter(|&&v| v != NULL_INDEX).count(), 4);
    }

    #[test]
    fn rejects_invalid_nvp() {
        let chf = flat_region(4);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        assert!(matches!(
            cset.into_polygon_mesh(2),
            Err(PolyMeshError::InvalidMaxVerticesPerPolygon(2))
        ));
    }

    #[test]
    fn region_ids_are_preserved() {
        let chf = flat_region(8);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let mesh = cset.into_polygon_mesh(6).unwrap();
        assert_eq!(mesh.region_ids[0], Region(1));
    }
}
