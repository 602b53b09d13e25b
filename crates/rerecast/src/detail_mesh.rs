//! Per-polygon height sampling and triangulation, the way Recast's
//! `rcBuildPolyMeshDetail` turns a flat [`PolygonNavmesh`] polygon into a
//! triangulated patch that actually follows the ground underneath it.
//!
//! Each polygon is resampled along its boundary and, if the sample spacing
//! allows, across its interior, keeping only the samples that the original
//! flat polygon doesn't already predict within tolerance. The resulting
//! point set is triangulated into a small Delaunay mesh.

use alloc::vec;
use alloc::vec::Vec;
use glam::Vec3;
use thiserror::Error;

use crate::{CompactHeightfield, PolygonNavmesh, poly_mesh::NULL_INDEX};

/// One polygon's slice of [`DetailNavmesh::verts`] and [`DetailNavmesh::tris`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SubMesh {
    /// Index of this polygon's first vertex in [`DetailNavmesh::verts`].
    pub vert_base: u32,
    /// Number of vertices belonging to this polygon (including its hull).
    pub vert_count: u8,
    /// Index of this polygon's first triangle in [`DetailNavmesh::tris`].
    pub tri_base: u32,
    /// Number of triangles belonging to this polygon.
    pub tri_count: u8,
}

/// The triangulated, height-accurate detail mesh built over a
/// [`PolygonNavmesh`], one [`SubMesh`] per source polygon.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DetailNavmesh {
    /// One entry per source polygon, in the same order as `poly_mesh.polygons`.
    pub meshes: Vec<SubMesh>,
    /// All detail vertices, in world space, indexed relative to each
    /// submesh's `vert_base`.
    pub verts: Vec<Vec3>,
    /// All detail triangles: `[a, b, c, edge_flags]`, indices relative to the
    /// owning submesh's `vert_base`. `edge_flags` bit `i` is set when the
    /// edge `(i, i+1)` lies on the parent polygon's boundary.
    pub tris: Vec<[u8; 4]>,
}

/// Errors from [`DetailNavmesh::new`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum DetailMeshError {
    /// A polygon produced more detail vertices than fit a `u8`-indexed submesh.
    #[error("polygon {0} produced {1} detail vertices, more than the 255 a submesh can index")]
    TooManyVertices(usize, usize),
}

impl DetailNavmesh {
    /// Builds a detail mesh for every polygon in `poly_mesh`, sampling ground
    /// height from `chf`. `sample_dist` of `0.0` disables resampling
    /// entirely, producing a flat detail mesh identical to the polygon hull.
    pub fn new(
        poly_mesh: &PolygonNavmesh,
        chf: &CompactHeightfield,
        sample_dist: f32,
        sample_max_error: f32,
    ) -> Result<Self, DetailMeshError> {
        let mut meshes = Vec::with_capacity(poly_mesh.polygon_count());
        let mut verts = Vec::new();
        let mut tris: Vec<[u8; 4]> = Vec::new();

        for p in 0..poly_mesh.polygon_count() {
            let (indices, _) = poly_mesh.polygon(p);
            let n = indices.iter().take_while(|&&v| v != NULL_INDEX).count();
            if n < 3 {
                meshes.push(SubMesh::default());
                continue;
            }

            let hull: Vec<Vec3> = indices[..n]
                .iter()
                .map(|&v| world_vertex(poly_mesh, v))
                .collect();

            let (poly_verts, poly_tris) = build_polygon_detail(&hull, chf, sample_dist, sample_max_error);

            if poly_verts.len() > u8::MAX as usize {
                return Err(DetailMeshError::TooManyVertices(p, poly_verts.len()));
            }

            let vert_base = verts.len() as u32;
            let tri_base = tris.len() as u32;
            meshes.push(SubMesh {
                vert_base,
                vert_count: poly_verts.len() as u8,
                tri_base,
                tri_count: poly_tris.len() as u8,
            });
            verts.extend(poly_verts);
            tris.extend(poly_tris);
        }

        Ok(DetailNavmesh {
            meshes,
            verts,
            tris,
        })
    }

    /// Interpolated ground height at `(x, z)` within polygon `p`'s detail
    /// triangles, or `None` if `(x, z)` falls outside every triangle.
    pub fn height_at(&self, p: usize, x: f32, z: f32) -> Option<f32> {
        let mesh = self.meshes.get(p)?;
        let verts = &self.verts[mesh.vert_base as usize..mesh.vert_base as usize + mesh.vert_count as usize];
        let tris = &self.tris[mesh.tri_base as usize..mesh.tri_base as usize + mesh.tri_count as usize];
        for tri in tris {
            let a = verts[tri[0] as usize];
            let b = verts[tri[1] as usize];
            let c = verts[tri[2] as usize];
            if let Some((u, v, w)) = barycentric(a, b, c, x, z) {
                return Some(a.y * u + b.y * v + c.y * w);
            }
        }
        None
    }
}

fn world_vertex(poly_mesh: &PolygonNavmesh, v: u16) -> Vec3 {
    let voxel = poly_mesh.vertices[v as usize];
    let aabb = poly_mesh.aabb;
    Vec3::new(
        aabb.min.x + voxel.x as f32 * poly_mesh.cell_size,
        aabb.min.y + voxel.y as f32 * poly_mesh.cell_height,
        aabb.min.z + voxel.z as f32 * poly_mesh.cell_size,
    )
}

fn build_polygon_detail(
    hull: &[Vec3],
    chf: &CompactHeightfield,
    sample_dist: f32,
    sample_max_error: f32,
) -> (Vec<Vec3>, Vec<[u8; 4]>) {
    let boundary = resample_boundary(hull, chf, sample_dist, sample_max_error);
    let boundary_len = boundary.len();
    let mut points = boundary.clone();
    let mut tris = ear_clip_3d(&boundary);

    if sample_dist > 0.0 {
        sample_interior(hull, chf, sample_dist, sample_max_error, &mut points, &mut tris);
    }

    let tagged = tag_boundary_edges(&tris, boundary_len);
    (points, tagged)
}

/// Resamples every edge of `hull` at `sample_dist` spacing, keeping a
/// subdivision point only when its probed ground height deviates from the
/// straight-edge interpolation by more than `sample_max_error`.
fn resample_boundary(hull: &[Vec3], chf: &CompactHeightfield, sample_dist: f32, sample_max_error: f32) -> Vec<Vec3> {
    let n = hull.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        out.push(a);
        if sample_dist <= 0.0 {
            continue;
        }
        let dx = b.x - a.x;
        let dz = b.z - a.z;
        let edge_len = libm_sqrt(dx * dx + dz * dz);
        let steps = (edge_len / sample_dist).ceil().max(1.0) as u32;
        for s in 1..steps {
            let t = s as f32 / steps as f32;
            let x = a.x + dx * t;
            let z = a.z + dz * t;
            let y_interp = a.y + (b.y - a.y) * t;
            let y_sample = probe_height(chf, x, z, y_interp).unwrap_or(y_interp);
            if (y_sample - y_interp).abs() > sample_max_error {
                out.push(Vec3::new(x, y_sample, z));
            }
        }
    }
    out
}

/// Adds interior grid samples at `sample_dist` spacing that deviate from the
/// current triangulation's surface by more than `sample_max_error`, via
/// incremental Delaunay insertion.
fn sample_interior(
    hull: &[Vec3],
    chf: &CompactHeightfield,
    sample_dist: f32,
    sample_max_error: f32,
    points: &mut Vec<Vec3>,
    tris: &mut Vec<[u32; 3]>,
) {
    let min_x = hull.iter().fold(f32::MAX, |acc, v| acc.min(v.x));
    let max_x = hull.iter().fold(f32::MIN, |acc, v| acc.max(v.x));
    let min_z = hull.iter().fold(f32::MAX, |acc, v| acc.min(v.z));
    let max_z = hull.iter().fold(f32::MIN, |acc, v| acc.max(v.z));

    let mut z = min_z + sample_dist;
    while z < max_z {
        let mut x = min_x + sample_dist;
        while x < max_x {
            if point_in_polygon_xz(hull, x, z) {
                if let Some(containing) = find_containing_triangle(points, tris, x, z) {
                    let [ia, ib, ic] = tris[containing];
                    let (a, b, c) = (points[ia as usize], points[ib as usize], points[ic as usize]);
                    if let Some((u, v, w)) = barycentric(a, b, c, x, z) {
                        let y_surface = a.y * u + b.y * v + c.y * w;
                        let y_sample = probe_height(chf, x, z, y_surface).unwrap_or(y_surface);
                        if (y_sample - y_surface).abs() > sample_max_error {
                            let new_index = points.len() as u32;
                            points.push(Vec3::new(x, y_sample, z));
                            insert_point(points, tris, containing, new_index);
                        }
                    }
                }
            }
            x += sample_dist;
        }
        z += sample_dist;
    }
}

fn libm_sqrt(x: f32) -> f32 {
    crate::math::ops::sqrt(x)
}

/// Probes `chf` for the walkable span in column `(x, z)` whose height is
/// closest to `y_ref`, returning its world-space height.
fn probe_height(chf: &CompactHeightfield, x: f32, z: f32, y_ref: f32) -> Option<f32> {
    let ix = ((x - chf.aabb.min.x) / chf.cell_size).floor();
    let iz = ((z - chf.aabb.min.z) / chf.cell_size).floor();
    if ix < 0.0 || iz < 0.0 || ix >= chf.width as f32 || iz >= chf.height as f32 {
        return None;
    }
    let cell = chf.cell_at(ix as u16, iz as u16);
    let ref_voxel = ((y_ref - chf.aabb.min.y) / chf.cell_height).round() as i32;

    let mut best: Option<(i32, i32)> = None;
    for i in cell.range() {
        if !chf.areas[i].is_walkable() {
            continue;
        }
        let y = chf.spans[i].y as i32;
        let diff = (y - ref_voxel).abs();
        if best.is_none_or(|(_, best_diff)| diff < best_diff) {
            best = Some((y, diff));
        }
    }
    best.map(|(y, _)| chf.aabb.min.y + y as f32 * chf.cell_height)
}

fn point_in_polygon_xz(hull: &[Vec3], x: f32, z: f32) -> bool {
    let n = hull.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, zi) = (hull[i].x, hull[i].z);
        let (xj, zj) = (hull[j].x, hull[j].z);
        if ((zi > z) != (zj > z)) && (x < (xj - xi) * (z - zi) / (zj - zi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Barycentric coordinates of `(x, z)` in triangle `(a, b, c)`, projected to
/// the XZ plane. `None` if the point lies outside the triangle.
fn barycentric(a: Vec3, b: Vec3, c: Vec3, x: f32, z: f32) -> Option<(f32, f32, f32)> {
    let v0x = c.x - a.x;
    let v0z = c.z - a.z;
    let v1x = b.x - a.x;
    let v1z = b.z - a.z;
    let v2x = x - a.x;
    let v2z = z - a.z;

    let dot00 = v0x * v0x + v0z * v0z;
    let dot01 = v0x * v1x + v0z * v1z;
    let dot02 = v0x * v2x + v0z * v2z;
    let dot11 = v1x * v1x + v1z * v1z;
    let dot12 = v1x * v2x + v1z * v2z;

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < 1e-9 {
        return None;
    }
    let inv_denom = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;
    let w = 1.0 - u - v;

    const EPS: f32 = -1e-3;
    if u >= EPS && v >= EPS && w >= EPS {
        Some((w, v, u))
    } else {
        None
    }
}

/// Ear-clip triangulation of a simple boundary ring, projected to the XZ
/// plane, returning `[u32; 3]` indices into `boundary`.
fn ear_clip_3d(boundary: &[Vec3]) -> Vec<[u32; 3]> {
    let n = boundary.len();
    if n < 3 {
        return Vec::new();
    }
    let mut remaining: Vec<u32> = (0..n as u32).collect();
    let mut tris = Vec::with_capacity(n.saturating_sub(2));

    let area2 = |a: Vec3, b: Vec3, c: Vec3| (b.x - a.x) * (c.z - a.z) - (c.x - a.x) * (b.z - a.z);

    let mut guard = 0usize;
    while remaining.len() > 3 && guard < remaining.len() * remaining.len() + 16 {
        guard += 1;
        let m = remaining.len();
        let mut clipped = false;
        for i in 0..m {
            let prev = remaining[(i + m - 1) % m];
            let cur = remaining[i];
            let next = remaining[(i + 1) % m];
            let (pa, pb, pc) = (boundary[prev as usize], boundary[cur as usize], boundary[next as usize]);
            if area2(pa, pb, pc) <= 0.0 {
                continue;
            }
            let mut contains_other = false;
            for &o in &remaining {
                if o == prev || o == cur || o == next {
                    continue;
                }
                if barycentric(pa, pb, pc, boundary[o as usize].x, boundary[o as usize].z).is_some() {
                    contains_other = true;
                    break;
                }
            }
            if contains_other {
                continue;
            }
            tris.push([prev, cur, next]);
            remaining.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            break;
        }
    }
    if remaining.len() >= 3 {
        for i in 1..remaining.len() - 1 {
            tris.push([remaining[0], remaining[i], remaining[i + 1]]);
        }
    }
    tris
}

/// Linear scan for the triangle containing `(x, z)`, falling back to the
/// nearest triangle centroid if none contains it exactly (float-precision
/// edge cases at shared edges).
fn find_containing_triangle(points: &[Vec3], tris: &[[u32; 3]], x: f32, z: f32) -> Option<usize> {
    for (i, tri) in tris.iter().enumerate() {
        let [a, b, c] = *tri;
        if barycentric(points[a as usize], points[b as usize], points[c as usize], x, z).is_some() {
            return Some(i);
        }
    }
    let mut best: Option<(usize, f32)> = None;
    for (i, tri) in tris.iter().enumerate() {
        let [a, b, c] = *tri;
        let centroid = (points[a as usize] + points[b as usize] + points[c as usize]) / 3.0;
        let dist = (centroid.x - x).powi(2) + (centroid.z - z).powi(2);
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

/// Splits triangle `t` into three around `new_index`, then legalizes the
/// three new opposite edges via Delaunay edge flips.
fn insert_point(points: &[Vec3], tris: &mut Vec<[u32; 3]>, t: usize, new_index: u32) {
    let [a, b, c] = tris[t];
    tris[t] = [a, b, new_index];
    tris.push([b, c, new_index]);
    tris.push([c, a, new_index]);

    let mut stack = vec![(a, b), (b, c), (c, a)];
    let mut guard = 0usize;
    while let Some((u, v)) = stack.pop() {
        guard += 1;
        if guard > 10_000 {
            break;
        }
        let Some((opp_tri, opp_vert)) = find_opposite(tris, u, v, new_index) else {
            continue;
        };
        if should_flip(points, u, v, new_index, opp_vert) {
            flip_edge(tris, opp_tri, u, v, new_index, opp_vert);
            stack.push((u, opp_vert));
            stack.push((opp_vert, v));
        }
    }
}

/// Finds the triangle across edge `(v, u)` from the triangle containing
/// `(u, v, p)`, returning its index and its vertex opposite that edge.
fn find_opposite(tris: &[[u32; 3]], u: u32, v: u32, p: u32) -> Option<(usize, u32)> {
    for (i, tri) in tris.iter().enumerate() {
        if tri.contains(&p) {
            continue;
        }
        let verts = *tri;
        if verts.contains(&u) && verts.contains(&v) {
            let opp = verts.iter().copied().find(|&x| x != u && x != v)?;
            return Some((i, opp));
        }
    }
    None
}

fn should_flip(points: &[Vec3], u: u32, v: u32, p: u32, opp: u32) -> bool {
    let (a, b, c, d) = (points[u as usize], points[v as usize], points[p as usize], points[opp as usize]);
    in_circumcircle(a, b, c, d)
}

/// True if `d` lies within the circumcircle of `(a, b, c)`, assuming `a, b,
/// c` are wound counter-clockwise on the XZ plane.
fn in_circumcircle(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> bool {
    let (ax, az) = (a.x as f64 - d.x as f64, a.z as f64 - d.z as f64);
    let (bx, bz) = (b.x as f64 - d.x as f64, b.z as f64 - d.z as f64);
    let (cx, cz) = (c.x as f64 - d.x as f64, c.z as f64 - d.z as f64);

    let det = (ax * ax + az * az) * (bx * cz - cx * bz) - (bx * bx + bz * bz) * (ax * cz - cx * az)
        + (cx * cx + cz * cz) * (ax * bz - bx * az);
    det > 0.0
}

fn flip_edge(tris: &mut [[u32; 3]], opp_tri: usize, u: u32, v: u32, p: u32, opp: u32) {
    for tri in tris.iter_mut() {
        if *tri == [u, v, p] || *tri == [v, p, u] || *tri == [p, u, v] {
            *tri = [u, opp, p];
        }
    }
    tris[opp_tri] = [opp, v, p];
}

/// Bit `i` set when triangle edge `(i, i+1)` connects two consecutive
/// vertices of the original (pre-interior-sampling) boundary ring.
fn tag_boundary_edges(tris: &[[u32; 3]], boundary_len: usize) -> Vec<[u8; 4]> {
    tris.iter()
        .map(|&[a, b, c]| {
            let mut flags = 0u8;
            let verts = [a, b, c];
            for i in 0..3 {
                let u = verts[i];
                let v = verts[(i + 1) % 3];
                if (u as usize) < boundary_len
                    && (v as usize) < boundary_len
                    && is_cyclic_adjacent(u as usize, v as usize, boundary_len)
                {
                    flags |= 1 << i;
                }
            }
            [a as u8, b as u8, c as u8, flags]
        })
        .collect()
}

fn is_cyclic_adjacent(u: usize, v: usize, n: usize) -> bool {
    (u + 1) % n == v || (v + 1) % n == u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, BuildContoursFlags, HeightfieldBuilder};
    use glam::Vec3 as GVec3;

    fn flat_region(size: u16) -> crate::CompactHeightfield {
        let mut hf = HeightfieldBuilder {
            aabb: crate::Aabb3d::new(GVec3::ZERO, GVec3::new(size as f32, 4.0, size as f32)),
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
    fn flat_square_detail_mesh_has_two_triangles() {
        let chf = flat_region(8);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let poly_mesh = cset.into_polygon_mesh(6).unwrap();
        let detail = DetailNavmesh::new(&poly_mesh, &chf, 0.0, 1.0).unwrap();
        assert_eq!(detail.meshes.len(), 1);
        assert_eq!(detail.meshes[0].tri_count, 2);
    }

    #[test]
    fn height_at_interpolates_inside_polygon() {
        let chf = flat_region(8);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let poly_mesh = cset.into_polygon_mesh(6).unwrap();
        let detail = DetailNavmesh::new(&poly_mesh, &chf, 0.0, 1.0).unwrap();
        let center = detail.meshes[0].vert_base as usize;
        let p = detail.verts[center];
        let h = detail.height_at(0, p.x, p.z);
        assert!(h.is_some());
    }
}
