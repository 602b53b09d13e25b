//! Contour tracing and Douglas-Peucker simplification.
//!
//! Walks the boundary of every region in a [`CompactHeightfield`] into a
//! dense "raw" polyline, then simplifies it down to the handful of corners
//! that matter, keeping any vertex where the neighbouring region changes
//! (a portal other polygons will need to match) or that sits on the tile
//! border (so neighbouring tiles stitch).

use alloc::vec;
use alloc::vec::Vec;
use bitflags::bitflags;

use crate::{
    Aabb3d, AreaType, CompactHeightfield, Region,
    math::{dir_offset_x, dir_offset_z},
};

bitflags! {
    /// Flags controlling [`CompactHeightfield::build_contours`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BuildContoursFlags: u8 {
        /// Subdivide long wall edges (no region change) past `max_edge_len`.
        const TESSELLATE_WALL_EDGES = 1 << 0;
        /// Subdivide long edges that cross an area boundary past `max_edge_len`.
        const TESSELLATE_AREA_EDGES = 1 << 1;
    }
}

impl Default for BuildContoursFlags {
    fn default() -> Self {
        Self::TESSELLATE_WALL_EDGES
    }
}

/// One vertex of a traced or simplified contour, in tile-local voxel
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourVertex {
    /// Voxel-space X.
    pub x: i32,
    /// Voxel-space Y (height).
    pub y: i32,
    /// Voxel-space Z.
    pub z: i32,
    /// The region on the other side of the edge that *follows* this vertex,
    /// or [`Region::NONE`] if the edge is a solid wall. Carries
    /// [`Region::BORDER`] when that edge lies on the tile border.
    pub neighbor_region: Region,
}

/// The traced and simplified boundary of one watershed region.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Contour {
    /// Simplified vertices (after Douglas-Peucker).
    pub verts: Vec<ContourVertex>,
    /// Dense, unsimplified boundary samples.
    pub raw_verts: Vec<ContourVertex>,
    /// The region this contour bounds.
    pub region: Region,
    /// The area type of the region this contour bounds.
    pub area: AreaType,
}

/// All contours traced from one [`CompactHeightfield`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourSet {
    /// One contour per surviving region.
    pub contours: Vec<Contour>,
    /// World-space bounds, with the border rim removed.
    pub aabb: Aabb3d,
    /// XZ voxel size, in world units.
    pub cell_size: f32,
    /// Y voxel size, in world units.
    pub cell_height: f32,
    /// Grid width, in voxels, with the border rim removed.
    pub width: u16,
    /// Grid height, in voxels, with the border rim removed.
    pub height: u16,
    /// The border rim width this set's source heightfield was built with.
    pub border_size: u16,
    /// The Douglas-Peucker threshold contours were simplified with.
    pub max_error: f32,
}

impl CompactHeightfield {
    /// Traces and simplifies the boundary of every region into a [`ContourSet`].
    ///
    /// `max_error` is the Douglas-Peucker threshold in voxel units;
    /// `max_edge_len` subdivides long edges past that length in voxels (`0`
    /// disables it).
    pub fn build_contours(
        &self,
        max_error: f32,
        max_edge_len: u16,
        build_flags: BuildContoursFlags,
    ) -> ContourSet {
        let mut aabb = self.aabb;
        let w = self.width;
        let h = self.height;
        if self.border_size > 0 {
            let pad = self.border_size as f32 * self.cell_size;
            aabb.min.x += pad;
            aabb.min.z += pad;
            aabb.max.x -= pad;
            aabb.max.z -= pad;
        }

        let mut flags = vec![0u8; self.spans.len()];
        for z in 0..h {
            for x in 0..w {
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    let span = self.spans[i];
                    let region = span.region;
                    if region.is_none() || region.is_border() {
                        flags[i] = 0;
                        continue;
                    }
                    let mut res = 0u8;
                    for dir in 0..4u8 {
                        let mut neighbor_region = Region::NONE;
                        if let Some(con) = span.con(dir) {
                            let ni = self.neighbor_index(x, z, dir, con);
                            neighbor_region = self.spans[ni].region;
                        }
                        if neighbor_region == region {
                            res |= 1 << dir;
                        }
                    }
                    // Invert: a set bit now means "this direction is a
                    // contour edge" rather than "same region".
                    flags[i] = res ^ 0xf;
                }
            }
        }

        let mut contours: Vec<Contour> = Vec::new();
        let mut raw_verts: Vec<ContourVertex> = Vec::with_capacity(256);
        let mut simplified: Vec<ContourVertex> = Vec::with_capacity(64);

        for z in 0..h {
            for x in 0..w {
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    if flags[i] == 0 || flags[i] == 0xf {
                        flags[i] = 0;
                        continue;
                    }
                    let region = self.spans[i].region;
                    if region.is_none() || region.is_border() {
                        continue;
                    }
                    let area = self.areas[i];

                    raw_verts.clear();
                    self.walk_contour(x, z, i, &mut flags, &mut raw_verts);
                    if raw_verts.len() < 3 {
                        continue;
                    }

                    simplified.clear();
                    simplify_contour(
                        &raw_verts,
                        &mut simplified,
                        max_error,
                        max_edge_len,
                        build_flags,
                    );
                    remove_degenerate_segments(&mut simplified);
                    if simplified.len() < 3 {
                        continue;
                    }

                    contours.push(Contour {
                        verts: simplified.clone(),
                        raw_verts: raw_verts.clone(),
                        region,
                        area,
                    });
                }
            }
        }

        ContourSet {
            contours,
            aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            width: w.saturating_sub(self.border_size * 2),
            height: h.saturating_sub(self.border_size * 2),
            border_size: self.border_size,
            max_error,
        }
    }

    /// Walks clockwise around the boundary of the region touching span `i`
    /// at `(x, z)`, starting from the first boundary direction, emitting one
    /// raw vertex per boundary edge.
    fn walk_contour(
        &self,
        mut x: u16,
        mut z: u16,
        mut i: usize,
        flags: &mut [u8],
        points: &mut Vec<ContourVertex>,
    ) {
        let mut dir = 0u8;
        while flags[i] & (1 << dir) == 0 {
            dir += 1;
        }

        let start_dir = dir;
        let start_i = i;

        for _ in 0..40_000 {
            if flags[i] & (1 << dir) != 0 {
                let (px, pz) = corner_offset(x, z, dir);
                let py = self.corner_height(x, z, i, dir);

                let mut neighbor_region = Region::NONE;
                if let Some(con) = self.spans[i].con(dir) {
                    let ni = self.neighbor_index(x, z, dir, con);
                    neighbor_region = self.spans[ni].region;
                }
                points.push(ContourVertex {
                    x: px as i32,
                    y: py as i32,
                    z: pz as i32,
                    neighbor_region,
                });

                flags[i] &= !(1 << dir);
                dir = (dir + 1) & 0x3;
            } else {
                let Some(con) = self.spans[i].con(dir) else {
                    break;
                };
                let nx = (x as i32 + dir_offset_x(dir) as i32) as u16;
                let nz = (z as i32 + dir_offset_z(dir) as i32) as u16;
                let ni = self.cell_at(nx, nz).index() as usize + con as usize;
                x = nx;
                z = nz;
                i = ni;
                dir = (dir + 3) & 0x3;
            }

            if i == start_i && dir == start_dir {
                break;
            }
        }
    }

    /// The height of the corner of cell `(x, z)` in direction `dir`,
    /// taking the highest of the up-to-4 spans that share that corner so
    /// seams between regions agree on a single height.
    fn corner_height(&self, x: u16, z: u16, i: usize, dir: u8) -> u16 {
        let span = self.spans[i];
        let mut height = span.y;
        let dir_next = (dir + 1) & 0x3;

        if let Some(con) = span.con(dir) {
            let ax = (x as i32 + dir_offset_x(dir) as i32) as u16;
            let az = (z as i32 + dir_offset_z(dir) as i32) as u16;
            let ai = self.cell_at(ax, az).index() as usize + con as usize;
            let a_span = self.spans[ai];
            height = height.max(a_span.y);
            if let Some(con2) = a_span.con(dir_next) {
                let bx = (ax as i32 + dir_offset_x(dir_next) as i32) as u16;
                let bz = (az as i32 + dir_offset_z(dir_next) as i32) as u16;
                let bi = self.cell_at(bx, bz).index() as usize + con2 as usize;
                height = height.max(self.spans[bi].y);
            }
        }
        if let Some(con) = span.con(dir_next) {
            let ax = (x as i32 + dir_offset_x(dir_next) as i32) as u16;
            let az = (z as i32 + dir_offset_z(dir_next) as i32) as u16;
            let ai = self.cell_at(ax, az).index() as usize + con as usize;
            let a_span = self.spans[ai];
            height = height.max(a_span.y);
            if let Some(con2) = a_span.con(dir) {
                let bx = (ax as i32 + dir_offset_x(dir) as i32) as u16;
                let bz = (az as i32 + dir_offset_z(dir) as i32) as u16;
                let bi = self.cell_at(bx, bz).index() as usize + con2 as usize;
                height = height.max(self.spans[bi].y);
            }
        }
        height
    }
}

/// The voxel-grid corner of cell `(x, z)` touched when walking in `dir`.
fn corner_offset(x: u16, z: u16, dir: u8) -> (u16, u16) {
    match dir & 0x3 {
        0 => (x, z + 1),
        1 => (x + 1, z + 1),
        2 => (x + 1, z),
        _ => (x, z),
    }
}

fn dist_point_to_segment_2d(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let pqx = b.0 - a.0;
    let pqz = b.1 - a.1;
    let mut dx = p.0 - a.0;
    let mut dz = p.1 - a.1;
    let d = pqx * pqx + pqz * pqz;
    let mut t = pqx * dx + pqz * dz;
    if d > 0.0 {
        t /= d;
    }
    t = t.clamp(0.0, 1.0);
    dx = a.0 + t * pqx - p.0;
    dz = a.1 + t * pqz - p.1;
    dx * dx + dz * dz
}

/// Douglas-Peucker simplification of one raw contour, keeping mandatory
/// vertices (region changes, border edges) exactly and subdividing long
/// wall edges past `max_edge_len` when requested.
fn simplify_contour(
    raw: &[ContourVertex],
    simplified: &mut Vec<ContourVertex>,
    max_error: f32,
    max_edge_len: u16,
    flags: BuildContoursFlags,
) {
    let n = raw.len();

    let has_connections = raw.iter().any(|v| !v.neighbor_region.is_none());

    if has_connections {
        for i in 0..n {
            let next = (i + 1) % n;
            if raw[i].neighbor_region != raw[next].neighbor_region {
                simplified.push(raw[i]);
            }
        }
    }

    if simplified.is_empty() {
        // No portals anywhere: this region forms an island. Seed with the
        // two extreme corners so DP has somewhere to start from.
        let (mut min_i, mut max_i) = (0usize, 0usize);
        let (mut min_v, mut max_v) = ((raw[0].x, raw[0].z), (raw[0].x, raw[0].z));
        for (i, v) in raw.iter().enumerate() {
            if (v.x, v.z) < min_v {
                min_v = (v.x, v.z);
                min_i = i;
            }
            if (v.x, v.z) > max_v {
                max_v = (v.x, v.z);
                max_i = i;
            }
        }
        simplified.push(raw[min_i]);
        simplified.push(raw[max_i]);
    }

    // Douglas-Peucker between each pair of consecutive mandatory vertices,
    // tracking the raw index each simplified vertex came from so we can
    // walk the gap.
    let mandatory_indices: Vec<usize> = simplified
        .iter()
        .map(|v| raw.iter().position(|r| r == v).unwrap_or(0))
        .collect();

    let mut result: Vec<ContourVertex> = Vec::with_capacity(simplified.len() * 2);
    let m = mandatory_indices.len();
    for k in 0..m {
        let start = mandatory_indices[k];
        let end = mandatory_indices[(k + 1) % m];
        result.push(raw[start]);
        simplify_segment(raw, start, end, max_error, &mut result);
    }

    if flags.contains(BuildContoursFlags::TESSELLATE_WALL_EDGES) && max_edge_len > 0 {
        tessellate_long_edges(raw, &mut result, max_edge_len, flags);
    }

    *simplified = result;
}

/// Recursive Douglas-Peucker over the raw polyline segment from `start` to
/// `end` (cyclic indices into `raw`), appending newly-kept interior points
/// (but not `start`/`end` themselves) to `out` in order.
fn simplify_segment(
    raw: &[ContourVertex],
    start: usize,
    end: usize,
    max_error: f32,
    out: &mut Vec<ContourVertex>,
) {
    let n = raw.len();
    if ((end + n - start) % n) <= 1 {
        return;
    }

    let a = (raw[start].x as f32, raw[start].z as f32);
    let b = (raw[end].x as f32, raw[end].z as f32);

    let mut max_dist = 0.0f32;
    let mut max_idx = None;
    let mut idx = (start + 1) % n;
    while idx != end {
        let p = (raw[idx].x as f32, raw[idx].z as f32);
        let d = dist_point_to_segment_2d(p, a, b);
        if d > max_dist {
            max_dist = d;
            max_idx = Some(idx);
        }
        idx = (idx + 1) % n;
    }

    if let Some(idx) = max_idx {
        if max_dist > max_error * max_error {
            simplify_segment(raw, start, idx, max_error, out);
            out.push(raw[idx]);
            simplify_segment(raw, idx, end, max_error, out);
        }
    }
}

/// Subdivides segments of `verts` longer than `max_edge_len` voxels,
/// choosing the subdivision point from the raw polyline with the least
/// deviation from the straight edge.
fn tessellate_long_edges(
    raw: &[ContourVertex],
    verts: &mut Vec<ContourVertex>,
    max_edge_len: u16,
    flags: BuildContoursFlags,
) {
    let n = raw.len();
    let mut result = Vec::with_capacity(verts.len() * 2);
    let vn = verts.len();
    for k in 0..vn {
        let v0 = verts[k];
        let v1 = verts[(k + 1) % vn];
        result.push(v0);

        let is_wall_edge = v0.neighbor_region.is_none();
        if is_wall_edge && flags.contains(BuildContoursFlags::TESSELLATE_WALL_EDGES) {
            let dx = (v1.x - v0.x) as f32;
            let dz = (v1.z - v0.z) as f32;
            let len = libm_sqrt(dx * dx + dz * dz);
            if len > max_edge_len as f32 * 1.5 {
                let start = raw.iter().position(|r| *r == v0);
                let end = raw.iter().position(|r| *r == v1);
                if let (Some(start), Some(end)) = (start, end) {
                    let span = (end + n - start) % n;
                    let segments = (len / max_edge_len as f32).round().max(1.0) as usize;
                    for s in 1..segments {
                        let t = s as f32 / segments as f32;
                        let raw_idx = start + ((span as f32 * t).round() as usize % n.max(1));
                        result.push(raw[raw_idx % n]);
                    }
                }
            }
        }
    }
    *verts = result;
}

fn libm_sqrt(x: f32) -> f32 {
    crate::math::ops::sqrt(x)
}

fn remove_degenerate_segments(verts: &mut Vec<ContourVertex>) {
    let mut i = 0;
    while verts.len() > 3 && i < verts.len() {
        let next = (i + 1) % verts.len();
        if verts[i].x == verts[next].x && verts[i].z == verts[next].z {
            verts.remove(next);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, HeightfieldBuilder};
    use glam::Vec3;

    fn flat_region(size: u16) -> CompactHeightfield {
        let mut hf = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(size as f32, 4.0, size as f32)),
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
    fn single_region_produces_one_contour() {
        let chf = flat_region(8);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        assert_eq!(cset.contours.len(), 1);
        assert!(cset.contours[0].verts.len() >= 3);
    }

    #[test]
    fn contour_vertices_are_simplified_down_from_raw() {
        let chf = flat_region(16);
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let contour = &cset.contours[0];
        assert!(contour.verts.len() < contour.raw_verts.len());
        // A flat square region should simplify to its four corners.
        assert_eq!(contour.verts.len(), 4);
    }
}
