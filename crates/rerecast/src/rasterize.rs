//! Triangle-to-span rasterization.
//!
//! Each triangle is clipped against the XZ footprint of every grid cell it
//! overlaps (Sutherland-Hodgman, clipping against the four half-planes of
//! the cell's square), and the clipped polygon's Y extent becomes a solid
//! span in that cell.

use alloc::vec::Vec;
use glam::Vec3A;

use crate::{
    Heightfield, RasterizationError, TriMesh,
    math::ops::{ceil, floor},
};

impl Heightfield {
    /// Rasterizes every triangle of `trimesh` into this heightfield.
    pub fn rasterize_trimesh(&mut self, trimesh: &TriMesh) -> Result<(), RasterizationError> {
        if trimesh.area_types.len() != trimesh.indices.len() {
            return Err(RasterizationError::AreaTypeCountMismatch {
                triangle_count: trimesh.indices.len(),
                area_count: trimesh.area_types.len(),
            });
        }

        for (tri, &area) in trimesh.indices.iter().zip(trimesh.area_types.iter()) {
            if !area.is_walkable() {
                continue;
            }
            let a = trimesh.vertices[tri.x as usize];
            let b = trimesh.vertices[tri.y as usize];
            let c = trimesh.vertices[tri.z as usize];
            self.rasterize_triangle(a, b, c, area);
        }
        Ok(())
    }

    fn rasterize_triangle(&mut self, a: Vec3A, b: Vec3A, c: Vec3A, area: crate::AreaType) {
        let tri_min = a.min(b).min(c);
        let tri_max = a.max(b).max(c);

        if tri_max.x < self.aabb.min.x
            || tri_min.x > self.aabb.max.x
            || tri_max.z < self.aabb.min.z
            || tri_min.z > self.aabb.max.z
        {
            return;
        }

        let inv_cell_size = 1.0 / self.cell_size;
        let inv_cell_height = 1.0 / self.cell_height;

        let x0 = (floor((tri_min.x - self.aabb.min.x) * inv_cell_size) as i32).max(0);
        let x1 = (floor((tri_max.x - self.aabb.min.x) * inv_cell_size) as i32)
            .min(self.width as i32 - 1);
        let z0 = (floor((tri_min.z - self.aabb.min.z) * inv_cell_size) as i32).max(0);
        let z1 = (floor((tri_max.z - self.aabb.min.z) * inv_cell_size) as i32)
            .min(self.height as i32 - 1);
        if x0 > x1 || z0 > z1 {
            return;
        }

        let by = self.aabb.max.y;
        let ymin_world = self.aabb.min.y;

        let mut poly: Vec<Vec3A> = alloc::vec![a, b, c];
        let mut scratch = Vec::with_capacity(8);

        for z in z0..=z1 {
            let cell_z0 = self.aabb.min.z + z as f32 * self.cell_size;
            let cell_z1 = cell_z0 + self.cell_size;

            let mut row = poly.clone();
            clip_polygon(&mut row, &mut scratch, 1.0, 0.0, -cell_z0); // keep z >= cell_z0
            if row.len() < 3 {
                continue;
            }
            clip_polygon(&mut row, &mut scratch, -1.0, 0.0, cell_z1); // keep z <= cell_z1
            if row.len() < 3 {
                continue;
            }

            for x in x0..=x1 {
                let cell_x0 = self.aabb.min.x + x as f32 * self.cell_size;
                let cell_x1 = cell_x0 + self.cell_size;

                let mut cell_poly = row.clone();
                clip_polygon(&mut cell_poly, &mut scratch, 1.0, 1.0, -cell_x0);
                if cell_poly.len() < 3 {
                    continue;
                }
                clip_polygon(&mut cell_poly, &mut scratch, -1.0, 1.0, cell_x1);
                if cell_poly.len() < 3 {
                    continue;
                }

                let mut span_min = f32::MAX;
                let mut span_max = f32::MIN;
                for v in &cell_poly {
                    span_min = span_min.min(v.y);
                    span_max = span_max.max(v.y);
                }
                span_min = span_min.max(ymin_world);
                span_max = span_max.min(by);
                if span_min > span_max {
                    continue;
                }

                let voxel_min =
                    (floor((span_min - self.aabb.min.y) * inv_cell_height) as i32).max(0);
                let voxel_max = ((ceil((span_max - self.aabb.min.y) * inv_cell_height) as i32)
                    .max(voxel_min + 1)) as u16;
                let voxel_min = voxel_min as u16;
                if voxel_min >= voxel_max {
                    continue;
                }
                self.add_span(x as u16, z as u16, voxel_min, voxel_max, area);
            }
        }

        let _ = &mut poly;
    }
}

/// Clips a convex polygon against the half-plane `nx*x + nz*z + d >= 0`,
/// where the plane test is evaluated on the vertex's `(x, z)` components.
/// `scratch` is reused across calls to avoid reallocating.
fn clip_polygon(poly: &mut Vec<Vec3A>, scratch: &mut Vec<Vec3A>, nx: f32, nz: f32, d: f32) {
    scratch.clear();
    if poly.is_empty() {
        return;
    }
    let distance = |v: &Vec3A| nx * v.x + nz * v.z + d;

    let mut prev = poly[poly.len() - 1];
    let mut prev_dist = distance(&prev);

    for &cur in poly.iter() {
        let cur_dist = distance(&cur);
        if cur_dist >= 0.0 {
            if prev_dist < 0.0 {
                let t = prev_dist / (prev_dist - cur_dist);
                scratch.push(prev + (cur - prev) * t);
            }
            scratch.push(cur);
        } else if prev_dist >= 0.0 {
            let t = prev_dist / (prev_dist - cur_dist);
            scratch.push(prev + (cur - prev) * t);
        }
        prev = cur;
        prev_dist = cur_dist;
    }

    core::mem::swap(poly, scratch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Aabb3d, AreaType, HeightfieldBuilder};
    use glam::{UVec3, Vec3};

    #[test]
    fn flat_triangle_fills_expected_columns() {
        let mut hf = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(4.0, 4.0, 4.0)),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();

        let trimesh = TriMesh {
            vertices: alloc::vec![
                Vec3A::new(0.0, 1.0, 0.0),
                Vec3A::new(4.0, 1.0, 0.0),
                Vec3A::new(0.0, 1.0, 4.0),
            ],
            indices: alloc::vec![UVec3::new(0, 1, 2)],
            area_types: alloc::vec![AreaType::DEFAULT_WALKABLE],
        };

        hf.rasterize_trimesh(&trimesh).unwrap();

        assert!(hf.column(0, 0).is_some());
        assert!(hf.column(3, 3).is_none() || hf.column(0, 3).is_some());
    }

    #[test]
    fn triangle_outside_bounds_is_skipped() {
        let mut hf = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(4.0, 4.0, 4.0)),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();

        let trimesh = TriMesh {
            vertices: alloc::vec![
                Vec3A::new(10.0, 1.0, 10.0),
                Vec3A::new(14.0, 1.0, 10.0),
                Vec3A::new(10.0, 1.0, 14.0),
            ],
            indices: alloc::vec![UVec3::new(0, 1, 2)],
            area_types: alloc::vec![AreaType::DEFAULT_WALKABLE],
        };

        hf.rasterize_trimesh(&trimesh).unwrap();
        for z in 0..hf.height {
            for x in 0..hf.width {
                assert!(hf.column(x, z).is_none());
            }
        }
    }
}
