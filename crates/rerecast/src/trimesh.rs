//! Input geometry: a triangle soup plus a per-triangle [`AreaType`].

use alloc::vec::Vec;
use glam::{UVec3, Vec3A};

use crate::{Aabb3d, AreaType, math::ops};

/// A triangle mesh to be voxelized, with one [`AreaType`] per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3A>,
    /// Triangles as index triples into `vertices`.
    pub indices: Vec<UVec3>,
    /// One area type per triangle, parallel to `indices`. Populate with
    /// [`TriMesh::mark_walkable_triangles`] or set manually for custom area
    /// assignment (e.g. pre-tagging water or road triangles).
    pub area_types: Vec<AreaType>,
}

impl TriMesh {
    /// Computes the bounding box of all vertices. Returns `None` if the mesh
    /// has no vertices.
    pub fn compute_aabb(&self) -> Option<Aabb3d> {
        Aabb3d::from_verts(&self.vertices)
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Marks triangles as [`AreaType::DEFAULT_WALKABLE`] if their slope is
    /// shallower than `walkable_slope_angle_degrees`, and
    /// [`AreaType::NOT_WALKABLE`] otherwise. Resizes `area_types` to match
    /// `indices` if necessary, preserving any entries already set beyond
    /// what this pass would assign (a triangle already marked non-default
    /// walkable, e.g. as water, keeps its area if it also passes the slope
    /// test only when it was `NOT_WALKABLE` before the call).
    pub fn mark_walkable_triangles(&mut self, walkable_slope_angle_degrees: f32) {
        if self.area_types.len() != self.indices.len() {
            self.area_types = alloc::vec![AreaType::NOT_WALKABLE; self.indices.len()];
        }

        let walkable_thr = ops::cos_deg(walkable_slope_angle_degrees);

        for (tri, area) in self.indices.iter().zip(self.area_types.iter_mut()) {
            let a = self.vertices[tri.x as usize];
            let b = self.vertices[tri.y as usize];
            let c = self.vertices[tri.z as usize];
            let e0 = b - a;
            let e1 = c - a;
            let normal = e0.cross(e1).normalize_or_zero();
            // normal.y is cos(slope), since Y is up.
            if normal.y > walkable_thr {
                *area = AreaType::DEFAULT_WALKABLE;
            } else {
                *area = AreaType::NOT_WALKABLE;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_quad() -> TriMesh {
        let vertices = alloc::vec![
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.0, 0.0, 1.0),
            Vec3A::new(1.0, 0.0, 1.0),
        ];
        let indices = alloc::vec![UVec3::new(0, 2, 1), UVec3::new(1, 2, 3)];
        TriMesh {
            vertices,
            indices,
            area_types: Vec::new(),
        }
    }

    #[test]
    fn flat_ground_is_walkable() {
        let mut mesh = flat_quad();
        mesh.mark_walkable_triangles(45.0);
        assert!(mesh.area_types.iter().all(|a| a.is_walkable()));
    }

    #[test]
    fn vertical_wall_is_not_walkable() {
        let vertices = alloc::vec![
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
            Vec3A::new(1.0, 0.0, 0.0),
        ];
        let mut mesh = TriMesh {
            vertices,
            indices: alloc::vec![UVec3::new(0, 1, 2)],
            area_types: Vec::new(),
        };
        mesh.mark_walkable_triangles(45.0);
        assert!(!mesh.area_types[0].is_walkable());
    }

    #[test]
    fn compute_aabb_matches_bounds() {
        let mesh = flat_quad();
        let aabb = mesh.compute_aabb().unwrap();
        assert_eq!(aabb.min, glam::Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, glam::Vec3::new(1.0, 0.0, 1.0));
    }
}
