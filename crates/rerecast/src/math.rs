//! Shared geometric primitives used across the construction pipeline.

use alloc::vec::Vec;
use glam::{Vec2, Vec3, Vec3A};

/// An axis-aligned bounding box in the XZ plane, used for 2D footprint tests
/// (area marking, tile bounds).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb2d {
    /// The minimum corner.
    pub min: Vec2,
    /// The maximum corner.
    pub max: Vec2,
}

impl Aabb2d {
    /// Computes the bounding box of a set of XZ vertices. Returns `None` if
    /// `verts` is empty.
    pub fn from_verts(verts: &[Vec2]) -> Option<Self> {
        let mut iter = verts.iter();
        let first = *iter.next()?;
        let mut aabb = Aabb2d {
            min: first,
            max: first,
        };
        for &v in iter {
            aabb.min = aabb.min.min(v);
            aabb.max = aabb.max.max(v);
        }
        Some(aabb)
    }

    /// Widens this 2D footprint into a 3D box by attaching a Y range.
    pub fn extend_y(&self, min_y: f32, max_y: f32) -> Aabb3d {
        Aabb3d {
            min: Vec3::new(self.min.x, min_y, self.min.y),
            max: Vec3::new(self.max.x, max_y, self.max.y),
        }
    }
}

/// An axis-aligned bounding box in world space.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3d {
    /// The minimum corner.
    pub min: Vec3,
    /// The maximum corner.
    pub max: Vec3,
}

impl Aabb3d {
    /// Creates a new AABB from a min and max corner.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Computes the bounding box of a set of vertices. Returns `None` if
    /// `verts` is empty.
    pub fn from_verts(verts: &[Vec3A]) -> Option<Self> {
        let mut iter = verts.iter();
        let first = iter.next()?.into();
        let mut aabb = Aabb3d {
            min: first,
            max: first,
        };
        for v in iter {
            let v: Vec3 = (*v).into();
            aabb.min = aabb.min.min(v);
            aabb.max = aabb.max.max(v);
        }
        Some(aabb)
    }

    /// Grows the AABB to contain `other`.
    pub fn union(&self, other: &Aabb3d) -> Aabb3d {
        Aabb3d {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True if `point` lies within the box (inclusive).
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// True if the two boxes overlap on all three axes.
    pub fn overlaps(&self, other: &Aabb3d) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// The four grid directions used throughout the voxel pipeline, matching the
/// classic winding: 0 = -X, 1 = +Z, 2 = +X, 3 = -Z.
pub fn dir_offset_x(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [-1, 0, 1, 0];
    OFFSET[(direction & 0x3) as usize]
}

/// See [`dir_offset_x`].
pub fn dir_offset_z(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [0, 1, 0, -1];
    OFFSET[(direction & 0x3) as usize]
}

/// Rotates a direction index by 90 degrees clockwise.
pub fn rotate_cw(direction: u8) -> u8 {
    (direction + 1) & 0x3
}

/// Rotates a direction index by 90 degrees counter-clockwise.
pub fn rotate_ccw(direction: u8) -> u8 {
    (direction + 3) & 0x3
}

/// 2D cross product of `(b - a)` and `(c - a)`, using the XZ plane. Positive
/// when `a, b, c` are wound counter-clockwise.
pub fn triangle_area_2d(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let acx = c.x - a.x;
    let acy = c.y - a.y;
    acx * aby - abx * acy
}

/// Math helpers that need a `libm` fallback on `no_std` targets without the
/// `std` feature.
pub mod ops {
    #[cfg(feature = "std")]
    pub fn ceil(x: f32) -> f32 {
        x.ceil()
    }

    #[cfg(all(not(feature = "std"), feature = "libm"))]
    pub fn ceil(x: f32) -> f32 {
        libm::ceilf(x)
    }

    #[cfg(feature = "std")]
    pub fn floor(x: f32) -> f32 {
        x.floor()
    }

    #[cfg(all(not(feature = "std"), feature = "libm"))]
    pub fn floor(x: f32) -> f32 {
        libm::floorf(x)
    }

    #[cfg(feature = "std")]
    pub fn sqrt(x: f32) -> f32 {
        x.sqrt()
    }

    #[cfg(all(not(feature = "std"), feature = "libm"))]
    pub fn sqrt(x: f32) -> f32 {
        libm::sqrtf(x)
    }

    #[cfg(feature = "std")]
    pub fn abs(x: f32) -> f32 {
        x.abs()
    }

    #[cfg(all(not(feature = "std"), feature = "libm"))]
    pub fn abs(x: f32) -> f32 {
        libm::fabsf(x)
    }

    #[cfg(feature = "std")]
    pub fn cos(x: f32) -> f32 {
        x.cos()
    }

    #[cfg(all(not(feature = "std"), feature = "libm"))]
    pub fn cos(x: f32) -> f32 {
        libm::cosf(x)
    }

    #[cfg(feature = "std")]
    pub fn sin(x: f32) -> f32 {
        x.sin()
    }

    #[cfg(all(not(feature = "std"), feature = "libm"))]
    pub fn sin(x: f32) -> f32 {
        libm::sinf(x)
    }

    /// Cosine of an angle given in degrees.
    pub fn cos_deg(degrees: f32) -> f32 {
        cos(degrees.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_offsets_form_a_loop() {
        for dir in 0..4u8 {
            let x = dir_offset_x(dir);
            let z = dir_offset_z(dir);
            assert_eq!(x.unsigned_abs() + z.unsigned_abs(), 1);
        }
    }

    #[test]
    fn aabb_union_grows_to_fit() {
        let a = Aabb3d::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb3d::new(Vec3::new(-1.0, 0.0, 0.5), Vec3::new(0.5, 2.0, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Vec3::new(1.0, 2.0, 2.0));
    }

    #[test]
    fn triangle_area_sign_matches_winding() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        let c = Vec2::new(0.0, 1.0);
        assert!(triangle_area_2d(a, b, c) > 0.0);
        assert!(triangle_area_2d(a, c, b) < 0.0);
    }
}
