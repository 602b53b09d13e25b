//! Box, cylinder and rotated-box area marking, siblings of
//! [`crate::mark_convex_poly_area::ConvexVolume`] for the common cases where
//! an exact convex hull is unnecessary.

use glam::{Vec2, Vec3};

use crate::{AreaType, CompactHeightfield};

impl CompactHeightfield {
    /// Sets the [`AreaType`] of every compact span whose floor lies within
    /// the axis-aligned box `[min, max]`.
    pub fn mark_box_area(&mut self, min: Vec3, max: Vec3, area: AreaType) {
        self.mark_footprint(min, max, area, |point, min, max| {
            point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
        });
    }

    /// Sets the [`AreaType`] of every compact span whose floor lies within
    /// `radius` of `(center.x, center.z)` and between `center.y - half_height`
    /// and `center.y + half_height`.
    pub fn mark_cylinder_area(
        &mut self,
        center: Vec3,
        radius: f32,
        half_height: f32,
        area: AreaType,
    ) {
        let min = Vec3::new(center.x - radius, center.y - half_height, center.z - radius);
        let max = Vec3::new(center.x + radius, center.y + half_height, center.z + radius);
        let radius_sq = radius * radius;
        self.mark_footprint(min, max, area, move |point, _min, _max| {
            let dx = point.x - center.x;
            let dz = point.y - center.z;
            dx * dx + dz * dz <= radius_sq
        });
    }

    /// Sets the [`AreaType`] of every compact span whose floor lies within
    /// a box of half-extents `half_extents` centered at `center` and rotated
    /// `rotation_y_radians` around the Y axis.
    pub fn mark_rotated_box_area(
        &mut self,
        center: Vec3,
        half_extents: Vec2,
        rotation_y_radians: f32,
        min_y: f32,
        max_y: f32,
        area: AreaType,
    ) {
        let (sin, cos) = (
            crate::math::ops::sin(rotation_y_radians),
            crate::math::ops::cos(rotation_y_radians),
        );
        let extent = (half_extents.x.powi(2) + half_extents.y.powi(2)).sqrt();
        let min = Vec3::new(center.x - extent, min_y, center.z - extent);
        let max = Vec3::new(center.x + extent, max_y, center.z + extent);

        self.mark_footprint(min, max, area, move |point, _min, _max| {
            let dx = point.x - center.x;
            let dz = point.y - center.z;
            // Rotate the test point into the box's local frame.
            let local_x = dx * cos + dz * sin;
            let local_z = -dx * sin + dz * cos;
            local_x.abs() <= half_extents.x && local_z.abs() <= half_extents.y
        });
    }

    fn mark_footprint(
        &mut self,
        min: Vec3,
        max: Vec3,
        area: AreaType,
        test: impl Fn(Vec2, Vec3, Vec3) -> bool,
    ) {
        let inv_cell_size = 1.0 / self.cell_size;
        let inv_cell_height = 1.0 / self.cell_height;

        let grid_min_x = ((min.x - self.aabb.min.x) * inv_cell_size).floor() as i32;
        let grid_max_x = ((max.x - self.aabb.min.x) * inv_cell_size).floor() as i32;
        let grid_min_z = ((min.z - self.aabb.min.z) * inv_cell_size).floor() as i32;
        let grid_max_z = ((max.z - self.aabb.min.z) * inv_cell_size).floor() as i32;

        if grid_max_x < 0
            || grid_min_x >= self.width as i32
            || grid_max_z < 0
            || grid_min_z >= self.height as i32
        {
            return;
        }

        let x0 = grid_min_x.max(0);
        let x1 = grid_max_x.min(self.width as i32 - 1);
        let z0 = grid_min_z.max(0);
        let z1 = grid_max_z.min(self.height as i32 - 1);

        let min_y = ((min.y - self.aabb.min.y) * inv_cell_height) as i32;
        let max_y = ((max.y - self.aabb.min.y) * inv_cell_height) as i32;

        for z in z0..=z1 {
            let point_z = self.aabb.min.z + (z as f32 + 0.5) * self.cell_size;
            for x in x0..=x1 {
                let point = Vec2::new(
                    self.aabb.min.x + (x as f32 + 0.5) * self.cell_size,
                    point_z,
                );
                if !test(point, min, max) {
                    continue;
                }
                let cell = self.cell_at(x as u16, z as u16);
                for i in cell.range() {
                    if !self.areas[i].is_walkable() {
                        continue;
                    }
                    let span_y = self.spans[i].y as i32;
                    if span_y < min_y || span_y > max_y {
                        continue;
                    }
                    self.areas[i] = area;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Aabb3d, HeightfieldBuilder};
    use glam::Vec3;

    fn flat_compact() -> CompactHeightfield {
        let mut hf = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(10.0, 4.0, 10.0)),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        for z in 0..10 {
            for x in 0..10 {
                hf.add_span(x, z, 0, 2, AreaType::DEFAULT_WALKABLE);
            }
        }
        hf.into_compact(2, 1).unwrap()
    }

    #[test]
    fn box_area_marks_only_inside_spans() {
        let mut chf = flat_compact();
        chf.mark_box_area(
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(4.0, 3.0, 4.0),
            AreaType(5),
        );
        let inside = chf.cell_at(3, 3).index() as usize;
        let outside = chf.cell_at(8, 8).index() as usize;
        assert_eq!(chf.areas[inside], AreaType(5));
        assert_ne!(chf.areas[outside], AreaType(5));
    }

    #[test]
    fn cylinder_area_is_circular() {
        let mut chf = flat_compact();
        chf.mark_cylinder_area(Vec3::new(5.0, 1.0, 5.0), 1.5, 2.0, AreaType(7));
        let center = chf.cell_at(5, 5).index() as usize;
        let corner = chf.cell_at(0, 0).index() as usize;
        assert_eq!(chf.areas[center], AreaType(7));
        assert_ne!(chf.areas[corner], AreaType(7));
    }
}
