//! The uncompacted voxel heightfield: one column of stacked solid [`Span`]s
//! per XZ grid cell.

use alloc::vec::Vec;
use glam::Vec3;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    Aabb3d, AreaType, Span, SpanKey, TriMesh,
    math::ops::ceil,
};

/// A voxelized representation of solid geometry, organized as a 2D grid of
/// columns, each column holding a linked list of solid [`Span`]s.
#[derive(Debug, Clone)]
pub struct Heightfield {
    /// The world-space bounds of the grid.
    pub aabb: Aabb3d,
    /// The size of a cell on the XZ plane, in world units.
    pub cell_size: f32,
    /// The height of a cell, in world units.
    pub cell_height: f32,
    /// Grid width along X, in cells.
    pub width: u16,
    /// Grid height along Z, in cells.
    pub height: u16,
    /// The first (lowest) span in each column, indexed by `x + z * width`.
    pub(crate) columns: Vec<Option<SpanKey>>,
    /// The arena backing every span referenced by `columns`.
    pub(crate) spans: SlotMap<SpanKey, Span>,
}

/// Builder for [`Heightfield`], deriving grid dimensions from a world-space
/// bounding box and a cell size.
#[derive(Debug, Clone, Copy)]
pub struct HeightfieldBuilder {
    /// The world-space bounds the heightfield should cover.
    pub aabb: Aabb3d,
    /// The size of a cell on the XZ plane, in world units.
    pub cell_size: f32,
    /// The height of a cell, in world units.
    pub cell_height: f32,
}

/// Errors from [`HeightfieldBuilder::build`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum HeightfieldBuilderError {
    /// `cell_size` was zero or negative.
    #[error("cell_size must be positive, got {0}")]
    InvalidCellSize(f32),
    /// `cell_height` was zero or negative.
    #[error("cell_height must be positive, got {0}")]
    InvalidCellHeight(f32),
    /// The AABB's min and max were degenerate or inverted on some axis.
    #[error("aabb is degenerate or inverted: min {min:?}, max {max:?}")]
    InvalidAabb {
        /// The AABB's minimum corner.
        min: Vec3,
        /// The AABB's maximum corner.
        max: Vec3,
    },
}

impl HeightfieldBuilder {
    /// Builds a [`Heightfield`], computing `width` and `height` from the
    /// AABB and cell size.
    pub fn build(self) -> Result<Heightfield, HeightfieldBuilderError> {
        if self.cell_size <= 0.0 {
            return Err(HeightfieldBuilderError::InvalidCellSize(self.cell_size));
        }
        if self.cell_height <= 0.0 {
            return Err(HeightfieldBuilderError::InvalidCellHeight(self.cell_height));
        }
        let size = self.aabb.max - self.aabb.min;
        if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
            return Err(HeightfieldBuilderError::InvalidAabb {
                min: self.aabb.min,
                max: self.aabb.max,
            });
        }
        let width = ceil(size.x / self.cell_size) as u16;
        let height = ceil(size.z / self.cell_size) as u16;
        Ok(Heightfield {
            aabb: self.aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            width,
            height,
            columns: alloc::vec![None; width as usize * height as usize],
            spans: SlotMap::with_key(),
        })
    }
}

impl Heightfield {
    /// Index of the column at grid coordinates `(x, z)`.
    #[inline]
    pub fn column_index(&self, x: u16, z: u16) -> usize {
        x as usize + z as usize * self.width as usize
    }

    /// Returns the first span in the column at `(x, z)`, if any.
    pub fn column(&self, x: u16, z: u16) -> Option<SpanKey> {
        self.columns[self.column_index(x, z)]
    }

    /// Inserts a solid span `[min, max)` of the given area into the column at
    /// `(x, z)`, merging with any existing spans it overlaps or touches
    /// within [`Span::MERGE_THRESHOLD`] voxels.
    pub fn add_span(&mut self, x: u16, z: u16, min: u16, max: u16, area: AreaType) {
        debug_assert!(min < max);
        let index = self.column_index(x, z);

        let mut min = min;
        let mut max = max;
        let mut area = area;

        let mut prev_key: Option<SpanKey> = None;
        let mut cur_key = self.columns[index];

        while let Some(key) = cur_key {
            let cur = self.spans[key];
            if cur.min as u32 > max as u32 + Span::MERGE_THRESHOLD as u32 {
                // Current span starts after ours, with a gap. Insert before it.
                break;
            }
            if (cur.max as u32) + Span::MERGE_THRESHOLD as u32 < min as u32 {
                // Current span ends well before ours. Keep walking.
                prev_key = Some(key);
                cur_key = cur.next;
                continue;
            }

            // Overlapping or touching: merge, keep the area of whichever
            // span reaches higher (matches the classic rasterizer's rule of
            // attributing area to the top-most contributing triangle).
            if cur.max > max {
                area = cur.area;
            } else if cur.max == max {
                area = AreaType(area.0.max(cur.area.0));
            }
            min = min.min(cur.min);
            max = max.max(cur.max);

            // Remove the merged span and continue from what follows it.
            let next = cur.next;
            self.spans.remove(key);
            if let Some(prev) = prev_key {
                self.spans[prev].next = next;
            } else {
                self.columns[index] = next;
            }
            cur_key = next;
        }

        let new_key = self.spans.insert(Span {
            min,
            max,
            area,
            next: cur_key,
        });
        if let Some(prev) = prev_key {
            self.spans[prev].next = Some(new_key);
        } else {
            self.columns[index] = Some(new_key);
        }
    }

    /// Rasterizes `trimesh` into this heightfield and runs the standard
    /// span filters (low-hanging obstacles, ledges, low-clearance spans).
    pub fn populate_from_trimesh(
        &mut self,
        trimesh: TriMesh,
        walkable_height: u16,
        walkable_climb: u16,
    ) -> Result<(), RasterizationError> {
        self.rasterize_trimesh(&trimesh)?;
        self.filter_low_hanging_walkable_obstacles(walkable_climb);
        self.filter_ledge_spans(walkable_height, walkable_climb);
        self.filter_walkable_low_height_spans(walkable_height);
        Ok(())
    }

    /// Iterates every span in the heightfield as `(x, z, SpanKey)`.
    pub(crate) fn iter_spans(&self) -> impl Iterator<Item = (u16, u16, SpanKey)> + '_ {
        (0..self.height).flat_map(move |z| {
            (0..self.width).flat_map(move |x| {
                let mut key = self.column(x, z);
                core::iter::from_fn(move || {
                    let k = key?;
                    key = self.spans[k].next;
                    Some((x, z, k))
                })
            })
        })
    }
}

/// Errors produced while rasterizing a [`TriMesh`] into a [`Heightfield`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RasterizationError {
    /// `trimesh.indices` and `trimesh.area_types` had mismatched lengths.
    #[error("trimesh has {triangle_count} triangles but {area_count} area types")]
    AreaTypeCountMismatch {
        /// Number of triangles in the mesh.
        triangle_count: usize,
        /// Number of area type entries provided.
        area_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_heightfield() -> Heightfield {
        HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0)),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap()
    }

    #[test]
    fn build_computes_grid_dims() {
        let hf = small_heightfield();
        assert_eq!(hf.width, 10);
        assert_eq!(hf.height, 10);
    }

    #[test]
    fn add_span_merges_overlapping() {
        let mut hf = small_heightfield();
        hf.add_span(0, 0, 0, 5, AreaType::DEFAULT_WALKABLE);
        hf.add_span(0, 0, 3, 8, AreaType::DEFAULT_WALKABLE);
        let key = hf.column(0, 0).unwrap();
        let span = hf.spans[key];
        assert_eq!(span.min, 0);
        assert_eq!(span.max, 8);
        assert!(span.next.is_none());
    }

    #[test]
    fn add_span_keeps_disjoint_spans_separate() {
        let mut hf = small_heightfield();
        hf.add_span(0, 0, 0, 2, AreaType::DEFAULT_WALKABLE);
        hf.add_span(0, 0, 6, 8, AreaType::DEFAULT_WALKABLE);
        let first = hf.spans[hf.column(0, 0).unwrap()];
        assert_eq!(first.min, 0);
        assert_eq!(first.max, 2);
        let second = hf.spans[first.next.unwrap()];
        assert_eq!(second.min, 6);
        assert_eq!(second.max, 8);
    }

    #[test]
    fn invalid_cell_size_is_rejected() {
        let err = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0)),
            cell_size: 0.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, HeightfieldBuilderError::InvalidCellSize(_)));
    }
}
