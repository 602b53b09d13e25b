//! The compact heightfield: one run of walkable [`CompactSpan`]s per column,
//! with neighbour connectivity baked in, ready for region partitioning.

use alloc::vec::Vec;
use thiserror::Error;

use crate::{
    Aabb3d, AreaType, CompactCell, CompactSpan, Heightfield,
    math::{dir_offset_x, dir_offset_z},
};

/// A compacted, neighbour-linked view of the walkable surface of a
/// [`Heightfield`], ready for distance-field computation, region
/// partitioning and contour tracing.
#[derive(Debug, Clone)]
pub struct CompactHeightfield {
    /// Grid width along X, in cells.
    pub width: u16,
    /// Grid height along Z, in cells.
    pub height: u16,
    /// World-space bounds (matches the source heightfield's).
    pub aabb: Aabb3d,
    /// The size of a cell on the XZ plane, in world units.
    pub cell_size: f32,
    /// The height of a cell, in world units.
    pub cell_height: f32,
    /// Extra border width baked into area marking and region border
    /// protection, set by [`CompactHeightfield::build_regions`].
    pub border_size: u16,
    /// The minimum clearance an agent needs to stand, in voxel units.
    pub walkable_height: u16,
    /// The largest distance-field value in [`CompactHeightfield::dist`].
    pub max_distance: u16,
    /// Highest region id assigned by [`CompactHeightfield::build_regions`].
    pub max_region_id: u16,
    /// One entry per column, indexing into `spans`/`areas`.
    pub cells: Vec<CompactCell>,
    /// All compact spans, grouped by column per `cells`.
    pub spans: Vec<CompactSpan>,
    /// One area type per span, parallel to `spans`.
    pub areas: Vec<AreaType>,
    /// Distance-to-border field, parallel to `spans`. Empty until
    /// [`CompactHeightfield::build_distance_field`] has run.
    pub dist: Vec<u16>,
}

/// Errors from [`Heightfield::into_compact`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CompactHeightfieldError {
    /// The heightfield contained more walkable spans than fit in a
    /// compact heightfield's 32-bit span index space.
    #[error("too many spans to compact: {0}")]
    TooManySpans(usize),
}

impl Heightfield {
    /// Compacts this heightfield's walkable spans into a
    /// [`CompactHeightfield`], computing neighbour connectivity.
    pub fn into_compact(
        &self,
        walkable_height: u16,
        walkable_climb: u16,
    ) -> Result<CompactHeightfield, CompactHeightfieldError> {
        let w = self.width;
        let h = self.height;

        let mut cells = alloc::vec![CompactCell::default(); w as usize * h as usize];
        let mut spans = Vec::new();
        let mut areas = Vec::new();

        for z in 0..h {
            for x in 0..w {
                let start = spans.len();
                let mut count: u8 = 0;
                let mut cur = self.column(x, z);
                while let Some(key) = cur {
                    let span = self.spans[key];
                    cur = span.next;
                    if !span.area.is_walkable() {
                        continue;
                    }
                    let top = span
                        .next
                        .map(|n| self.spans[n].min as i32)
                        .unwrap_or(i32::MAX);
                    let clearance = (top - span.max as i32).min(0xff);
                    if clearance < walkable_height as i32 {
                        continue;
                    }
                    if count == u8::MAX {
                        return Err(CompactHeightfieldError::TooManySpans(spans.len()));
                    }
                    spans.push(CompactSpan::new(span.max, clearance as u8));
                    areas.push(span.area);
                    count += 1;
                }
                cells[x as usize + z as usize * w as usize] =
                    CompactCell::new(start as u32, count);
            }
        }

        // Link neighbour connectivity.
        for z in 0..h {
            for x in 0..w {
                let cell = cells[x as usize + z as usize * w as usize];
                for i in cell.range() {
                    let span = spans[i];
                    for dir in 0..4u8 {
                        let nx = x as i32 + dir_offset_x(dir) as i32;
                        let nz = z as i32 + dir_offset_z(dir) as i32;
                        if nx < 0 || nz < 0 || nx >= w as i32 || nz >= h as i32 {
                            continue;
                        }
                        let ncell = cells[nx as usize + nz as usize * w as usize];
                        let mut found = None;
                        for (k, &nspan) in spans[ncell.range()].iter().enumerate() {
                            let bot = span.y.max(nspan.y) as i32;
                            let top = (span.y as i32 + span.height() as i32)
                                .min(nspan.y as i32 + nspan.height() as i32);
                            if (top - bot) >= walkable_height as i32
                                && (nspan.y as i32 - span.y as i32).unsigned_abs()
                                    <= walkable_climb as u32
                            {
                                found = Some(k as u32);
                                break;
                            }
                        }
                        if let Some(k) = found {
                            spans[i].set_con(dir, Some(k));
                        }
                    }
                }
            }
        }

        Ok(CompactHeightfield {
            width: w,
            height: h,
            aabb: self.aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            border_size: 0,
            walkable_height,
            max_distance: 0,
            max_region_id: 0,
            cells,
            spans,
            areas,
            dist: Vec::new(),
        })
    }
}

impl CompactHeightfield {
    /// Returns the cell descriptor for column `(x, z)`.
    #[inline]
    pub fn cell_at(&self, x: u16, z: u16) -> CompactCell {
        self.cells[x as usize + z as usize * self.width as usize]
    }

    /// Total number of compact spans.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Resolves the span index of the neighbour in direction `dir` from
    /// span `i` at grid coordinates `(x, z)`, given the span already has a
    /// connection in that direction.
    pub fn neighbor_index(&self, x: u16, z: u16, dir: u8, con: u32) -> usize {
        let nx = (x as i32 + dir_offset_x(dir) as i32) as u16;
        let nz = (z as i32 + dir_offset_z(dir) as i32) as u16;
        self.cell_at(nx, nz).index() as usize + con as usize
    }

    /// Erodes the walkable area inward from any non-walkable boundary by
    /// `radius` voxels, so agents with radius `radius` never clip through
    /// a wall or ledge. Spans closer to a boundary than `radius` (in voxel
    /// units) become [`AreaType::NOT_WALKABLE`].
    pub fn erode_walkable_area(&mut self, radius: u16) {
        if radius == 0 {
            return;
        }
        let span_count = self.spans.len();
        let mut dist = alloc::vec![0xffu8; span_count];

        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    if !self.areas[i].is_walkable() {
                        dist[i] = 0;
                        continue;
                    }
                    let span = self.spans[i];
                    let mut neighbor_count = 0u8;
                    for dir in 0..4u8 {
                        if let Some(con) = span.con(dir) {
                            let ni = self.neighbor_index(x, z, dir, con);
                            if self.areas[ni].is_walkable() {
                                neighbor_count += 1;
                            }
                        }
                    }
                    if neighbor_count < 4 {
                        dist[i] = 0;
                    }
                }
            }
        }

        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    let span = self.spans[i];
                    if let Some(con) = span.con(0) {
                        let ni = self.neighbor_index(x, z, 0, con);
                        dist[i] = dist[i].min(dist[ni].saturating_add(2));
                        let nspan = self.spans[ni];
                        if let Some(con2) = nspan.con(3) {
                            let (ax, az) = (
                                (x as i32 + dir_offset_x(0) as i32) as u16,
                                (z as i32 + dir_offset_z(0) as i32) as u16,
                            );
                            let ni2 = self.neighbor_index(ax, az, 3, con2);
                            dist[i] = dist[i].min(dist[ni2].saturating_add(3));
                        }
                    }
                    if let Some(con) = span.con(3) {
                        let ni = self.neighbor_index(x, z, 3, con);
                        dist[i] = dist[i].min(dist[ni].saturating_add(2));
                        let nspan = self.spans[ni];
                        if let Some(con2) = nspan.con(2) {
                            let (ax, az) = (
                                (x as i32 + dir_offset_x(3) as i32) as u16,
                                (z as i32 + dir_offset_z(3) as i32) as u16,
                            );
                            let ni2 = self.neighbor_index(ax, az, 2, con2);
                            dist[i] = dist[i].min(dist[ni2].saturating_add(3));
                        }
                    }
                }
            }
        }

        for z in (0..self.height).rev() {
            for x in (0..self.width).rev() {
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    let span = self.spans[i];
                    if let Some(con) = span.con(2) {
                        let ni = self.neighbor_index(x, z, 2, con);
                        dist[i] = dist[i].min(dist[ni].saturating_add(2));
                        let nspan = self.spans[ni];
                        if let Some(con2) = nspan.con(1) {
                            let (ax, az) = (
                                (x as i32 + dir_offset_x(2) as i32) as u16,
                                (z as i32 + dir_offset_z(2) as i32) as u16,
                            );
                            let ni2 = self.neighbor_index(ax, az, 1, con2);
                            dist[i] = dist[i].min(dist[ni2].saturating_add(3));
                        }
                    }
                    if let Some(con) = span.con(1) {
                        let ni = self.neighbor_index(x, z, 1, con);
                        dist[i] = dist[i].min(dist[ni].saturating_add(2));
                        let nspan = self.spans[ni];
                        if let Some(con2) = nspan.con(0) {
                            let (ax, az) = (
                                (x as i32 + dir_offset_x(1) as i32) as u16,
                                (z as i32 + dir_offset_z(1) as i32) as u16,
                            );
                            let ni2 = self.neighbor_index(ax, az, 0, con2);
                            dist[i] = dist[i].min(dist[ni2].saturating_add(3));
                        }
                    }
                }
            }
        }

        let threshold = (radius * 2).min(u8::MAX as u16) as u8;
        for (area, d) in self.areas.iter_mut().zip(dist.iter()) {
            if *d < threshold {
                *area = AreaType::NOT_WALKABLE;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, HeightfieldBuilder};
    use glam::Vec3;

    fn flat_compact() -> CompactHeightfield {
        let mut hf = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(4.0, 4.0, 4.0)),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        for z in 0..4 {
            for x in 0..4 {
                hf.add_span(x, z, 0, 2, AreaType::DEFAULT_WALKABLE);
            }
        }
        hf.into_compact(2, 1).unwrap()
    }

    #[test]
    fn compaction_keeps_one_span_per_column() {
        let chf = flat_compact();
        assert_eq!(chf.spans.len(), 16);
        for z in 0..4 {
            for x in 0..4 {
                assert_eq!(chf.cell_at(x, z).count(), 1);
            }
        }
    }

    #[test]
    fn interior_spans_connect_to_all_four_neighbours() {
        let chf = flat_compact();
        let i = chf.cell_at(1, 1).index() as usize;
        let span = chf.spans[i];
        for dir in 0..4 {
            assert!(span.con(dir).is_some());
        }
    }

    #[test]
    fn erosion_clears_spans_near_the_edge() {
        let mut chf = flat_compact();
        chf.erode_walkable_area(1);
        let edge = chf.cell_at(0, 0).index() as usize;
        assert!(!chf.areas[edge].is_walkable());
        let center = chf.cell_at(1, 1).index() as usize;
        assert!(chf.areas[center].is_walkable());
    }
}
