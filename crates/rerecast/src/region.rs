//! Watershed region partitioning.
//!
//! Partitions the walkable surface into non-overlapping regions by growing
//! flood fills outward from local distance-field maxima, in decreasing
//! distance order, the way water would fill a basin from its deepest points
//! upward. Regions that end up too small are merged into a neighbour or
//! dropped entirely.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use thiserror::Error;

use crate::CompactHeightfield;

/// A region identifier assigned to a [`crate::CompactSpan`] by
/// [`CompactHeightfield::build_regions`].
///
/// The low 15 bits hold an ordinary region id; the top bit,
/// [`Region::BORDER`], marks spans that sit on a tile border and should
/// never be merged away regardless of how small their region is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Region(pub u16);

impl Region {
    /// No region assigned.
    pub const NONE: Region = Region(0);
    /// Flag bit marking a tile-border region.
    pub const BORDER: Region = Region(0x8000);
    /// Mask of the bits that hold an ordinary region id.
    pub const ID_MASK: u16 = 0x7fff;

    /// The ordinary region id, with the border flag stripped.
    #[inline]
    pub fn id(&self) -> u16 {
        self.0 & Self::ID_MASK
    }

    /// True if the border flag is set.
    #[inline]
    pub fn is_border(&self) -> bool {
        self.0 & Self::BORDER.0 != 0
    }

    /// Returns this region with the border flag set.
    #[inline]
    pub fn with_border(self) -> Region {
        Region(self.0 | Self::BORDER.0)
    }

    /// True if this region is unassigned ([`Region::NONE`]).
    #[inline]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl From<u16> for Region {
    fn from(id: u16) -> Self {
        Region(id)
    }
}

/// Errors from [`CompactHeightfield::build_regions`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RegionBuildError {
    /// The distance field has not been built yet; call
    /// [`CompactHeightfield::build_distance_field`] first.
    #[error("distance field has not been built; call build_distance_field first")]
    DistanceFieldMissing,
}

#[derive(Debug, Clone, Copy)]
struct StackEntry {
    x: u16,
    z: u16,
    index: usize,
}

impl CompactHeightfield {
    /// Partitions the walkable surface into regions using the watershed
    /// algorithm. `border_size` widens the area treated as belonging to the
    /// tile border (kept alive by merging regardless of size); regions
    /// smaller than `min_region_area` voxels are dropped, and regions
    /// smaller than `merge_region_area` are folded into their best
    /// neighbour where possible.
    pub fn build_regions(
        &mut self,
        border_size: u16,
        min_region_area: u32,
        merge_region_area: u32,
    ) -> Result<(), RegionBuildError> {
        if self.dist.is_empty() && !self.spans.is_empty() {
            return Err(RegionBuildError::DistanceFieldMissing);
        }

        let span_count = self.spans.len();
        let mut src_reg = alloc::vec![Region::NONE; span_count];
        let mut src_dist = alloc::vec![0u16; span_count];
        let mut region_id: u16 = 1;
        let mut level = (self.max_distance + 1) & !1;
        let mut stack: Vec<StackEntry> = Vec::new();

        while level > 0 {
            level = if level >= 2 { level - 2 } else { 0 };

            stack.clear();
            for z in 0..self.height {
                for x in 0..self.width {
                    let cell = self.cell_at(x, z);
                    for i in cell.range() {
                        if self.areas[i].is_walkable()
                            && src_reg[i].is_none()
                            && self.dist[i] >= level
                        {
                            stack.push(StackEntry { x, z, index: i });
                        }
                    }
                }
            }

            self.expand_regions(8, level, &mut src_reg, &mut src_dist, &mut stack);

            for entry in stack.clone() {
                if src_reg[entry.index].is_none() && self.dist[entry.index] >= level {
                    let flooded = self.flood_region(
                        entry.x,
                        entry.z,
                        entry.index,
                        Region(region_id),
                        &mut src_reg,
                        &mut src_dist,
                    );
                    if flooded {
                        region_id += 1;
                    }
                }
            }
        }

        // Final pass: absorb any remaining unregioned walkable spans into
        // their closest neighbouring region, unbounded by iteration count.
        stack.clear();
        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    if self.areas[i].is_walkable() && src_reg[i].is_none() {
                        stack.push(StackEntry { x, z, index: i });
                    }
                }
            }
        }
        self.expand_regions(usize::MAX, 0, &mut src_reg, &mut src_dist, &mut stack);

        if border_size > 0 {
            self.mark_border_regions(border_size, &mut src_reg);
        }
        self.border_size = border_size;

        self.merge_and_filter_regions(min_region_area, merge_region_area, &mut region_id, &mut src_reg);

        for (span, region) in self.spans.iter_mut().zip(src_reg) {
            span.region = region;
        }
        self.max_region_id = region_id;

        Ok(())
    }

    fn mark_border_regions(&self, border_size: u16, src_reg: &mut [Region]) {
        for z in 0..self.height {
            for x in 0..self.width {
                let on_border =
                    x < border_size || z < border_size || x >= self.width.saturating_sub(border_size)
                        || z >= self.height.saturating_sub(border_size);
                if !on_border {
                    continue;
                }
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    if !src_reg[i].is_none() {
                        src_reg[i] = src_reg[i].with_border();
                    }
                }
            }
        }
    }

    fn expand_regions(
        &self,
        max_iter: usize,
        level: u16,
        src_reg: &mut [Region],
        src_dist: &mut [u16],
        stack: &mut Vec<StackEntry>,
    ) {
        stack.retain(|entry| src_reg[entry.index].is_none());

        let mut iter = 0;
        while !stack.is_empty() {
            let mut failed = 0;
            let mut dirty: Vec<(usize, Region, u16)> = Vec::new();

            for entry in stack.iter() {
                let i = entry.index;
                let area = self.areas[i];
                let span = self.spans[i];

                let mut best_region = Region::NONE;
                let mut best_dist = u16::MAX;
                for dir in 0..4u8 {
                    let Some(con) = span.con(dir) else { continue };
                    let (ax, az) = self.neighbor_coord(entry.x, entry.z, dir);
                    let ai = self.cell_at(ax, az).index() as usize + con as usize;
                    if self.areas[ai] != area {
                        continue;
                    }
                    let nreg = src_reg[ai];
                    if !nreg.is_none() && !nreg.is_border() {
                        let nd = src_dist[ai].saturating_add(2);
                        if nd < best_dist {
                            best_dist = nd;
                            best_region = nreg;
                        }
                    }
                }

                if !best_region.is_none() {
                    dirty.push((i, best_region, best_dist));
                } else {
                    failed += 1;
                }
            }

            let _ = failed;
            if dirty.is_empty() {
                break;
            }
            for (i, region, dist) in &dirty {
                src_reg[*i] = *region;
                src_dist[*i] = *dist;
            }
            stack.retain(|entry| src_reg[entry.index].is_none());

            if stack.is_empty() {
                break;
            }

            if level > 0 {
                iter += 1;
                if iter >= max_iter {
                    break;
                }
            }
        }
    }

    fn flood_region(
        &self,
        x: u16,
        z: u16,
        index: usize,
        region: Region,
        src_reg: &mut [Region],
        src_dist: &mut [u16],
    ) -> bool {
        let area = self.areas[index];
        let mut stack = alloc::vec![StackEntry { x, z, index }];
        src_reg[index] = region;
        src_dist[index] = 0;
        let mut count = 0usize;

        while let Some(entry) = stack.pop() {
            let span = self.spans[entry.index];

            // If this cell touches an already-established, differently
            // numbered region, back off: it belongs to that region's flood,
            // not a brand new one.
            let mut adjacent_other = false;
            for dir in 0..4u8 {
                let Some(con) = span.con(dir) else { continue };
                let (ax, az) = self.neighbor_coord(entry.x, entry.z, dir);
                let ai = self.cell_at(ax, az).index() as usize + con as usize;
                if self.areas[ai] != area {
                    continue;
                }
                let nreg = src_reg[ai];
                if nreg.is_border() {
                    continue;
                }
                if !nreg.is_none() && nreg != region {
                    adjacent_other = true;
                    break;
                }
            }
            if adjacent_other {
                src_reg[entry.index] = Region::NONE;
                continue;
            }
            count += 1;

            for dir in 0..4u8 {
                let Some(con) = span.con(dir) else { continue };
                let (ax, az) = self.neighbor_coord(entry.x, entry.z, dir);
                let ai = self.cell_at(ax, az).index() as usize + con as usize;
                if self.areas[ai] == area && src_reg[ai].is_none() {
                    src_reg[ai] = region;
                    src_dist[ai] = 0;
                    stack.push(StackEntry {
                        x: ax,
                        z: az,
                        index: ai,
                    });
                }
            }
        }

        count > 0
    }

    #[inline]
    fn neighbor_coord(&self, x: u16, z: u16, dir: u8) -> (u16, u16) {
        let ax = (x as i32 + crate::math::dir_offset_x(dir) as i32) as u16;
        let az = (z as i32 + crate::math::dir_offset_z(dir) as i32) as u16;
        (ax, az)
    }

    fn merge_and_filter_regions(
        &self,
        min_region_area: u32,
        merge_region_area: u32,
        max_region_id: &mut u16,
        src_reg: &mut [Region],
    ) {
        let nreg = *max_region_id as usize + 1;
        if nreg <= 1 {
            return;
        }

        let mut span_count = alloc::vec![0u32; nreg];
        let mut connections: Vec<BTreeSet<u16>> = alloc::vec![BTreeSet::new(); nreg];
        let mut connects_to_border = alloc::vec![false; nreg];
        let mut is_border_region = alloc::vec![false; nreg];

        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.range() {
                    let reg = src_reg[i];
                    if reg.is_none() {
                        continue;
                    }
                    if reg.is_border() {
                        is_border_region[reg.id() as usize] = true;
                        continue;
                    }
                    let rid = reg.id() as usize;
                    span_count[rid] += 1;

                    let span = self.spans[i];
                    let mut touched_unconnected = false;
                    for dir in 0..4u8 {
                        let Some(con) = span.con(dir) else {
                            touched_unconnected = true;
                            continue;
                        };
                        let (ax, az) = self.neighbor_coord(x, z, dir);
                        let ai = self.cell_at(ax, az).index() as usize + con as usize;
                        let nreg = src_reg[ai];
                        if nreg.is_none() {
                            continue;
                        }
                        if nreg.is_border() {
                            connects_to_border[rid] = true;
                            continue;
                        }
                        if nreg.id() != reg.id() as u16 {
                            connections[rid].insert(nreg.id());
                        }
                    }
                    if touched_unconnected {
                        connects_to_border[rid] = true;
                    }
                }
            }
        }

        // Union-find over the adjacency graph to compute connected-component
        // total sizes, so small regions that only look small in isolation
        // but are attached to a large neighbour network survive.
        let mut parent: Vec<usize> = (0..nreg).collect();
        fn find(parent: &mut [usize], i: usize) -> usize {
            if parent[i] != i {
                parent[i] = find(parent, parent[i]);
            }
            parent[i]
        }
        fn union(parent: &mut [usize], a: usize, b: usize) {
            let ra = find(parent, a);
            let rb = find(parent, b);
            if ra != rb {
                parent[ra] = rb;
            }
        }

        for rid in 1..nreg {
            if is_border_region[rid] || span_count[rid] == 0 {
                continue;
            }
            for &other in &connections[rid] {
                union(&mut parent, rid, other as usize);
            }
        }

        let mut component_size = alloc::vec![0u32; nreg];
        let mut component_connects_border = alloc::vec![false; nreg];
        for rid in 1..nreg {
            if is_border_region[rid] || span_count[rid] == 0 {
                continue;
            }
            let root = find(&mut parent, rid);
            component_size[root] += span_count[rid];
            if connects_to_border[rid] {
                component_connects_border[root] = true;
            }
        }

        // Drop regions whose whole connected component is below the area
        // threshold and never touches a tile border (where size can't be
        // judged reliably).
        for rid in 1..nreg {
            if is_border_region[rid] || span_count[rid] == 0 {
                continue;
            }
            let root = find(&mut parent, rid);
            if component_size[root] < min_region_area && !component_connects_border[root] {
                span_count[rid] = 0;
            }
        }

        // Merge remaining small regions into their smallest live neighbour.
        let mut remap: Vec<u16> = (0..nreg as u16).collect();
        loop {
            let mut merged_any = false;
            for rid in 1..nreg {
                if is_border_region[rid] || span_count[rid] == 0 {
                    continue;
                }
                if span_count[rid] > merge_region_area {
                    continue;
                }
                let mut best: Option<(usize, u32)> = None;
                for &other in &connections[rid] {
                    let other = other as usize;
                    if is_border_region[other] || span_count[other] == 0 || other == rid {
                        continue;
                    }
                    let count = span_count[other];
                    let replace = match best {
                        None => true,
                        Some((_, best_count)) => count < best_count,
                    };
                    if replace {
                        best = Some((other, count));
                    }
                }
                if let Some((target, _)) = best {
                    span_count[target] += span_count[rid];
                    span_count[rid] = 0;
                    let merged_connections: Vec<u16> =
                        connections[rid].iter().copied().collect();
                    for c in merged_connections {
                        if c as usize != target {
                            connections[target].insert(c);
                        }
                    }
                    for id in remap.iter_mut() {
                        if *id as usize == rid {
                            *id = target as u16;
                        }
                    }
                    merged_any = true;
                }
            }
            if !merged_any {
                break;
            }
        }

        // Compress surviving ids into a dense 1..N range.
        let mut next_id: u16 = 1;
        let mut compacted = alloc::vec![0u16; nreg];
        for rid in 1..nreg {
            let root = remap[rid] as usize;
            if span_count[root] == 0 {
                continue;
            }
            if compacted[root] == 0 {
                compacted[root] = next_id;
                next_id += 1;
            }
        }

        for region in src_reg.iter_mut() {
            if region.is_none() || region.is_border() {
                continue;
            }
            let root = remap[region.id() as usize] as usize;
            let new_id = compacted[root];
            *region = if new_id == 0 {
                Region::NONE
            } else {
                Region(new_id)
            };
        }
        *max_region_id = next_id - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_border_flag_roundtrips() {
        let r = Region(5).with_border();
        assert!(r.is_border());
        assert_eq!(r.id(), 5);
    }

    #[test]
    fn region_none_has_no_id() {
        assert_eq!(Region::NONE.id(), 0);
        assert!(Region::NONE.is_none());
    }
}
