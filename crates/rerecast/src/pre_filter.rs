//! Span filters applied after rasterization and before compaction.

use crate::{AreaType, Heightfield, SpanKey, math::{dir_offset_x, dir_offset_z}};

/// A height value larger than any real span can reach, used to represent
/// "open to the sky" when a column has no span above the current one.
const SPAN_MAX_HEIGHT: i32 = i32::MAX;

impl Heightfield {
    /// Raises obstacle spans onto the walkable span directly below them
    /// when the step is small enough to climb, preventing thin low-hanging
    /// geometry (e.g. a curb) from blocking an otherwise walkable surface.
    pub fn filter_low_hanging_walkable_obstacles(&mut self, walkable_climb: u16) {
        for z in 0..self.height {
            for x in 0..self.width {
                let mut previous_walkable = false;
                let mut previous_area = AreaType::NOT_WALKABLE;
                let mut previous_max = 0u16;

                let mut cur = self.column(x, z);
                while let Some(key) = cur {
                    let span = self.spans[key];
                    let walkable = span.area.is_walkable();
                    if !walkable
                        && previous_walkable
                        && previous_max.abs_diff(span.max) <= walkable_climb
                    {
                        self.spans[key].area = previous_area;
                    }
                    previous_walkable = self.spans[key].area.is_walkable();
                    previous_area = self.spans[key].area;
                    previous_max = span.max;
                    cur = span.next;
                }
            }
        }
    }

    /// Marks spans whose neighbouring columns drop off too steeply (ledges)
    /// as not walkable, since an agent standing there could fall.
    pub fn filter_ledge_spans(&mut self, walkable_height: u16, walkable_climb: u16) {
        let walkable_height = walkable_height as i32;
        let walkable_climb = walkable_climb as i32;

        for z in 0..self.height {
            for x in 0..self.width {
                let mut cur = self.column(x, z);
                while let Some(key) = cur {
                    let span = self.spans[key];
                    cur = span.next;
                    if !span.area.is_walkable() {
                        continue;
                    }

                    let bot = span.max as i32;
                    let top = span
                        .next
                        .map(|n| self.spans[n].min as i32)
                        .unwrap_or(SPAN_MAX_HEIGHT);

                    let mut min_neighbor_height = SPAN_MAX_HEIGHT;
                    let mut accessible_min = bot;
                    let mut accessible_max = bot;

                    for dir in 0..4u8 {
                        let nx = x as i32 + dir_offset_x(dir) as i32;
                        let nz = z as i32 + dir_offset_z(dir) as i32;
                        if nx < 0 || nz < 0 || nx >= self.width as i32 || nz >= self.height as i32
                        {
                            min_neighbor_height =
                                min_neighbor_height.min(-walkable_climb - bot);
                            continue;
                        }

                        let mut neighbor = self.column(nx as u16, nz as u16);
                        let mut nbot = -walkable_climb;
                        let mut ntop = neighbor
                            .map(|k| self.spans[k].min as i32)
                            .unwrap_or(SPAN_MAX_HEIGHT);
                        if top.min(ntop) - bot.max(nbot) > walkable_height {
                            min_neighbor_height = min_neighbor_height.min(nbot - bot);
                        }

                        while let Some(nkey) = neighbor {
                            let nspan = self.spans[nkey];
                            nbot = nspan.max as i32;
                            ntop = nspan
                                .next
                                .map(|n| self.spans[n].min as i32)
                                .unwrap_or(SPAN_MAX_HEIGHT);
                            if top.min(ntop) - bot.max(nbot) > walkable_height {
                                min_neighbor_height = min_neighbor_height.min(nbot - bot);
                                if (nbot - bot).abs() <= walkable_climb {
                                    accessible_min = accessible_min.min(nbot);
                                    accessible_max = accessible_max.max(nbot);
                                }
                            }
                            neighbor = nspan.next;
                        }
                    }

                    if min_neighbor_height < -walkable_climb
                        || (accessible_max - accessible_min) > walkable_climb
                    {
                        self.spans[key].area = AreaType::NOT_WALKABLE;
                    }
                }
            }
        }
    }

    /// Marks spans whose clearance to the span above is less than
    /// `walkable_height` as not walkable, since an agent cannot fit there.
    pub fn filter_walkable_low_height_spans(&mut self, walkable_height: u16) {
        let walkable_height = walkable_height as i32;
        for z in 0..self.height {
            for x in 0..self.width {
                let mut cur = self.column(x, z);
                while let Some(key) = cur {
                    let span = self.spans[key];
                    let bot = span.max as i32;
                    let top = span
                        .next
                        .map(|n| self.spans[n].min as i32)
                        .unwrap_or(SPAN_MAX_HEIGHT);
                    if top - bot < walkable_height {
                        self.spans[key].area = AreaType::NOT_WALKABLE;
                    }
                    cur = span.next;
                }
            }
        }
    }

    #[allow(dead_code)]
    fn first_span_key(&self, x: u16, z: u16) -> Option<SpanKey> {
        self.column(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Aabb3d, AreaType, HeightfieldBuilder};
    use glam::Vec3;

    fn grid() -> Heightfield {
        HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3::ZERO, Vec3::new(3.0, 10.0, 3.0)),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap()
    }

    #[test]
    fn low_hanging_obstacle_becomes_walkable() {
        let mut hf = grid();
        hf.add_span(1, 1, 0, 2, AreaType::DEFAULT_WALKABLE);
        hf.add_span(1, 1, 2, 3, AreaType::NOT_WALKABLE);
        hf.filter_low_hanging_walkable_obstacles(1);
        let first = hf.spans[hf.column(1, 1).unwrap()];
        let second = hf.spans[first.next.unwrap()];
        assert!(second.area.is_walkable());
    }

    #[test]
    fn low_clearance_span_is_filtered() {
        let mut hf = grid();
        hf.add_span(1, 1, 0, 2, AreaType::DEFAULT_WALKABLE);
        hf.add_span(1, 1, 3, 5, AreaType::DEFAULT_WALKABLE);
        hf.filter_walkable_low_height_spans(2);
        let first = hf.spans[hf.column(1, 1).unwrap()];
        assert!(!first.area.is_walkable());
    }
}
