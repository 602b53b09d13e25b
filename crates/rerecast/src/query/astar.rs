//! A* search over the polygon graph.

use alloc::collections::{BTreeMap, BinaryHeap};
use alloc::vec::Vec;
use core::cmp::{Ordering, Reverse};

use glam::Vec3;

use crate::NavMesh;
use crate::navmesh::NodeRef;

use super::QueryFilter;

/// Heuristic weight applied to the straight-line distance to the goal.
/// Slightly above `1.0` trades optimality for fewer expansions, matching
/// the tie-breaking behaviour recommended for tile-based navmeshes.
const HEURISTIC_SCALE: f32 = 1.0;

/// The result of [`NavMesh::find_path`]: the sequence of nodes from start to
/// end, and whether the search actually reached `end` or was cut short.
#[derive(Debug, Clone)]
pub struct FindPathResult {
    /// Nodes visited from start to end, inclusive of both endpoints.
    pub path: Vec<NodeRef>,
    /// `true` if no route to `end` existed and `path` instead leads to the
    /// node closest to it that was reachable. Not an error: callers that
    /// only care about getting closer can use the path as-is.
    pub partial: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct PoolEntry {
    cost: f32,
    total_cost: f32,
    parent: Option<NodeRef>,
    state: NodeState,
}

struct HeapEntry {
    total_cost: f32,
    node_ref: NodeRef,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.total_cost == other.total_cost
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cost
            .partial_cmp(&other.total_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl NavMesh {
    /// Finds a node-to-node path from `start` to `end` using A*, scoring
    /// edges with `filter`. Returns `None` if either reference is stale, or
    /// if `start`'s area isn't passable under `filter`.
    ///
    /// The open set is a binary heap of `(total_cost, NodeRef)`, with lazy
    /// deletion: a node can be pushed more than once when a cheaper route
    /// to it is found, and stale heap entries are discarded on pop by
    /// checking the pool's recorded state rather than removing the old
    /// entry from the heap.
    pub fn find_node_path(
        &self,
        start: NodeRef,
        end: NodeRef,
        filter: &dyn QueryFilter,
    ) -> Option<FindPathResult> {
        let start_node = self.get_node_by_ref(start)?;
        let end_node = self.get_node_by_ref(end)?;
        if !filter.pass_filter(start_node.area, start_node.flags) {
            return None;
        }

        if start == end {
            return Some(FindPathResult {
                path: alloc::vec![start],
                partial: false,
            });
        }

        let end_pos = end_node.position;
        let mut pool: BTreeMap<NodeRef, PoolEntry> = BTreeMap::new();
        let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();

        let start_h = start_node.position.distance(end_pos) * HEURISTIC_SCALE;
        pool.insert(
            start,
            PoolEntry {
                cost: 0.0,
                total_cost: start_h,
                parent: None,
                state: NodeState::Open,
            },
        );
        heap.push(Reverse(HeapEntry {
            total_cost: start_h,
            node_ref: start,
        }));

        let mut best_ref = start;
        let mut best_h = start_h;

        while let Some(Reverse(HeapEntry { node_ref, .. })) = heap.pop() {
            let Some(entry) = pool.get(&node_ref).copied() else {
                continue;
            };
            if entry.state == NodeState::Closed {
                continue;
            }

            if node_ref == end {
                best_ref = node_ref;
                break;
            }

            pool.get_mut(&node_ref).unwrap().state = NodeState::Closed;

            let Some(node) = self.get_node_by_ref(node_ref) else {
                continue;
            };
            let node_pos = node.position;
            let node_cost = entry.cost;

            for link in self.links_of(node).copied().collect::<Vec<_>>() {
                let Some(next_node) = self.get_node_by_ref(link.to) else {
                    continue;
                };
                if !filter.pass_filter(next_node.area, next_node.flags) {
                    continue;
                }
                if Some(link.to) == entry.parent {
                    continue;
                }

                let step_cost = filter.cost(node_pos, next_node.position, next_node.area);
                let cost = node_cost + step_cost;
                let goal_reached = link.to == end;
                let h = if goal_reached {
                    0.0
                } else {
                    next_node.position.distance(end_pos) * HEURISTIC_SCALE
                };
                let total_cost = cost + h;

                let should_relax = match pool.get(&link.to) {
                    None => true,
                    Some(existing) => total_cost < existing.total_cost,
                };

                if !should_relax {
                    continue;
                }

                pool.insert(
                    link.to,
                    PoolEntry {
                        cost,
                        total_cost,
                        parent: Some(node_ref),
                        state: NodeState::Open,
                    },
                );
                heap.push(Reverse(HeapEntry {
                    total_cost,
                    node_ref: link.to,
                }));

                if h < best_h {
                    best_h = h;
                    best_ref = link.to;
                }
            }
        }

        let partial = best_ref != end;
        let mut path = Vec::new();
        let mut cur = Some(best_ref);
        while let Some(node_ref) = cur {
            path.push(node_ref);
            cur = pool.get(&node_ref).and_then(|e| e.parent);
        }
        path.reverse();

        Some(FindPathResult { path, partial })
    }

    /// Finds a world-space node path from `start_pos` to `end_pos`, snapping
    /// each endpoint onto its nearest polygon within `search_extents`.
    pub fn find_path(
        &self,
        start_pos: Vec3,
        end_pos: Vec3,
        search_extents: Vec3,
        filter: &dyn QueryFilter,
    ) -> Option<FindPathResult> {
        let (start_tile, start_poly, _, _) = self.find_nearest_poly_raw(start_pos, search_extents)?;
        let (end_tile, end_poly, _, _) = self.find_nearest_poly_raw(end_pos, search_extents)?;
        let start_salt = self.tile_slot(start_tile)?.salt;
        let end_salt = self.tile_slot(end_tile)?.salt;
        let start = NodeRef::new(start_salt, start_tile, start_poly);
        let end = NodeRef::new(end_salt, end_tile, end_poly);
        self.find_node_path(start, end, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navmesh::NavMesh;
    use crate::query::NoOpQueryFilter;
    use crate::tile::Tile;
    use crate::{AreaType, BuildContoursFlags, CompactHeightfield, HeightfieldBuilder};
    use glam::Vec3;

    fn flat_tile(min: Vec3, size: u16) -> Tile {
        let mut hf = HeightfieldBuilder {
            aabb: crate::Aabb3d::new(min, min + Vec3::new(size as f32, 4.0, size as f32)),
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
        let mut chf: CompactHeightfield = hf.into_compact(2, 1).unwrap();
        chf.build_distance_field();
        chf.build_regions(0, 0, 0).unwrap();
        let cset = chf.build_contours(1.3, 0, BuildContoursFlags::default());
        let poly_mesh = cset.into_polygon_mesh(6).unwrap();
        let detail_mesh = crate::DetailNavmesh::new(&poly_mesh, &chf, 0.0, 1.0).unwrap();
        Tile::build(poly_mesh, detail_mesh).unwrap()
    }

    #[test]
    fn find_path_same_polygon_is_a_single_node() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        nav.add_tile(flat_tile(Vec3::ZERO, 8), 0, 0, 0).unwrap();
        let filter = NoOpQueryFilter;
        let result = nav
            .find_path(
                Vec3::new(1.0, 2.0, 1.0),
                Vec3::new(1.5, 2.0, 1.5),
                Vec3::splat(2.0),
                &filter,
            )
            .unwrap();
        assert!(!result.partial);
        assert_eq!(result.path.first(), result.path.last());
    }

    #[test]
    fn find_path_across_two_tiles_is_not_partial() {
        let mut nav = NavMesh::new(Vec3::ZERO, 8.0, 8.0);
        nav.add_tile(flat_tile(Vec3::ZERO, 8), 0, 0, 0).unwrap();
        nav.add_tile(flat_tile(Vec3::new(8.0, 0.0, 0.0), 8), 1, 0, 0)
            .unwrap();

        let filter = NoOpQueryFilter;
        let result = nav
            .find_path(
                Vec3::new(1.0, 2.0, 1.0),
                Vec3::new(13.0, 2.0, 1.0),
                Vec3::splat(2.0),
                &filter,
            )
            .unwrap();
        assert!(!result.partial);
        assert!(result.path.len() >= 2);
    }
}
