//! A* search over the waypoint graph.
//!
//! Search nodes live in an arena (`Vec<SearchNode>`) and point at their
//! predecessor by arena index. Ties on `f` are broken by the smaller `h` and
//! then by the smaller waypoint index, so results never depend on hash order.
//! Closed nodes are re-opened when a strictly cheaper route reaches them;
//! "cheaper" means by more than float noise, so collinear detours never
//! displace a direct edge.

use crate::common::Point3;
use super::graph::NavGraph;
use super::types::Waypoint;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::trace;

/// Transient per-query search state for one waypoint.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub waypoint: u32,
    pub position: Point3,
    /// Cost from the start.
    pub g: f32,
    /// Weighted straight-line distance to the goal.
    pub h: f32,
    pub open: bool,
    /// Arena index of the predecessor.
    pub parent: Option<usize>,
}

impl SearchNode {
    pub fn f(&self) -> f32 {
        self.g + self.h
    }
}

/// Outcome of one search. When the goal was not reached, `path` leads to the
/// explored waypoint closest to the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub path: Vec<u32>,
    pub cost: f32,
    pub reached: bool,
    pub expanded: usize,
}

/// Heap key: smallest f, then smallest h, then smallest waypoint index.
type OpenEntry = Reverse<(OrderedFloat<f32>, OrderedFloat<f32>, u32, usize)>;

/// Relative margin a new route must beat before it replaces a known one.
const IMPROVEMENT_EPSILON: f32 = 1e-5;

pub struct AStarPlanner<'a> {
    graph: &'a NavGraph,
    heuristic_weight: f32,
}

impl<'a> AStarPlanner<'a> {
    pub fn new(graph: &'a NavGraph) -> Self {
        Self { graph, heuristic_weight: 1.0 }
    }

    /// Scales the heuristic. Weights above 1 trade optimality for fewer
    /// expansions and can close nodes before their cheapest route is known.
    pub fn with_heuristic_weight(mut self, weight: f32) -> Self {
        self.heuristic_weight = weight.max(0.0);
        self
    }

    fn heuristic(&self, from: &Point3, goal: &Point3) -> f32 {
        self.heuristic_weight * from.distance(goal)
    }

    /// Shortest path between two waypoints by index.
    pub fn search(&self, start: u32, goal: u32) -> SearchResult {
        let (Some(start_pos), Some(goal_pos)) = (self.graph.position(start), self.graph.position(goal)) else {
            return SearchResult {
                path: Vec::new(),
                cost: f32::INFINITY,
                reached: false,
                expanded: 0,
            };
        };

        let mut arena: Vec<SearchNode> = Vec::new();
        let mut slots: Vec<Option<usize>> = vec![None; self.graph.len()];
        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();

        arena.push(SearchNode {
            waypoint: start,
            position: start_pos,
            g: 0.0,
            h: self.heuristic(&start_pos, &goal_pos),
            open: true,
            parent: None,
        });
        slots[start as usize] = Some(0);
        open.push(entry(&arena[0], 0));

        let mut best = 0usize;
        let mut expanded = 0usize;

        while let Some(Reverse((f, _, _, slot))) = open.pop() {
            let node = &arena[slot];
            // Stale heap entry: the node was closed or improved after this push.
            if !node.open || OrderedFloat(node.f()) != f {
                continue;
            }
            arena[slot].open = false;
            expanded += 1;

            let current = arena[slot].clone();
            if current.h < arena[best].h || (current.h == arena[best].h && current.g < arena[best].g) {
                best = slot;
            }
            if current.waypoint == goal {
                trace!("astar {} -> {} reached after {} expansions", start, goal, expanded);
                return self.finish(&arena, slot, true, expanded);
            }

            for &next in self.graph.neighbors(current.waypoint) {
                let Some(position) = self.graph.position(next) else {
                    continue;
                };
                let g = current.g + current.position.distance(&position);
                match slots[next as usize] {
                    None => {
                        let idx = arena.len();
                        arena.push(SearchNode {
                            waypoint: next,
                            position,
                            g,
                            h: self.heuristic(&position, &goal_pos),
                            open: true,
                            parent: Some(slot),
                        });
                        slots[next as usize] = Some(idx);
                        open.push(entry(&arena[idx], idx));
                    }
                    Some(idx) => {
                        let known = &mut arena[idx];
                        if is_improvement(g, known.g) {
                            known.g = g;
                            known.parent = Some(slot);
                            known.open = true;
                            open.push(entry(known, idx));
                        }
                    }
                }
            }
        }

        trace!("astar {} -> {} exhausted after {} expansions", start, goal, expanded);
        self.finish(&arena, best, false, expanded)
    }

    /// Enters the graph at the waypoint nearest `start` and leaves it at the one
    /// nearest `goal`. `None` only when the graph is empty.
    pub fn search_points(&self, start: Point3, goal: Point3) -> Option<Vec<Waypoint>> {
        let from = self.graph.nearest(&start)?;
        let to = self.graph.nearest(&goal)?;
        let result = self.search(from, to);
        Some(
            result
                .path
                .iter()
                .filter_map(|&i| self.graph.waypoint(i))
                .collect(),
        )
    }

    fn finish(&self, arena: &[SearchNode], last: usize, reached: bool, expanded: usize) -> SearchResult {
        let mut path = Vec::new();
        let mut cursor = Some(last);
        // Parent chains are acyclic; the bound only guards against corruption.
        while let Some(slot) = cursor {
            if path.len() > arena.len() {
                break;
            }
            path.push(arena[slot].waypoint);
            cursor = arena[slot].parent;
        }
        path.reverse();
        SearchResult {
            path,
            cost: arena[last].g,
            reached,
            expanded,
        }
    }
}

fn is_improvement(candidate: f32, known: f32) -> bool {
    candidate < known - IMPROVEMENT_EPSILON * known.max(1.0)
}

fn entry(node: &SearchNode, slot: usize) -> OpenEntry {
    Reverse((OrderedFloat(node.f()), OrderedFloat(node.h), node.waypoint, slot))
}
