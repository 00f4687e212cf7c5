//! Runtime path queries against a baked navigation context.
//!
//! A query never fails: it returns a direct line when the goal is visible or
//! no graph exists, otherwise walks the routing table between the best entry
//! and exit waypoints and string-pulls the result.

use crate::common::{path_length, Point3};
use super::astar::AStarPlanner;
use super::context::NavigationContext;
use super::ports::LineOfSight;
use super::string_pull::StringPuller;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Agent radius passed to line of sight probes.
    pub clearance: f32,
    /// Largest height difference string pulling may shortcut across.
    pub vertical_tolerance: f32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            clearance: 0.5,
            vertical_tolerance: 0.5,
        }
    }
}

pub struct PathQueryService<L: LineOfSight> {
    context: Arc<NavigationContext>,
    los: L,
    config: QueryConfig,
}

impl<L: LineOfSight> PathQueryService<L> {
    pub fn new(context: Arc<NavigationContext>, los: L, config: QueryConfig) -> Self {
        Self { context, los, config }
    }

    pub fn context(&self) -> &Arc<NavigationContext> {
        &self.context
    }

    /// Points to walk from `start` to `goal`; always ends with `goal`.
    pub fn query(&self, start: Point3, goal: Point3) -> Vec<Point3> {
        if self.visible(start, goal) {
            return vec![goal];
        }
        let graph = self.context.graph();
        if graph.is_empty() {
            return vec![goal];
        }

        let (Some(entry), Some(exit)) = (self.entry_waypoint(start, goal), self.entry_waypoint(goal, start)) else {
            return vec![goal];
        };
        let chain = self.waypoint_chain(entry, exit);

        let mut points = Vec::with_capacity(chain.len() + 2);
        points.push(start);
        points.extend(chain.iter().filter_map(|&i| graph.position(i)));
        points.push(goal);
        points.dedup_by(|b, a| a.approx_eq(b));

        let pulled = StringPuller::new(&self.los, self.config.clearance, self.config.vertical_tolerance)
            .pull_bidirectional(&points);
        debug!(
            "query {} waypoints -> {} points, length {:.2}",
            chain.len(),
            pulled.len(),
            path_length(&pulled)
        );
        pulled
    }

    /// Best waypoint to enter the graph from `from` when heading for `to`:
    /// among waypoints visible from `from`, the one minimizing the detour
    /// `d(w, from) + d(w, to)`. Falls back to the nearest waypoint when none is
    /// visible.
    pub fn entry_waypoint(&self, from: Point3, to: Point3) -> Option<u32> {
        let graph = self.context.graph();
        let mut best: Option<(u32, f32)> = None;
        for waypoint in graph.waypoints() {
            let detour = waypoint.position.distance(&from) + waypoint.position.distance(&to);
            if best.is_some_and(|(_, d)| detour >= d) {
                continue;
            }
            if self.visible(from, waypoint.position) {
                best = Some((waypoint.index, detour));
            }
        }
        best.map(|(i, _)| i).or_else(|| graph.nearest(&from))
    }

    fn waypoint_chain(&self, entry: u32, exit: u32) -> Vec<u32> {
        if !self.context.has_table() {
            let result = AStarPlanner::new(self.context.graph()).search(entry, exit);
            if !result.reached {
                warn!("no baked table and no route from {} to {}, using closest approach", entry, exit);
            }
            return result.path;
        }

        let walk = self.context.table().walk(entry, exit);
        if !walk.complete {
            warn!(
                "malformed routing table in scene {}: walk {} -> {} stopped after {} hops",
                self.context.scene(),
                entry,
                exit,
                walk.hops.len()
            );
        }
        walk.hops
    }

    fn visible(&self, a: Point3, b: Point3) -> bool {
        self.los.line_of_sight(a, b, self.config.clearance)
    }
}
