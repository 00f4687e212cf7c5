//! Waypoint placement and visibility edge synthesis.
//!
//! Waypoints are placed at convex corners of closed (blocked) cells, pulled
//! away from the wall by the agent clearance, plus any authored free points.
//! Every mutually visible pair is connected and isolated waypoints are pruned.

use crate::common::Point3;
use super::graph::NavGraph;
use super::ports::{GroundProbe, LineOfSight};
use super::sampler::SampleGrid;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

const QUADRANTS: [(i64, i64); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphBuildConfig {
    /// Agent radius used for corner offsets and swept visibility tests.
    pub clearance_radius: f32,
    /// Pairs further apart than this are never connected.
    #[serde(default)]
    pub max_edge_length: Option<f32>,
}

impl Default for GraphBuildConfig {
    fn default() -> Self {
        Self {
            clearance_radius: 0.5,
            max_edge_length: None,
        }
    }
}

/// Counters reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphBuildStats {
    pub corner_waypoints: usize,
    pub free_waypoints: usize,
    pub pruned_waypoints: usize,
    pub edges: usize,
}

pub struct NavGraphBuilder<'a, L: LineOfSight + ?Sized, G: GroundProbe + ?Sized> {
    los: &'a L,
    probe: &'a G,
    config: GraphBuildConfig,
}

impl<'a, L: LineOfSight + ?Sized, G: GroundProbe + ?Sized> NavGraphBuilder<'a, L, G> {
    pub fn new(los: &'a L, probe: &'a G, config: GraphBuildConfig) -> Self {
        Self { los, probe, config }
    }

    /// Clearance expressed in grid cells.
    pub fn clearance_steps(&self, grid: &SampleGrid) -> i64 {
        let cells = self.config.clearance_radius.max(0.0) / grid.step();
        // Tolerate float noise so a radius of exactly n cells stays n.
        (cells - 1e-4).ceil().max(0.0) as i64
    }

    pub fn build(&self, grid: &SampleGrid, free_points: &[Point3]) -> NavGraph {
        self.build_with_stats(grid, free_points).0
    }

    pub fn build_with_stats(&self, grid: &SampleGrid, free_points: &[Point3]) -> (NavGraph, GraphBuildStats) {
        let mut positions = self.corner_waypoints(grid);
        let corner_waypoints = positions.len();
        let mut free_waypoints = 0;
        for point in free_points {
            let grounded = self.ground_free_point(grid, *point);
            if grounded.is_finite() {
                positions.push(grounded);
                free_waypoints += 1;
            } else {
                warn!(
                    "skipping free waypoint ({}, {}, {}): non-finite coordinate",
                    grounded.x, grounded.y, grounded.z
                );
            }
        }

        let edges = self.synthesize_edges(&positions);
        let edge_count = edges.len();
        let graph = match NavGraph::new(positions, edges) {
            Ok(graph) => graph,
            Err(e) => {
                warn!("discarding synthesized graph: {}", e);
                NavGraph::empty()
            }
        };
        let (graph, pruned) = graph.prune_isolated();

        let stats = GraphBuildStats {
            corner_waypoints,
            free_waypoints,
            pruned_waypoints: pruned,
            edges: edge_count,
        };
        info!(
            "nav graph built: {} corners, {} free, {} pruned, {} waypoints, {} edges",
            stats.corner_waypoints,
            stats.free_waypoints,
            stats.pruned_waypoints,
            graph.len(),
            graph.edge_count()
        );
        (graph, stats)
    }

    /// Corner waypoints in deterministic (row-major) order.
    pub fn corner_waypoints(&self, grid: &SampleGrid) -> Vec<Point3> {
        let c = self.clearance_steps(grid);
        let mut cells = BTreeSet::new();

        for iz in 0..grid.depth() as i64 {
            for ix in 0..grid.width() as i64 {
                if grid.is_open(ix, iz) {
                    continue;
                }
                for (dx, dz) in QUADRANTS {
                    if is_convex_corner(grid, ix, iz, dx, dz, c) {
                        cells.insert((iz + dz * (c + 1), ix + dx * (c + 1)));
                    }
                }
            }
        }

        cells
            .into_iter()
            .filter_map(|(iz, ix)| {
                let height = grid.height(ix, iz)?;
                let (x, z) = grid.world(ix, iz);
                Some(Point3::new(x, height, z))
            })
            .collect()
    }

    fn ground_free_point(&self, grid: &SampleGrid, point: Point3) -> Point3 {
        match self.probe.ground_height(point.x, point.z, grid.band()) {
            Some(y) => Point3::new(point.x, y, point.z),
            None => {
                warn!(
                    "free waypoint ({:.2}, {:.2}, {:.2}) has no ground below it, keeping authored height",
                    point.x, point.y, point.z
                );
                point
            }
        }
    }

    fn synthesize_edges(&self, positions: &[Point3]) -> Vec<(u32, u32)> {
        let clearance = self.config.clearance_radius;
        let max_len = self.config.max_edge_length;
        let mut edges: Vec<(u32, u32)> = (0..positions.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                let a = positions[i];
                ((i + 1)..positions.len()).filter_map(move |j| {
                    let b = positions[j];
                    if max_len.is_some_and(|m| a.distance(&b) > m) {
                        return None;
                    }
                    self.los
                        .line_of_sight(a, b, clearance)
                        .then_some((i as u32, j as u32))
                })
            })
            .collect();
        edges.sort_unstable();
        debug!("{} visibility edges among {} waypoints", edges.len(), positions.len());
        edges
    }
}

/// A closed cell protrudes into the quadrant `(dx, dz)` when both axis
/// neighbours in that quadrant are open and the `(2c+1)^2` block starting one
/// cell into the quadrant is open.
fn is_convex_corner(grid: &SampleGrid, ix: i64, iz: i64, dx: i64, dz: i64, c: i64) -> bool {
    if !grid.is_open(ix + dx, iz) || !grid.is_open(ix, iz + dz) {
        return false;
    }
    let side = 2 * c + 1;
    (0..side).all(|a| (0..side).all(|b| grid.is_open(ix + dx * (1 + a), iz + dz * (1 + b))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_closed(width: usize, depth: usize, closed: &[(usize, usize)]) -> SampleGrid {
        let mut cells = vec![Some(0.0); width * depth];
        for (ix, iz) in closed {
            cells[iz * width + ix] = None;
        }
        SampleGrid::from_cells(0.0, 0.0, 1.0, width, (-1.0, 1.0), cells).unwrap()
    }

    #[test]
    fn test_isolated_pillar_yields_four_corners() {
        let grid = grid_with_closed(9, 9, &[(4, 4)]);
        let no_probe = |_: f32, _: f32, _: (f32, f32)| -> Option<f32> { None };
        let open = |_: Point3, _: Point3, _: f32| true;
        let builder = NavGraphBuilder::new(
            &open,
            &no_probe,
            GraphBuildConfig { clearance_radius: 1.0, max_edge_length: None },
        );

        let corners = builder.corner_waypoints(&grid);
        assert_eq!(corners.len(), 4);
        assert!(corners.contains(&Point3::new(6.0, 0.0, 6.0)));
        assert!(corners.contains(&Point3::new(2.0, 0.0, 2.0)));
    }

    #[test]
    fn test_flat_wall_has_no_corners_along_its_face() {
        // A full column of closed cells: only the grid border ends could be corners,
        // and those quadrants leave the grid.
        let closed: Vec<(usize, usize)> = (0..7).map(|iz| (3, iz)).collect();
        let grid = grid_with_closed(7, 7, &closed);
        let no_probe = |_: f32, _: f32, _: (f32, f32)| -> Option<f32> { None };
        let open = |_: Point3, _: Point3, _: f32| true;
        let builder = NavGraphBuilder::new(&open, &no_probe, GraphBuildConfig::default());

        assert!(builder.corner_waypoints(&grid).is_empty());
    }

    #[test]
    fn test_non_finite_free_point_is_skipped_alone() {
        let grid = grid_with_closed(9, 9, &[(4, 4)]);
        let no_probe = |_: f32, _: f32, _: (f32, f32)| -> Option<f32> { None };
        let open = |_: Point3, _: Point3, _: f32| true;
        let builder = NavGraphBuilder::new(
            &open,
            &no_probe,
            GraphBuildConfig { clearance_radius: 1.0, max_edge_length: None },
        );

        let free = [Point3::new(f32::INFINITY, 0.0, 1.0), Point3::new(1.0, 0.0, 7.0)];
        let (graph, stats) = builder.build_with_stats(&grid, &free);
        assert_eq!(stats.corner_waypoints, 4);
        assert_eq!(stats.free_waypoints, 1);
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edge_count(), 10);
        assert!(graph.positions().contains(&Point3::new(1.0, 0.0, 7.0)));
    }
}
