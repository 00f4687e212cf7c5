use crate::common::{NavError, NavResult, Point3};
use super::types::{Edge, Waypoint};
use petgraph::graph::UnGraph;

/// Waypoint positions plus the undirected edge set discovered at bake time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavGraph {
    waypoints: Vec<Point3>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<u32>>,
}

impl NavGraph {
    /// Builds a graph, normalizing and deduplicating edges. Adjacency lists are
    /// sorted so that neighbour order never depends on insertion order.
    pub fn new(waypoints: Vec<Point3>, edges: impl IntoIterator<Item = (u32, u32)>) -> NavResult<Self> {
        let n = waypoints.len();
        if n > u32::MAX as usize - 1 {
            return Err(NavError::InvalidGraph(format!("{} waypoints exceed index range", n)));
        }
        if let Some(i) = waypoints.iter().position(|p| !p.is_finite()) {
            return Err(NavError::InvalidGraph(format!("waypoint {} has a non-finite position", i)));
        }

        let mut normalized = Vec::new();
        for (a, b) in edges {
            if a as usize >= n || b as usize >= n {
                return Err(NavError::InvalidGraph(format!(
                    "edge ({}, {}) references a waypoint outside 0..{}",
                    a, b, n
                )));
            }
            let edge = Edge::new(a, b)
                .ok_or_else(|| NavError::InvalidGraph(format!("self loop on waypoint {}", a)))?;
            normalized.push(edge);
        }
        normalized.sort_unstable();
        normalized.dedup();

        let mut adjacency = vec![Vec::new(); n];
        for edge in &normalized {
            adjacency[edge.a as usize].push(edge.b);
            adjacency[edge.b as usize].push(edge.a);
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }

        Ok(Self {
            waypoints,
            edges: normalized,
            adjacency,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn positions(&self) -> &[Point3] {
        &self.waypoints
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn position(&self, index: u32) -> Option<Point3> {
        self.waypoints.get(index as usize).copied()
    }

    pub fn waypoint(&self, index: u32) -> Option<Waypoint> {
        self.position(index).map(|position| Waypoint { index, position })
    }

    pub fn waypoints(&self) -> impl Iterator<Item = Waypoint> + '_ {
        self.waypoints
            .iter()
            .enumerate()
            .map(|(i, p)| Waypoint { index: i as u32, position: *p })
    }

    pub fn neighbors(&self, index: u32) -> &[u32] {
        self.adjacency
            .get(index as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Waypoint closest to `point` by straight-line distance, lowest index on ties.
    pub fn nearest(&self, point: &Point3) -> Option<u32> {
        let mut best: Option<(u32, f32)> = None;
        for (i, p) in self.waypoints.iter().enumerate() {
            let d = p.distance_squared(point);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i as u32, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Removes waypoints without incident edges and compacts indices.
    /// Returns the pruned graph and the number of waypoints removed.
    pub fn prune_isolated(self) -> (Self, usize) {
        let mut remap = vec![u32::MAX; self.waypoints.len()];
        let mut kept = Vec::with_capacity(self.waypoints.len());
        for (i, p) in self.waypoints.iter().enumerate() {
            if !self.adjacency[i].is_empty() {
                remap[i] = kept.len() as u32;
                kept.push(*p);
            }
        }
        let removed = self.waypoints.len() - kept.len();
        if removed == 0 {
            return (self, 0);
        }

        let edges: Vec<Edge> = self
            .edges
            .iter()
            .map(|e| Edge { a: remap[e.a as usize], b: remap[e.b as usize] })
            .collect();
        let mut adjacency = vec![Vec::new(); kept.len()];
        for edge in &edges {
            adjacency[edge.a as usize].push(edge.b);
            adjacency[edge.b as usize].push(edge.a);
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }

        (
            Self {
                waypoints: kept,
                edges,
                adjacency,
            },
            removed,
        )
    }

    /// Petgraph view with Euclidean edge weights.
    pub fn to_petgraph(&self) -> UnGraph<Point3, f32> {
        let mut graph = UnGraph::with_capacity(self.waypoints.len(), self.edges.len());
        let nodes: Vec<_> = self.waypoints.iter().map(|p| graph.add_node(*p)).collect();
        for edge in &self.edges {
            let (a, b) = (edge.a as usize, edge.b as usize);
            let weight = self.waypoints[a].distance(&self.waypoints[b]);
            graph.add_edge(nodes[a], nodes[b], weight);
        }
        graph
    }

    pub fn connected_components(&self) -> usize {
        petgraph::algo::connected_components(&self.to_petgraph())
    }
}
