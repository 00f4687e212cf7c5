use crate::common::{NavResult, Point3};
use super::graph::NavGraph;
use super::routing_table::RoutingTable;
use serde::{Deserialize, Serialize};

/// Persisted form of one baked scene: the flat node/edge/table triple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavAsset {
    pub waypoints: Vec<Point3>,
    pub edges: Vec<(u32, u32)>,
    pub table: Vec<Vec<u32>>,
}

/// Everything a query needs for one environment layout. Immutable once built;
/// a re-bake produces a new context that replaces this one wholesale.
#[derive(Debug, Clone, Default)]
pub struct NavigationContext {
    scene: String,
    graph: NavGraph,
    table: RoutingTable,
}

impl NavigationContext {
    /// Pairs a graph with its table after checking every cell against the edges.
    pub fn new(scene: impl Into<String>, graph: NavGraph, table: RoutingTable) -> NavResult<Self> {
        if !table.is_empty() {
            table.validate(&graph)?;
        }
        Ok(Self {
            scene: scene.into(),
            graph,
            table,
        })
    }

    /// A context with a graph but no baked table; queries fall back to A*.
    pub fn unbaked(scene: impl Into<String>, graph: NavGraph) -> Self {
        Self {
            scene: scene.into(),
            graph,
            table: RoutingTable::empty(),
        }
    }

    pub fn empty(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            ..Self::default()
        }
    }

    pub fn scene(&self) -> &str {
        &self.scene
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    pub fn has_table(&self) -> bool {
        !self.table.is_empty()
    }

    pub fn to_asset(&self) -> NavAsset {
        NavAsset {
            waypoints: self.graph.positions().to_vec(),
            edges: self.graph.edges().iter().map(|e| (*e).into()).collect(),
            table: self.table.to_rows(),
        }
    }

    pub fn from_asset(scene: impl Into<String>, asset: NavAsset) -> NavResult<Self> {
        let graph = NavGraph::new(asset.waypoints, asset.edges)?;
        let table = RoutingTable::from_rows(asset.table)?;
        Self::new(scene, graph, table)
    }
}
